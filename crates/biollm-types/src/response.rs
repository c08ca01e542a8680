//! The aggregate pipeline result.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage::{StageName, StageResult};

/// Overall state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    /// The run has not reached a terminal state yet.
    Processing,
    Success,
    Error,
}

/// Aggregate result of one pipeline invocation.
///
/// Built incrementally by the orchestrator; `stages` only contains the
/// stages that actually executed. `request_id`, `started_at` and
/// `elapsed_ms` are bookkeeping and take no part in
/// [`same_outcome`](PipelineResponse::same_outcome).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResponse {
    /// Unique id of this run, for log correlation.
    pub request_id: Uuid,

    /// Current or terminal state.
    pub status: PipelineStatus,

    /// Per-stage results keyed by stage, in execution order.
    pub stages: BTreeMap<StageName, StageResult>,

    /// The generated answer, when generation succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Overall diagnostic; the failure reason when `status` is `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration of the run in milliseconds.
    #[serde(default)]
    pub elapsed_ms: u64,
}

impl PipelineResponse {
    /// A fresh response in the `Processing` state.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            status: PipelineStatus::Processing,
            stages: BTreeMap::new(),
            answer: None,
            message: None,
            started_at: Utc::now(),
            elapsed_ms: 0,
        }
    }

    /// Record the result of a stage that just ran.
    pub fn record(&mut self, stage: StageName, result: StageResult) {
        self.stages.insert(stage, result);
    }

    /// Look up the result of a stage, if it ran.
    pub fn stage(&self, stage: StageName) -> Option<&StageResult> {
        self.stages.get(&stage)
    }

    /// Names of the stages that ran, in execution order.
    pub fn stage_names(&self) -> Vec<StageName> {
        self.stages.keys().copied().collect()
    }

    /// Move to `Success` with the generated answer.
    pub fn succeed(&mut self, answer: String, message: impl Into<String>) {
        self.status = PipelineStatus::Success;
        self.answer = Some(answer);
        self.message = Some(message.into());
    }

    /// Move to `Error` with a failure reason.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = PipelineStatus::Error;
        self.answer = None;
        self.message = Some(message.into());
    }

    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }

    /// Compare the semantic content of two responses, ignoring ids and timing.
    pub fn same_outcome(&self, other: &Self) -> bool {
        self.status == other.status
            && self.stages == other.stages
            && self.answer == other.answer
            && self.message == other.message
    }
}

impl Default for PipelineResponse {
    fn default() -> Self {
        Self::new()
    }
}
