//! # biollm-types
//!
//! Core type definitions for the biollm question-answering pipeline.
//!
//! Every other biollm crate depends on this one. It contains:
//!
//! - **[`error`]** -- [`BiollmError`] and [`ValidationError`]
//! - **[`config`]** -- Configuration schema (endpoints, pipeline defaults, server)
//! - **[`request`]** -- [`PipelineRequest`] and [`GenerationParams`]
//! - **[`stage`]** -- The canonical per-stage outcome record [`StageResult`]
//! - **[`response`]** -- The aggregate [`PipelineResponse`]
//! - **[`secret`]** -- [`ApiKey`], a credential that never reaches logs

pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod secret;
pub mod stage;

pub use config::Config;
pub use error::{BiollmError, Result, ValidationError};
pub use request::{GenerationParams, InputKind, PipelineRequest};
pub use response::{PipelineResponse, PipelineStatus};
pub use secret::ApiKey;
pub use stage::{StageName, StagePayload, StageResult, StageStatus};
