//! Category-filtered RAG search.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use biollm_endpoint::{Capability, EndpointClient};
use biollm_types::{StagePayload, StageResult};

use super::{SearchReply, coerce_text};

/// Query and category for one search.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalInput<'a> {
    pub query: &'a str,
    pub category: &'a str,
}

/// Retrieval stage.
///
/// A reply is only accepted when it reports `status == "SUCCESS"` and
/// `completed == true`. Every failure yields an empty context.
#[derive(Clone)]
pub struct Retrieval {
    client: Arc<dyn EndpointClient>,
}

impl Retrieval {
    pub fn new(client: Arc<dyn EndpointClient>) -> Self {
        Self { client }
    }

    pub async fn run(&self, input: RetrievalInput<'_>) -> StageResult {
        let empty = || StagePayload::Retrieval {
            context: String::new(),
        };

        if input.query.trim().is_empty() {
            return StageResult::error(empty(), "retrieval skipped: empty query");
        }

        let body = json!({
            "text": input.query,
            "filters": [{
                "field": "category",
                "operator": "==",
                "value": input.category,
            }],
        });

        let reply = match self.client.invoke(Capability::Search, &body).await {
            Ok(reply) => reply,
            Err(e) => return StageResult::error(empty(), format!("retrieval failed: {e}")),
        };

        let reply: SearchReply = match serde_json::from_value(reply) {
            Ok(reply) => reply,
            Err(e) => {
                return StageResult::error(empty(), format!("retrieval failed: undecodable reply: {e}"));
            }
        };

        if reply.status != "SUCCESS" || !reply.completed {
            return StageResult::error(
                empty(),
                format!(
                    "retrieval failed: status {} (completed: {})",
                    reply.status, reply.completed
                ),
            );
        }

        let context = coerce_text(&reply.data);
        debug!(category = input.category, chars = context.len(), "context retrieved");
        StageResult::success(
            StagePayload::Retrieval { context },
            format!("retrieved context for category {}", input.category),
        )
    }
}
