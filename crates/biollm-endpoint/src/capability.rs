//! The hosted capabilities the pipeline depends on.

use std::fmt;

use biollm_types::config::CapabilityModels;
use serde::{Deserialize, Serialize};

/// One externally hosted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Speech-to-text.
    Speech,
    /// Machine translation.
    Translate,
    /// Category-filtered RAG search.
    Search,
    /// Biomedical answer generation.
    Generate,
}

impl Capability {
    /// All capabilities, in pipeline order.
    pub const ALL: [Capability; 4] = [
        Capability::Speech,
        Capability::Translate,
        Capability::Search,
        Capability::Generate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speech => "speech",
            Self::Translate => "translate",
            Self::Search => "search",
            Self::Generate => "generate",
        }
    }

    /// The configured hosted model id serving this capability.
    pub fn model_id<'a>(&self, models: &'a CapabilityModels) -> &'a str {
        match self {
            Self::Speech => &models.speech,
            Self::Translate => &models.translate,
            Self::Search => &models.search,
            Self::Generate => &models.generate,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
