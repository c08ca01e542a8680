//! # biollm-core
//!
//! Pipeline engine for the biollm biomedical question-answering service.
//!
//! A run moves through four stages, each wrapping one hosted capability
//! behind an [`EndpointClient`](biollm_endpoint::EndpointClient):
//!
//! ```text
//! InputIngestion -> Translation -> (Retrieval) -> Generation
//! ```
//!
//! - **[`stages`]** -- one adapter per capability, each returning a
//!   [`StageResult`](biollm_types::StageResult)
//! - **[`pipeline`]** -- the [`Pipeline`] orchestrator
//! - **[`composer`]** -- [`ResponseComposer`], which turns a run into the
//!   reply a caller sees
//! - **[`config_loader`]** -- config file discovery and loading

pub mod composer;
pub mod config_loader;
pub mod pipeline;
pub mod stages;

pub use composer::{ComposedReply, ResponseComposer};
pub use pipeline::Pipeline;
