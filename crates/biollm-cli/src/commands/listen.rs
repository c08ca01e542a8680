//! `biollm listen` -- transcribe a recording and answer it.
//!
//! The recording is passed by reference (a URL or storage key the speech
//! capability can fetch). The answer is translated back into the language
//! that was detected.
//!
//! # Examples
//!
//! ```text
//! biollm listen https://example.org/clips/question.wav
//! biollm listen s3://clips/7.wav --lang es --json
//! ```

use clap::Args;

use biollm_types::{Config, PipelineRequest};

use super::{build_pipeline, print_outcome, run_once};

/// Arguments for the `biollm listen` subcommand.
#[derive(Args)]
pub struct ListenArgs {
    /// Reference to the recording.
    pub audio_ref: String,

    /// Expected language, used when the speech capability detects none.
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Retrieval category (overrides config).
    #[arg(long)]
    pub category: Option<String>,

    /// Print the full stage record as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListenArgs {
    pub fn to_request(&self, config: &Config) -> PipelineRequest {
        let defaults = &config.pipeline;
        let mut request = PipelineRequest::audio(self.audio_ref.clone())
            .with_target_language(defaults.target_language.clone())
            .with_generation_params(defaults.generation.clone());
        request.source_language = self.lang.clone();
        request.rag_category = self
            .category
            .clone()
            .or_else(|| defaults.rag_category.clone());
        request
    }
}

/// Run the listen command.
pub async fn run(args: ListenArgs, config: Config) -> anyhow::Result<()> {
    let request = args.to_request(&config);
    request.validate()?;

    let pipeline = build_pipeline(&config)?;
    let (response, reply) = run_once(&pipeline, &request).await;
    print_outcome(&response, &reply, args.json)
}
