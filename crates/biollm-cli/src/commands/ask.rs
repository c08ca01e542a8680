//! `biollm ask` -- answer a text question.
//!
//! # Examples
//!
//! ```text
//! biollm ask "What causes chest pain on exertion?"
//! biollm ask "¿Qué causa el dolor de pecho?" --lang es
//! biollm ask "chest pain" --category cardiology --temperature 0.3 --json
//! ```

use clap::Args;

use biollm_types::{Config, GenerationParams, PipelineRequest};

use super::{build_pipeline, print_outcome, run_once};

/// Generation overrides shared by the question-answering commands.
#[derive(Args, Debug, Default)]
pub struct GenerationArgs {
    /// Sampling temperature.
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Nucleus sampling threshold in [0, 1].
    #[arg(long)]
    pub top_p: Option<f64>,

    /// Top-k sampling cutoff.
    #[arg(long)]
    pub top_k: Option<u32>,

    /// Maximum tokens to generate.
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Replace the default system prompt.
    #[arg(long)]
    pub system_prompt: Option<String>,
}

impl GenerationArgs {
    /// Apply the overrides on top of `base`.
    pub fn apply(&self, base: &GenerationParams) -> GenerationParams {
        let mut params = base.clone();
        if let Some(t) = self.temperature {
            params.temperature = t;
        }
        if let Some(p) = self.top_p {
            params.top_p = p;
        }
        if let Some(k) = self.top_k {
            params.top_k = k;
        }
        if let Some(m) = self.max_tokens {
            params.max_tokens = m;
        }
        if let Some(prompt) = &self.system_prompt {
            params.context = Some(prompt.clone());
        }
        params
    }
}

/// Arguments for the `biollm ask` subcommand.
#[derive(Args)]
pub struct AskArgs {
    /// The question.
    pub text: String,

    /// Language of the question.
    #[arg(short, long, default_value = "en")]
    pub lang: String,

    /// Working language for retrieval and generation (overrides config).
    #[arg(long)]
    pub target: Option<String>,

    /// Retrieval category (overrides config).
    #[arg(long)]
    pub category: Option<String>,

    /// Skip retrieval entirely.
    #[arg(long, conflicts_with = "category")]
    pub no_retrieval: bool,

    /// Retrieval query (defaults to the translated question).
    #[arg(short, long)]
    pub query: Option<String>,

    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Print the full stage record as JSON.
    #[arg(long)]
    pub json: bool,
}

impl AskArgs {
    /// Build the pipeline request, filling gaps from `config`.
    pub fn to_request(&self, config: &Config) -> PipelineRequest {
        let defaults = &config.pipeline;
        let mut request = PipelineRequest::text(self.text.clone(), self.lang.clone())
            .with_target_language(
                self.target
                    .clone()
                    .unwrap_or_else(|| defaults.target_language.clone()),
            )
            .with_generation_params(self.generation.apply(&defaults.generation));
        request.rag_category = if self.no_retrieval {
            None
        } else {
            self.category.clone().or_else(|| defaults.rag_category.clone())
        };
        request.rag_query = self.query.clone();
        request
    }
}

/// Run the ask command.
pub async fn run(args: AskArgs, config: Config) -> anyhow::Result<()> {
    let request = args.to_request(&config);
    request.validate()?;

    let pipeline = build_pipeline(&config)?;
    let (response, reply) = run_once(&pipeline, &request).await;
    print_outcome(&response, &reply, args.json)
}
