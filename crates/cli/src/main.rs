mod settings;

use anyhow::Result;
use clap::Parser;
use context_engine::{ContextEngine, ContextRequest};
use context_protocol::Tier;
use context_retrievers::{DocumentSet, FuzzyRetriever, KeywordRetriever};
use settings::Settings;
use std::path::PathBuf;
use std::sync::Arc;

/// Assemble a token-budgeted context block from a document corpus.
#[derive(Debug, Parser)]
#[command(name = "context-assemble", version, about)]
struct Args {
    /// Query to assemble context for
    query: String,

    /// Corpus root directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Settings file (JSON or TOML)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Per-request token budget override
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Default results per tier
    #[arg(long)]
    top_k: Option<usize>,

    /// Default minimum normalized score per tier
    #[arg(long)]
    min_score: Option<f32>,

    /// Correlation id threaded through logging
    #[arg(long)]
    corr_id: Option<String>,

    /// Print the full result as JSON instead of the context block
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = Settings::load(args.settings.as_deref())?;
    if let Some(top_k) = args.top_k {
        settings.top_k = top_k;
    }
    if let Some(min_score) = args.min_score {
        settings.min_score = min_score;
    }

    let docs = DocumentSet::load_dir(&args.root)?;
    log::debug!("Corpus: {} documents under {}", docs.len(), args.root.display());

    let config = settings
        .engine_config()?
        .retriever(Tier::ProjectDocs, Arc::new(KeywordRetriever::new(docs.clone())))
        .retriever(Tier::Code, Arc::new(FuzzyRetriever::new(docs)))
        .build()?;
    let engine = ContextEngine::new(config);

    let mut request = ContextRequest::new(&args.query);
    if let Some(corr_id) = args.corr_id {
        request = request.with_corr_id(corr_id);
    }
    if let Some(max_tokens) = args.max_tokens {
        request = request.with_max_tokens(max_tokens)?;
    }

    let result = engine.build_context(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.context.is_empty() {
        eprintln!("No context matched the query.");
    } else {
        println!("{}", result.context);
    }

    Ok(())
}
