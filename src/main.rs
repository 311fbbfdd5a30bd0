mod api;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::cmd::analyze::{self, AnalyzeCommandArgs};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::serve::{self, ServeCommandArgs};
use crate::config::{AnalysisMode, AppConfig};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::llm::GeminiClient;
use crate::infra::sqlite::SqliteStore;
use crate::workflow::analysis::{AnalysisPipeline, ClassifierMode};

#[derive(Parser)]
#[command(name = "triage", author, version, about = "Support ticket triage service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Run one analysis pass and print the stored result as JSON.
    Analyze(AnalyzeArgs),
    /// Inspect configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Listen address, overrides TRIAGE_BIND.
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Ticket id to include; repeat for several. Defaults to every ticket.
    #[arg(short = 't', long = "ticket-id")]
    ticket_ids: Vec<i64>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Serve(args) => {
            let context = build_context()?;
            serve::run(context, ServeCommandArgs { bind: args.bind }).await
        }
        Commands::Analyze(args) => {
            let context = build_context()?;
            let result = analyze::run(
                &context,
                AnalyzeCommandArgs {
                    ticket_ids: args.ticket_ids,
                },
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::from_env()?;

    let store = Arc::new(SqliteStore::open(&config.database)?);
    store.init_schema()?;

    if config.analysis_mode == AnalysisMode::Llm && config.gemini_api_key.is_none() {
        tracing::warn!("ANALYSIS_MODE=llm but GEMINI_API_KEY is not set; using rules");
    }

    let mode = match (config.effective_mode(), &config.gemini_api_key) {
        (AnalysisMode::Llm, Some(api_key)) => {
            let client = GeminiClient::new(api_key.clone(), config.gemini_model.clone());
            tracing::info!(model = client.model(), "using Gemini for classification");
            ClassifierMode::Llm(Arc::new(client))
        }
        _ => ClassifierMode::Rules,
    };

    let pipeline = AnalysisPipeline::new(store.clone(), mode);
    Ok(AppContext::new(config, store, pipeline))
}
