//! `ingest` — top-level CLI driver for the ingest pipeline (§4.7, §6).
//!
//! Initialises the store, loads the reference configuration, then walks
//! every configured dataset, honouring the `--max-documents` and
//! `--max-datasets` caps. Exits 0 on completion, non-zero on a fatal
//! config or schema error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::error;

use parla_corpus::config::{IngestSettings, ReferenceConfig};
use parla_corpus::nlp::heuristic::{HeuristicNlp, PlainTextHtmlToText, TrigramLanguageIdentifier};
use parla_corpus::orchestrator::{self, OrchestratorCaps};
use parla_corpus::store::Store;

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Ingest a corpus of parliamentary documents into the sentence store")]
struct Cli {
    /// Directory containing languages.yml, lexical_categories.yml,
    /// entity_types.yml and datasets.yml.
    #[arg(long, env = "PARLA_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Config environment to read language entries from (§6).
    #[arg(long, env = "PARLA_ENVIRONMENT", default_value = "development")]
    environment: String,

    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Maximum documents processed per dataset. 0 = unlimited.
    #[arg(long, default_value_t = 0)]
    max_documents: usize,

    /// Maximum number of datasets processed this run. 0 = unlimited.
    #[arg(long, default_value_t = 0)]
    max_datasets: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let reference_config = match ReferenceConfig::load_dir(&cli.config_dir) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load reference configuration");
            return ExitCode::FAILURE;
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&cli.database_url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            error!(error = %err, "failed to connect to store");
            return ExitCode::FAILURE;
        }
    };

    let store = Store::new(pool);
    let settings = IngestSettings {
        max_documents_per_dataset: cli.max_documents,
        max_datasets: cli.max_datasets,
        ..IngestSettings::default()
    };
    let caps = OrchestratorCaps {
        max_documents_per_dataset: cli.max_documents,
        max_datasets: cli.max_datasets,
    };

    let nlp = HeuristicNlp::default();
    let language_identifier = TrigramLanguageIdentifier::default();
    let html_to_text = PlainTextHtmlToText::default();

    let result = orchestrator::run(
        &store,
        &reference_config,
        &cli.environment,
        &settings,
        &caps,
        &nlp,
        &language_identifier,
        &html_to_text,
    )
    .await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "ingest aborted");
            ExitCode::FAILURE
        }
    }
}
