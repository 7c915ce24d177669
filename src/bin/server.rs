//! `query-server` — HTTP query API over the sentence store (§4.8, §6).

use std::net::SocketAddr;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use parla_corpus::api::router::build_router;
use parla_corpus::store::Store;

#[derive(Parser)]
#[command(name = "query-server")]
#[command(about = "Read-only HTTP lookup API over the parliamentary sentence store")]
struct Cli {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Address to bind the HTTP listener to.
    #[arg(long, env = "PARLA_BIND_ADDR", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cli.database_url)
        .await?;
    let store = Store::new(pool);

    let app = build_router(store);

    info!(addr = %cli.bind, "query-server listening");
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
