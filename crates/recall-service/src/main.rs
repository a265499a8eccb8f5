//! One-shot startup task for the recall service: connect the shared client
//! and build the graph indices and constraints it relies on.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use recall_service::SharedClient;

#[derive(Parser)]
#[command(name = "recall-init")]
#[command(about = "Initialize the recall knowledge graph schema")]
struct Cli {
    /// Verify connectivity and configuration without touching the schema.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();

    let shared = SharedClient::new();
    let client = shared.get().await?;

    if cli.check {
        tracing::info!(
            model = %client.llm_config().model,
            embedding = client.embedder().model(),
            "Connectivity check passed"
        );
        return Ok(());
    }

    client.graph().build_indices_and_constraints().await?;
    tracing::info!("Graph schema initialized");
    Ok(())
}
