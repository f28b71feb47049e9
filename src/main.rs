use std::path::PathBuf;

use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

use formsync::AdapterConfig;

/// formsync: spreadsheet and questionnaire automation via CDP
#[derive(Parser)]
#[command(name = "formsync", version, about)]
struct Cli {
    /// Run Chrome with a visible window (default: headless)
    #[arg(long)]
    headed: bool,

    /// JSON file overriding the default page selectors and timings
    #[arg(long, value_name = "FILE")]
    selectors: Option<PathBuf>,

    /// How long to wait for a section's loading indicator to clear
    #[arg(long, value_name = "MS")]
    loading_timeout_ms: Option<u64>,

    /// Settling delay after navigating the spreadsheet name box
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr only; stdout is the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let headless = !cli.headed;

    let mut config = match cli.selectors {
        Some(ref path) => AdapterConfig::from_file(path)?,
        None => AdapterConfig::default(),
    };
    if let Some(ms) = cli.loading_timeout_ms {
        config.timing.loading_timeout_ms = ms;
    }
    if let Some(ms) = cli.settle_ms {
        config.timing.settle_ms = ms;
    }

    tracing::info!("Starting formsync MCP server (headless: {})", headless);

    let server = formsync::server::FormsyncServer::new(headless, config);
    let service = server.clone().serve(stdio()).await?;

    tokio::select! {
        result = service.waiting() => { result?; }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received interrupt signal, shutting down");
        }
    }

    // Always kill Chrome before exiting
    server.shutdown().await;

    tracing::info!("formsync MCP server shut down");
    Ok(())
}
