// Youth Transition - Web Server
// Serves the dashboard and the read-only query API

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use youth_transition::{api, logging, DataConfig, DataStore};

#[derive(Parser)]
#[command(name = "youth-server")]
#[command(about = "Youth transition dashboard API")]
#[command(version)]
struct ServerConfig {
    #[command(flatten)]
    data: DataConfig,

    #[arg(long, env = "YT_BIND", default_value = "0.0.0.0:5000")]
    bind: String,

    /// Directory holding the dashboard's static assets
    #[arg(long, default_value = "web")]
    web_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    let config = ServerConfig::parse();

    println!("🌐 Youth Transition Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Resolve the source once; it is not re-checked per request
    let paths = config.data.paths();
    let source = config.data.resolve_source(&paths);
    let store = Arc::new(DataStore::new(source, paths));
    info!(source = source.name(), "data source resolved");

    // Load eagerly so bad input fails before the port is bound
    println!("Loading data ({})...", source.name());
    let loader = Arc::clone(&store);
    let records = tokio::task::spawn_blocking(move || {
        loader.datasets().map(|data| data.total_records())
    })
    .await
    .context("Loader task panicked")?
    .context("Failed to load datasets")?;
    println!("✓ Data loaded successfully! ({} records)", records);

    let app = api::router(store, &config.web_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    println!("\n🚀 Server running on http://{}", config.bind);
    println!("API Endpoints:");
    println!("  GET /api/overview              - Overview statistics");
    println!("  GET /api/states                - All state data");
    println!("  GET /api/monthly               - Monthly trends");
    println!("  GET /api/risk-distribution     - Risk category counts");
    println!("  GET /api/top-performers/<n>    - Top N states");
    println!("  GET /api/bottom-performers/<n> - Bottom N states");
    println!("  GET /api/state/<name>          - Specific state details");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
