use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vyna_agent::{
    AgentConfig, AgentSession, Assistant, assets, config, console, routes, state::AppState,
    worker,
};

/// Vyna - voice tutor agent with on-screen illustrations
#[derive(Parser, Debug)]
#[command(name = "vyna-agent")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download illustration images into the cache
    DownloadFiles,

    /// Join the configured LiveKit room and drive tools from the terminal
    Dev,

    /// Run tools against a simulated frontend, without LiveKit
    Console,

    /// Run the token server
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env files before config loading, so RUST_LOG can come from them
    let dotenv = config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    dotenv.log();

    // Initialize crypto provider for TLS connections
    // This must be done before any TLS connections are attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let config = if let Some(config_path) = cli.config {
        info!("Loading configuration from {}", config_path.display());
        AgentConfig::from_file(&config_path)?
    } else {
        AgentConfig::from_env()?
    };

    match cli.command {
        Commands::DownloadFiles => download_files(&config).await,
        Commands::Dev => worker::run_dev(&config).await,
        Commands::Console => run_console(&config).await,
        Commands::Serve => serve(config).await,
    }
}

async fn download_files(config: &AgentConfig) -> anyhow::Result<()> {
    let catalog = config.illustration_catalog()?;
    let cache_dir = assets::illustration_cache_dir(config);
    let client = reqwest::Client::new();

    let report = assets::download_illustrations(&client, &catalog, &cache_dir).await?;
    println!(
        "Downloaded {} illustration(s), {} already cached, in {}",
        report.downloaded.len(),
        report.skipped.len(),
        cache_dir.display()
    );
    Ok(())
}

async fn run_console(config: &AgentConfig) -> anyhow::Result<()> {
    let frontend = Arc::new(console::ConsoleFrontend::new());
    let session = AgentSession::new(config.session_options()).with_room(frontend.clone());
    let assistant = Assistant::new(config.illustration_catalog()?);

    println!("{}", assistant.instructions());
    println!("Frontend simulated as '{}'. Type 'help' for commands.", frontend.identity());

    let stdin = BufReader::new(tokio::io::stdin());
    console::run_prompt(&assistant, &session, stdin, tokio::io::stdout()).await?;
    Ok(())
}

async fn serve(config: AgentConfig) -> anyhow::Result<()> {
    let address = config.address();
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;

    let app = routes::api::create_api_router(AppState::new(config));

    println!("Server listening on http://{}", socket_addr);
    let listener = TcpListener::bind(&socket_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
