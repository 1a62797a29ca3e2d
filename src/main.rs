use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use parkcheck::capture::Phase;
use parkcheck::{client, logging, render, router, AppState, Config, GatewayClient, OpenAiVision};

#[derive(Parser)]
#[command(name = "parkcheck")]
#[command(about = "Ask a vision model whether you can park here")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the analysis gateway and web UI
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Analyze parking-sign photos through a running gateway
    Analyze {
        /// Photos of the signs; non-image files are ignored
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Base URL of the gateway
        #[arg(long, default_value = "http://localhost:3000")]
        gateway: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    logging::init("info");

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = Config::from_env()?;
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        Commands::Analyze { files, gateway } => {
            let gateway = GatewayClient::new(gateway);
            let state = client::run_analyze(&gateway, &files).await;
            print!("{}", render::render_state(&state));
            if matches!(state.phase(), Phase::ErrorShown | Phase::Idle) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let model = OpenAiVision::new(&config.api_key).with_base_url(&config.base_url);
    let state = Arc::new(AppState::new(Arc::new(model), &config.model));
    let app = router(state, &config.static_dir, config.body_limit);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, model = %config.model, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
