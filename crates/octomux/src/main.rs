//! octomux: REST proxy for an MT-VIKI 8x8 HDMI matrix switch.
//!
//! Long-running daemon that:
//! - Owns the single matrix client session (transport + health monitor)
//! - Serves a JSON API for routing control and status
//! - Resolves port names so callers can say "PlayStation 5" instead of 2
//!
//! Configuration comes from an optional TOML file plus `OCTOMUX_*`
//! environment variables; see `octomux-config`.

mod api;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use octomux_config::ServiceConfig;
use octomux_core::MatrixController;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "octomux", version, about = "REST proxy for an 8x8 HDMI matrix switch")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, env = "OCTOMUX_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ServiceConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("octomux: {err}");
            std::process::exit(2);
        }
    };

    if cli.print_config {
        match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => {
                eprintln!("octomux: failed to render config: {err}");
                std::process::exit(2);
            }
        }
        return;
    }

    init_tracing(&config);

    if let Err(err) = run(config).await {
        error!(error = %err, "fatal error");
        std::process::exit(1);
    }
}

fn init_tracing(config: &ServiceConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.clone()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting octomux");

    let controller = MatrixController::new(config.matrix_config()?);
    controller.start().await?;

    let app = routes::router(AppState::new(controller.clone()));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, matrix = %controller.config().base_url, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    controller.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    // Errors here mean no signal handler could be installed; serving
    // forever is the safer fallback.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
