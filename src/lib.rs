pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;
pub mod telemetry;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use cli::{Cli, Commands};
pub use config::Config;
use telemetry::Telemetry;

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let telemetry = Telemetry::init(&config)?;

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config, &telemetry).await,
        Commands::CreateAdmin { username, email } => {
            cli::cmd_create_admin(&config, &username, &email).await
        }
        Commands::InitConfig => cli::cmd_init_config(),
    };

    if let Err(e) = &result {
        error!("{e:#}");
    }
    telemetry.shutdown();
    result
}

async fn run_server(config: Config, telemetry: &Telemetry) -> anyhow::Result<()> {
    config.validate()?;

    info!("YaMDb v{} starting...", env!("CARGO_PKG_VERSION"));

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);

    let state = api::create_app_state_from_config(config, telemetry.prometheus_handle()).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }
}
