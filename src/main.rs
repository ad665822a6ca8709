//! Mini Shell panel - main entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use minishell_panel::{
    api::HttpContainerApi,
    cli::{Cli, Command, ConsolePresenter, run_format, run_health, run_logs, run_panel},
    config::Config,
    controller::LifecycleController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    let _ = dotenvy::dotenv();

    // Diagnostics go to stderr; stdout belongs to the panel.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("minishell_panel=info"));
    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }

    let command = cli.command.clone().unwrap_or(Command::Panel);
    if matches!(command, Command::Format) {
        return run_format().await;
    }

    let mut config = Config::from_env()?;
    if let Some(ref url) = cli.api_url {
        config.api.set_base_url(url)?;
    }
    tracing::debug!(api = ?config.api, panel = ?config.panel, "Configuration loaded");

    let api = HttpContainerApi::new(config.api.clone())?;

    match command {
        Command::Health => run_health(&api).await,
        Command::Logs {
            container_id,
            tail,
            raw,
        } => run_logs(&api, &container_id, tail, raw).await,
        Command::Format => run_format().await,
        Command::Panel => {
            let controller = Arc::new(LifecycleController::new(
                Arc::new(api),
                Arc::new(ConsolePresenter::new()),
                config.panel,
            ));
            run_panel(controller).await
        }
    }
}
