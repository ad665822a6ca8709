//! CLI command handling.
//!
//! Provides subcommands for:
//! - Driving the Mini Shell panel interactively (`panel`, the default)
//! - Probing the container API (`health`)
//! - Fetching a container's log tail once (`logs`)
//! - Highlighting log text read from stdin (`format`)

mod console;

pub use console::{ConsolePresenter, PanelCommand, run_panel};

use clap::{ColorChoice, Parser, Subcommand};
use tokio::io::AsyncReadExt;

use crate::api::{ContainerApi, HttpContainerApi};
use crate::logs::{WAITING_FOR_LOGS, format_logs};

#[derive(Parser, Debug)]
#[command(name = "minishell-panel")]
#[command(about = "Start, stop, inspect and delete the Mini Shell demo container")]
#[command(
    long_about = "Client for the CV site's container API. Use 'minishell-panel <subcommand> --help' for details.\nExamples:\n  minishell-panel  # Interactive panel\n  minishell-panel health  # Check the backend"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Backend base URL (overrides MINISHELL_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Emit diagnostic logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive panel (default if no subcommand given)
    #[command(
        about = "Run the interactive panel",
        long_about = "Reads start/stop/logs/delete/status/quit from stdin.\nExample: minishell-panel panel"
    )]
    Panel,

    /// Check that the container API is reachable
    Health,

    /// Print the last lines of a container's logs
    #[command(long_about = "Fetch a log tail once.\nExample: minishell-panel logs 4f1c2d3e --tail 200")]
    Logs {
        /// Container id or name
        container_id: String,

        /// Number of lines to fetch
        #[arg(long, default_value_t = 50)]
        tail: u32,

        /// Print the raw text instead of highlighted markup
        #[arg(long)]
        raw: bool,
    },

    /// Highlight log text read from stdin and print the markup
    Format,
}

/// Check the backend and report the outcome.
pub async fn run_health(api: &HttpContainerApi) -> anyhow::Result<()> {
    let envelope = api.health().await;
    if !envelope.is_success() {
        anyhow::bail!(
            "Container API at {} is unavailable: {}",
            api.config().base_url,
            envelope.failure_message()
        );
    }

    let status = envelope
        .data
        .map(|h| h.status)
        .unwrap_or_else(|| "unknown".to_string());
    println!("{} is {}", api.config().base_url, status);
    if let Some(message) = envelope.message {
        println!("{}", message);
    }
    Ok(())
}

/// Fetch one log tail and print it.
pub async fn run_logs(
    api: &dyn ContainerApi,
    container_id: &str,
    tail: u32,
    raw: bool,
) -> anyhow::Result<()> {
    let logs = api
        .fetch_logs(container_id, tail)
        .await
        .into_result()
        .map_err(|message| anyhow::anyhow!("Failed to fetch logs: {}", message))?
        .logs;

    if logs.trim().is_empty() {
        print!("{}", WAITING_FOR_LOGS);
    } else if raw {
        print!("{}", logs);
    } else {
        println!("{}", format_logs(&logs));
    }
    Ok(())
}

/// Read stdin to the end and print its highlighted markup.
pub async fn run_format() -> anyhow::Result<()> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    print!("{}", format_logs(&input));
    Ok(())
}
