//! Interactive console rendition of the Mini Shell panel.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crossterm::style::Stylize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::controller::{
    ContainerStatus, LifecycleController, LogModal, PanelView, Presenter, TerminalUpdate,
};

/// A command typed at the panel prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    Start,
    Stop,
    Logs,
    Delete,
    Status,
    Help,
    Quit,
}

impl PanelCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "start" | "run" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "logs" | "log" => Some(Self::Logs),
            "delete" | "rm" | "remove" => Some(Self::Delete),
            "status" | "" => Some(Self::Status),
            "help" | "?" => Some(Self::Help),
            "quit" | "exit" | "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

const HELP: &str = "Commands: start, stop, logs, delete, status, help, quit";

/// Prints panel output to stdout.
///
/// Poll ticks that bring an unchanged tail are not printed again.
#[derive(Default)]
pub struct ConsolePresenter {
    last_tail: Mutex<Option<String>>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `tail` differs from what was last shown.
    fn remember_tail(&self, tail: &str) -> bool {
        let mut last = self
            .last_tail
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if last.as_deref() == Some(tail) {
            return false;
        }
        *last = Some(tail.to_string());
        true
    }

    fn forget_tail(&self) {
        let mut last = self
            .last_tail
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = None;
    }
}

fn indicator(status: ContainerStatus) -> String {
    match status {
        ContainerStatus::Running => "●".green().to_string(),
        ContainerStatus::Loading => "●".yellow().to_string(),
        ContainerStatus::Stopped => "●".red().to_string(),
    }
}

impl Presenter for ConsolePresenter {
    fn render(&self, view: &PanelView) {
        let id = view
            .container_id_prefix
            .as_deref()
            .map(|id| format!("  [ID: {}]", id))
            .unwrap_or_default();
        println!("{} {}{}", indicator(view.status), view.status_text.as_str().bold(), id);
        println!("  {}", view.info_text.as_str().dim());

        let b = view.buttons;
        let gate = |name: &str, enabled: bool| {
            if enabled {
                name.to_string()
            } else {
                name.dark_grey().to_string()
            }
        };
        println!(
            "  {} {} {} {}",
            gate("start", b.start),
            gate("stop", b.stop),
            gate("logs", b.logs),
            gate("delete", b.delete)
        );
    }

    fn terminal(&self, update: TerminalUpdate) {
        match update {
            TerminalUpdate::Replace(text) => {
                self.forget_tail();
                println!("{}", "──── terminal ────".dim());
                println!("{}", text);
            }
            TerminalUpdate::Append(line) => println!("{}", line),
            TerminalUpdate::Snapshot { raw, .. } => {
                if self.remember_tail(&raw) {
                    println!("{}", "──── logs ────".dim());
                    print!("{}", raw);
                    if !raw.ends_with('\n') {
                        println!();
                    }
                }
            }
            TerminalUpdate::Waiting { help } => {
                if self.remember_tail(help) {
                    print!("{}", help);
                }
            }
        }
        let _ = std::io::stdout().flush();
    }

    fn show_log_modal(&self, modal: LogModal) {
        match modal {
            LogModal::Loading => println!("{}", "Loading logs...".dim()),
            LogModal::Logs { raw, .. } => {
                println!("{}", "════ container logs ════".bold());
                print!("{}", raw);
                if !raw.ends_with('\n') {
                    println!();
                }
                println!("{}", "════════════════════════".bold());
            }
            LogModal::Empty { message } => println!("{}", message),
            LogModal::Failed { message } => println!("{} {}", "Error:".red(), message),
        }
    }

    fn reset_to_placeholder(&self) {
        self.forget_tail();
        println!("{}", "No container running.".dim());
    }
}

/// Read commands from stdin until `quit` or end of input.
///
/// Actions run as background tasks so that, for example, `logs` can be typed
/// while a start is still in flight.
pub async fn run_panel(controller: Arc<LifecycleController>) -> anyhow::Result<()> {
    println!("{}", "Mini Shell Terminal".bold());
    println!("{}", HELP);
    controller.refresh_view().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = PanelCommand::parse(&line) else {
            println!("Unknown command '{}'. {}", line.trim(), HELP);
            continue;
        };

        let ctl = Arc::clone(&controller);
        match command {
            PanelCommand::Start => {
                tokio::spawn(async move {
                    ctl.start().await;
                });
            }
            PanelCommand::Stop => {
                tokio::spawn(async move {
                    ctl.stop().await;
                });
            }
            PanelCommand::Delete => {
                tokio::spawn(async move {
                    ctl.delete().await;
                });
            }
            PanelCommand::Logs => {
                tokio::spawn(async move {
                    if ctl.view_full_logs().await.is_none() {
                        println!("No container to read logs from.");
                    }
                });
            }
            PanelCommand::Status => controller.refresh_view().await,
            PanelCommand::Help => println!("{}", HELP),
            PanelCommand::Quit => break,
        }
    }

    controller.teardown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(PanelCommand::parse("start"), Some(PanelCommand::Start));
        assert_eq!(PanelCommand::parse("  STOP "), Some(PanelCommand::Stop));
        assert_eq!(PanelCommand::parse("rm"), Some(PanelCommand::Delete));
        assert_eq!(PanelCommand::parse(""), Some(PanelCommand::Status));
        assert_eq!(PanelCommand::parse("exit"), Some(PanelCommand::Quit));
        assert_eq!(PanelCommand::parse("reboot"), None);
    }

    #[test]
    fn test_unchanged_tail_is_suppressed() {
        let presenter = ConsolePresenter::new();
        assert!(presenter.remember_tail("a\nb\n"));
        assert!(!presenter.remember_tail("a\nb\n"));
        assert!(presenter.remember_tail("a\nb\nc\n"));

        presenter.forget_tail();
        assert!(presenter.remember_tail("a\nb\nc\n"));
    }
}
