//! What the controller tells the UI to show.
//!
//! The controller never touches a display directly; every transition and
//! every poll tick goes through a [`Presenter`].

use crate::controller::session::ContainerStatus;
use crate::logs::{NO_LOGS_AVAILABLE, WAITING_FOR_LOGS, format_logs};

/// Which of the four panel buttons are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonGates {
    pub start: bool,
    pub stop: bool,
    pub logs: bool,
    pub delete: bool,
}

impl ButtonGates {
    /// Enablement for a given status. `has_container` distinguishes a stopped
    /// container that can still be deleted from an empty panel.
    pub fn for_state(status: ContainerStatus, has_container: bool) -> Self {
        match status {
            ContainerStatus::Loading => Self {
                start: false,
                stop: false,
                logs: false,
                delete: false,
            },
            ContainerStatus::Running => Self {
                start: false,
                stop: true,
                logs: true,
                delete: true,
            },
            ContainerStatus::Stopped => Self {
                start: true,
                stop: false,
                logs: false,
                delete: has_container,
            },
        }
    }
}

/// Status area of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub status: ContainerStatus,
    pub container_id_prefix: Option<String>,
    /// Text next to the status indicator.
    pub status_text: String,
    /// Longer explanation below the status line.
    pub info_text: String,
    pub buttons: ButtonGates,
}

/// Change to the terminal pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalUpdate {
    /// Clear the pane and show this plain text.
    Replace(String),
    /// Add a plain narration line.
    Append(String),
    /// Replace the pane with the latest log tail.
    Snapshot { raw: String, markup: String },
    /// The tail is empty; show the help text instead of a blank pane.
    Waiting { help: &'static str },
}

impl TerminalUpdate {
    /// The single path from a fetched tail to what the pane shows.
    pub fn from_tail(logs: String) -> Self {
        if logs.trim().is_empty() {
            TerminalUpdate::Waiting {
                help: WAITING_FOR_LOGS,
            }
        } else {
            let markup = format_logs(&logs);
            TerminalUpdate::Snapshot { raw: logs, markup }
        }
    }
}

/// Content of the full-log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogModal {
    Loading,
    Logs { raw: String, markup: String },
    Empty { message: &'static str },
    Failed { message: String },
}

impl LogModal {
    pub fn from_tail(logs: String) -> Self {
        if logs.trim().is_empty() {
            LogModal::Empty {
                message: NO_LOGS_AVAILABLE,
            }
        } else {
            let markup = format_logs(&logs);
            LogModal::Logs { raw: logs, markup }
        }
    }
}

/// Renders controller output. Calls are made from async tasks, so
/// implementations must be cheap and must not block.
pub trait Presenter: Send + Sync {
    fn render(&self, view: &PanelView);

    fn terminal(&self, update: TerminalUpdate);

    fn show_log_modal(&self, modal: LogModal);

    /// Return to the idle placeholder shown before any container exists.
    fn reset_to_placeholder(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gates_follow_status() {
        let empty = ButtonGates::for_state(ContainerStatus::Stopped, false);
        assert!(empty.start && !empty.stop && !empty.logs && !empty.delete);

        let stopped = ButtonGates::for_state(ContainerStatus::Stopped, true);
        assert!(stopped.start && stopped.delete && !stopped.logs);

        let running = ButtonGates::for_state(ContainerStatus::Running, true);
        assert!(!running.start && running.stop && running.logs && running.delete);

        let loading = ButtonGates::for_state(ContainerStatus::Loading, true);
        assert_eq!(
            loading,
            ButtonGates {
                start: false,
                stop: false,
                logs: false,
                delete: false
            }
        );
    }

    #[test]
    fn test_blank_tail_becomes_help() {
        assert_eq!(
            TerminalUpdate::from_tail("  \n\n".to_string()),
            TerminalUpdate::Waiting {
                help: WAITING_FOR_LOGS
            }
        );
    }

    #[test]
    fn test_tail_is_formatted() {
        let update = TerminalUpdate::from_tail("$ ls\n".to_string());
        match update {
            TerminalUpdate::Snapshot { raw, markup } => {
                assert_eq!(raw, "$ ls\n");
                assert_eq!(markup, "<span class=\"log-command\">$ ls</span>\n");
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }
}
