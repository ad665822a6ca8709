//! Log tail rendering for the Mini Shell terminal pane and full-log view.

mod format;

pub use format::{LineKind, classify_line, escape_html, format_logs};

/// Shown instead of a blank terminal when the container has produced no output yet.
pub const WAITING_FOR_LOGS: &str = "Waiting for logs...

You can interact with the Mini Shell using these commands:
- ls (list files)
- cd (change directory)
- echo (print text)
- cat (show a file)
- exit (leave the shell)
";

/// Shown in the full-log view when the tail is empty.
pub const NO_LOGS_AVAILABLE: &str = "No logs available yet.";
