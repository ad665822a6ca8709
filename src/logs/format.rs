//! Highlighting of container log tails for the terminal pane.
//!
//! Escaping runs over the whole text before any line is classified, so
//! classification always sees the escaped form (a raw `>` prompt shows up as
//! `&gt;`). The apostrophe is escaped as `&apos;` rather than a numeric
//! entity so that escaping never introduces a `#` into a line.

/// How a single log line is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Shell prompt or command echo.
    Command,
    Error,
    Success,
    Plain,
}

impl LineKind {
    /// CSS class used when wrapping the line, `None` for plain lines.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            LineKind::Command => Some("log-command"),
            LineKind::Error => Some("log-error"),
            LineKind::Success => Some("log-success"),
            LineKind::Plain => None,
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Classify an already-escaped line. First matching rule wins.
pub fn classify_line(escaped: &str) -> LineKind {
    if escaped.starts_with("&gt;") || escaped.contains('$') || escaped.contains('#') {
        return LineKind::Command;
    }

    let lower = escaped.to_lowercase();
    if lower.contains("error") || lower.contains("erreur") {
        LineKind::Error
    } else if lower.contains("success") || lower.contains("réussi") {
        LineKind::Success
    } else {
        LineKind::Plain
    }
}

/// Turn raw log text into escaped, highlighted markup.
///
/// Line count and order are preserved: the output has exactly as many
/// `'\n'`-separated lines as the input.
pub fn format_logs(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let escaped = escape_html(raw);
    let lines: Vec<String> = escaped
        .split('\n')
        .map(|line| match classify_line(line).css_class() {
            Some(class) => format!("<span class=\"{}\">{}</span>", class, line),
            None => line.to_string(),
        })
        .collect();
    lines.join("\n")
}
