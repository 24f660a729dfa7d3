//! Console output for the command-line tool.
//!
//! Status lines carry a bracketed marker (`[+]`, `[i]`, `[!]`) so they stay
//! greppable; markers are colored only when writing to a terminal.

use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::Path;

use crate::harvest::{PageSummary, ProgressSink, StopReason};

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Info,
    Error,
}

/// Status markers for different operations.
pub fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Success => "[+]",
        Status::Info => "[i]",
        Status::Error => "[!]",
    }
}

/// Format a status line, coloring the marker when `color` is set.
pub fn format_status(status: Status, msg: &str, color: bool) -> String {
    let marker = status_marker(status);
    if !color {
        return format!("{} {}", marker, msg);
    }
    match status {
        Status::Success => format!("{} {}", marker.green().bold(), msg),
        Status::Info => format!("{} {}", marker.cyan().bold(), msg),
        Status::Error => format!("{} {}", marker.red().bold(), msg),
    }
}

/// Print a status line to stdout.
pub fn print_status(status: Status, msg: &str) {
    println!("{}", format_status(status, msg, std::io::stdout().is_terminal()));
}

/// Print a diagnostic to stderr.
pub fn print_error(msg: &str) {
    eprintln!(
        "{}",
        format_status(Status::Error, msg, std::io::stderr().is_terminal())
    );
}

/// Format the per-page progress line.
pub fn page_line(summary: &PageSummary) -> String {
    format!(
        "Page {}: got {} results, +{} new URLs (total={})",
        summary.page, summary.results, summary.new_urls, summary.total
    )
}

/// Format the closing line of a successful run.
pub fn saved_line(count: usize, path: &Path) -> String {
    format!("Saved {} URLs to {}", count, path.display())
}

/// Progress sink printing human-readable status lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress {
    quiet: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// A console sink that prints nothing
    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl ProgressSink for ConsoleProgress {
    fn started(&self, query: &str) {
        if !self.quiet {
            print_status(Status::Success, &format!("Dork: {}", query));
        }
    }

    fn page(&self, summary: &PageSummary) {
        if !self.quiet {
            print_status(Status::Success, &page_line(summary));
        }
    }

    fn stopped(&self, reason: &StopReason) {
        if !self.quiet {
            print_status(Status::Info, &reason.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_status_lines() {
        assert_eq!(format_status(Status::Success, "done", false), "[+] done");
        assert_eq!(format_status(Status::Info, "note", false), "[i] note");
        assert_eq!(format_status(Status::Error, "boom", false), "[!] boom");
    }

    #[test]
    fn test_colored_status_keeps_marker() {
        let line = format_status(Status::Error, "boom", true);
        assert!(line.contains("[!]"));
        assert!(line.ends_with(" boom"));
    }

    #[test]
    fn test_page_line() {
        let summary = PageSummary {
            page: 3,
            results: 10,
            new_urls: 4,
            total: 24,
        };
        assert_eq!(
            page_line(&summary),
            "Page 3: got 10 results, +4 new URLs (total=24)"
        );
    }

    #[test]
    fn test_saved_line() {
        assert_eq!(
            saved_line(12, Path::new("example.com_pdfs.txt")),
            "Saved 12 URLs to example.com_pdfs.txt"
        );
    }

    #[test]
    fn test_quiet_console() {
        assert!(ConsoleProgress::quiet().is_quiet());
        assert!(!ConsoleProgress::new().is_quiet());
    }
}
