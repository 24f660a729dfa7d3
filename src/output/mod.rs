//! Result writer.
//!
//! The URL set is written sorted ascending, either as a JSON array (when the
//! output path ends in `.json`) or as plain text with one URL per line.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Output file format, chosen from the path's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One URL per line
    Text,
    /// Pretty-printed JSON array of strings
    Json,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Errors while writing the output file
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize URLs: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Render the URL set in the given format
pub fn render(urls: &BTreeSet<String>, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(urls)?),
        OutputFormat::Text => Ok(urls.iter().map(|url| format!("{}\n", url)).collect()),
    }
}

/// Write the URL set to `path`, replacing any existing file
pub fn write_urls(urls: &BTreeSet<String>, path: &Path) -> Result<OutputFormat, OutputError> {
    let format = OutputFormat::from_path(path);
    let content = render(urls, format)?;

    std::fs::write(path, content).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Wrote {} URLs to {} as {}", urls.len(), path.display(), format);
    Ok(format)
}
