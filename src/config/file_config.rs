//! Configuration file support.
//!
//! Every setting the command line accepts can also live in a TOML file, which
//! is how a fixed dork is kept around between runs:
//!
//! ```toml
//! query = "site:example.com filetype:pdf"
//! output = "example.com_pdfs.txt"
//! num = 10
//! sleep = 1.5
//! timeout = 30
//! max_pages = 15
//! stop_after = 3
//! include_non_pdf = false
//! retries = 5
//! backoff = 0.8
//! ```
//!
//! Values may be overridden with `DORK_HARVEST_*` environment variables
//! (e.g. `DORK_HARVEST_MAX_PAGES=5`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides of file settings
pub const CONFIG_ENV_PREFIX: &str = "DORK_HARVEST";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "dork-harvest.toml";

/// Settings read from the configuration file; all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Results per page
    #[serde(default)]
    pub num: Option<u32>,

    /// Seconds between pages
    #[serde(default)]
    pub sleep: Option<f64>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,

    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Stagnation threshold
    #[serde(default)]
    pub stop_after: Option<u32>,

    #[serde(default)]
    pub include_non_pdf: Option<bool>,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub engine: Option<String>,

    #[serde(default)]
    pub retries: Option<u32>,

    #[serde(default)]
    pub backoff: Option<f64>,
}

/// Load configuration from a TOML file, with environment overrides
pub fn load_config(path: &Path) -> Result<FileConfig, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(env_source())
        .build()?;

    settings.try_deserialize()
}

/// Configuration from environment overrides alone
pub fn load_env_config() -> Result<FileConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

/// Find the configuration file in the default locations.
///
/// Checks `./dork-harvest.toml`, then `<config dir>/dork-harvest/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("dork-harvest").join("config.toml"))
        .filter(|path| path.is_file())
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dork.toml");

        let toml_content = r#"
query = "site:example.com filetype:pdf"
output = "example.com_pdfs.json"
num = 20
sleep = 2.5
timeout = 45
max_pages = 15
stop_after = 3
include_non_pdf = true
retries = 2
backoff = 0.5
"#;

        let mut file = File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(
            config.query,
            Some("site:example.com filetype:pdf".to_string())
        );
        assert_eq!(config.output, Some(PathBuf::from("example.com_pdfs.json")));
        assert_eq!(config.num, Some(20));
        assert_eq!(config.sleep, Some(2.5));
        assert_eq!(config.timeout, Some(45));
        assert_eq!(config.max_pages, Some(15));
        assert_eq!(config.stop_after, Some(3));
        assert_eq!(config.include_non_pdf, Some(true));
        assert_eq!(config.retries, Some(2));
        assert_eq!(config.backoff, Some(0.5));
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_config_file_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "max_pages = 2\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.max_pages, Some(2));
        assert_eq!(config.query, None);
        assert_eq!(config.num, None);
    }

    #[test]
    fn test_config_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/dork-harvest.toml");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_config_file_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");

        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(&path).is_err());
    }
}
