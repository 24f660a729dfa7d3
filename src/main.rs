use anyhow::{Context, Result};
use clap::Parser;
use dork_harvest::config::{
    find_config_file, load_config, load_env_config, ConfigOverrides, FileConfig, RunConfig,
};
use dork_harvest::run::{run, EXIT_CONFIG, EXIT_OK};
use dork_harvest::ui::{self, ConsoleProgress, Status};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Extract URLs from a Google dork via SerpAPI
#[derive(Parser, Debug)]
#[command(name = "dork-harvest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract URLs from a Google dork via SerpAPI", long_about = None)]
#[command(after_help = "Examples:\n  \
    dork-harvest 'site:example.com filetype:pdf' -o example.com_pdfs.txt\n  \
    dork-harvest 'site:example.com filetype:pdf' -o example.com_pdfs.txt --stop-after 10\n  \
    dork-harvest 'site:example.com filetype:pdf' -o example.com_pdfs.json --max-pages 15")]
struct Cli {
    /// Google dork query, e.g. 'site:example.com filetype:pdf'
    dork: Option<String>,

    /// Output file (.txt or .json) [default: results.txt]
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// SerpAPI key (or set SERPAPI_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Results per page [default: 10]
    #[arg(long)]
    num: Option<u32>,

    /// Sleep seconds between pages [default: 1.0]
    #[arg(long)]
    sleep: Option<f64>,

    /// Request timeout seconds [default: 30]
    #[arg(long)]
    timeout: Option<u64>,

    /// Max pages to fetch (0 = unlimited until exhausted)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Stop after N consecutive pages with 0 new URLs (0 = disabled)
    #[arg(long)]
    stop_after: Option<u32>,

    /// Save all links, not just PDF-looking URLs (useful if the dork already includes filetype:pdf)
    #[arg(long)]
    include_non_pdf: bool,

    /// Retries for transient HTTP failures [default: 5]
    #[arg(long)]
    retries: Option<u32>,

    /// Exponential backoff factor in seconds [default: 0.8]
    #[arg(long)]
    backoff: Option<f64>,

    /// SerpAPI endpoint
    #[arg(long, hide = true)]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            query: self.dork.clone(),
            output: self.output.clone(),
            api_key: self.api_key.clone(),
            num: self.num,
            sleep: self.sleep,
            timeout: self.timeout,
            max_pages: self.max_pages,
            stop_after: self.stop_after,
            include_non_pdf: self.include_non_pdf,
            retries: self.retries,
            backoff: self.backoff,
            endpoint: self.endpoint.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match execute(&cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            ui::print_error(&format!("{:#}", err));
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = if quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("dork_harvest={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load the file layer: explicit path, default locations, or env only
fn load_file_config(explicit: Option<&PathBuf>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()));
    }

    if let Some(path) = find_config_file() {
        tracing::info!("Using config file: {}", path.display());
        return load_config(&path)
            .with_context(|| format!("Failed to load config file {}", path.display()));
    }

    load_env_config().context("Failed to read DORK_HARVEST_* environment settings")
}

async fn execute(cli: &Cli) -> Result<u8> {
    let file = load_file_config(cli.config.as_ref())?;
    let config = match RunConfig::from_env(cli.overrides(), &file) {
        Ok(config) => config,
        Err(err) => {
            ui::print_error(&err.to_string());
            return Ok(err.exit_code());
        }
    };
    tracing::debug!("Resolved {:?}", config);

    let progress = if cli.quiet {
        ConsoleProgress::quiet()
    } else {
        ConsoleProgress::new()
    };

    match run(&config, &progress).await {
        Ok(summary) => {
            if !cli.quiet {
                ui::print_status(
                    Status::Success,
                    &ui::saved_line(summary.report.urls.len(), &summary.output_path),
                );
            }
            Ok(EXIT_OK)
        }
        Err(err) => {
            ui::print_error(&format!("{}. No output written.", err));
            Ok(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dork_harvest::config::ConfigError;

    #[test]
    fn test_cli_version() {
        let version = env!("CARGO_PKG_VERSION");
        assert!(!version.is_empty());
        let parts: Vec<&str> = version.split('.').collect();
        assert!(parts.len() >= 2);
        assert!(parts[0].parse::<u32>().is_ok());
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["dork-harvest", "site:example.com filetype:pdf"]);
        assert_eq!(cli.dork.as_deref(), Some("site:example.com filetype:pdf"));
        assert_eq!(cli.output, None);
        assert_eq!(cli.api_key, None);
        assert_eq!(cli.num, None);
        assert_eq!(cli.max_pages, None);
        assert!(!cli.include_non_pdf);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_all_options() {
        let cli = Cli::parse_from([
            "dork-harvest",
            "site:example.com filetype:pdf",
            "-o",
            "example.com_pdfs.json",
            "--api-key",
            "abc",
            "--num",
            "20",
            "--sleep",
            "0.5",
            "--timeout",
            "10",
            "--max-pages",
            "15",
            "--stop-after",
            "3",
            "--include-non-pdf",
            "--retries",
            "2",
            "--backoff",
            "0.1",
        ]);

        let overrides = cli.overrides();
        assert_eq!(overrides.output, Some(PathBuf::from("example.com_pdfs.json")));
        assert_eq!(overrides.api_key.as_deref(), Some("abc"));
        assert_eq!(overrides.num, Some(20));
        assert_eq!(overrides.sleep, Some(0.5));
        assert_eq!(overrides.timeout, Some(10));
        assert_eq!(overrides.max_pages, Some(15));
        assert_eq!(overrides.stop_after, Some(3));
        assert!(overrides.include_non_pdf);
        assert_eq!(overrides.retries, Some(2));
        assert_eq!(overrides.backoff, Some(0.1));
    }

    #[test]
    fn test_cli_long_output_flag() {
        let cli = Cli::parse_from(["dork-harvest", "q", "--output", "out.txt"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["dork-harvest", "q", "-v"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["dork-harvest", "q", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag() {
        let cli = Cli::parse_from(["dork-harvest", "q", "--quiet"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_rejects_bad_numbers() {
        assert!(Cli::try_parse_from(["dork-harvest", "q", "--num", "ten"]).is_err());
        assert!(Cli::try_parse_from(["dork-harvest", "q", "--max-pages", "-1"]).is_err());
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let cli = Cli::parse_from(["dork-harvest", "q", "--api-key", ""]);
        let file = FileConfig::default();
        let err = RunConfig::resolve(cli.overrides(), &file, |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }
}
