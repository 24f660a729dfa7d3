//! One complete run: harvest, then write the output file.

use std::path::PathBuf;

use crate::config::RunConfig;
use crate::harvest::{HarvestError, HarvestReport, Harvester, ProgressSink};
use crate::output::{write_urls, OutputError, OutputFormat};
use crate::sources::{PageSource, SerpApiSource};

/// Exit code for a successful run, whatever the stop reason
pub const EXIT_OK: u8 = 0;
/// Exit code for configuration errors, including a missing API key
pub const EXIT_CONFIG: u8 = 1;
/// Exit code for transport or API errors
pub const EXIT_HARVEST: u8 = 2;
/// Exit code for output write errors
pub const EXIT_OUTPUT: u8 = 3;

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: HarvestReport,
    pub output_path: PathBuf,
    pub format: OutputFormat,
}

/// Errors that fail a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Harvest(#[from] HarvestError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl RunError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Harvest(_) => EXIT_HARVEST,
            RunError::Output(_) => EXIT_OUTPUT,
        }
    }
}

/// Harvest from SerpAPI and write the output file.
///
/// Nothing is written when the harvest fails, so a partial result is never
/// mistaken for a complete one.
pub async fn run(config: &RunConfig, progress: &dyn ProgressSink) -> Result<RunSummary, RunError> {
    let source = SerpApiSource::from_config(config).map_err(HarvestError::from)?;
    run_with_source(&source, config, progress).await
}

/// Same as [`run`] with any page source
pub async fn run_with_source<S>(
    source: &S,
    config: &RunConfig,
    progress: &dyn ProgressSink,
) -> Result<RunSummary, RunError>
where
    S: PageSource + ?Sized,
{
    let report = Harvester::new(source, config)
        .with_progress(progress)
        .run()
        .await?;

    let format = write_urls(&report.urls, &config.output_path)?;

    Ok(RunSummary {
        report,
        output_path: config.output_path.clone(),
        format,
    })
}
