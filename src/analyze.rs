//! Per-file pipeline (extract, then render) and the sequential batch loop
//! over command-line inputs.

use crate::config::AnalysisConfig;
use crate::extract::{extract_file, ExtractError};
use crate::metric::PatternSpec;
use crate::render::{output_path, render_chart, RenderError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Why a single input file produced no chart.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Extract metrics from `path` and write its chart next to it.
///
/// Returns the path of the written image.
pub fn analyze_file(
    path: &Path,
    spec: &PatternSpec,
    config: &AnalysisConfig,
) -> Result<PathBuf, AnalyzeError> {
    let result = extract_file(path, spec)?;
    let output = output_path(path, &config.output.suffix);
    render_chart(&result, spec, &output, &config.chart)?;
    Ok(output)
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, AnalyzeError)>,
    /// Inputs never attempted because an earlier file failed in fail-fast mode.
    pub skipped: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Analyze every path in order, one file at a time.
pub fn analyze_all<P: AsRef<Path>>(
    paths: &[P],
    spec: &PatternSpec,
    config: &AnalysisConfig,
) -> BatchSummary {
    run_batch(paths, config.batch.fail_fast, |path| {
        analyze_file(path, spec, config)
    })
}

/// Batch loop with the per-file step supplied by the caller.
///
/// A failing file is logged and the loop moves on, unless `fail_fast` is
/// set, in which case the remaining inputs are recorded as skipped.
fn run_batch<P, F>(paths: &[P], fail_fast: bool, mut analyze: F) -> BatchSummary
where
    P: AsRef<Path>,
    F: FnMut(&Path) -> Result<PathBuf, AnalyzeError>,
{
    let mut summary = BatchSummary::default();

    for (index, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        match analyze(path) {
            Ok(output) => summary.written.push(output),
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "analysis failed");
                summary.failed.push((path.to_path_buf(), e));
                if fail_fast {
                    summary.skipped = paths[index + 1..]
                        .iter()
                        .map(|p| p.as_ref().to_path_buf())
                        .collect();
                    if !summary.skipped.is_empty() {
                        tracing::warn!(
                            remaining = summary.skipped.len(),
                            "stopping after first failure"
                        );
                    }
                    break;
                }
            }
        }
    }

    tracing::info!(
        written = summary.written.len(),
        failed = summary.failed.len(),
        skipped = summary.skipped.len(),
        "batch complete"
    );
    summary
}
