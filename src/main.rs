mod analyze;
mod config;
mod detector;
mod extract;
mod metric;
mod render;
mod series;

use clap::Parser;
use config::AnalysisConfig;
use metric::PatternSpec;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Extract timestamped metrics from log files and chart them over time:
/// one PNG per input, written next to it as `<name>_rate_analysis.png`.
#[derive(Parser, Debug)]
#[command(name = "rate-analysis", version, about)]
pub struct Cli {
    /// Log files to analyze, processed in order
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Output file suffix (default: _rate_analysis.png)
    #[arg(long)]
    suffix: Option<String>,

    /// Chart width in pixels (default: 1200)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Chart height in pixels (default: 600)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Stop at the first file that fails instead of moving on
    #[arg(long)]
    fail_fast: bool,

    /// Debug-level trace
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(suffix) = &self.suffix {
            config.output.suffix = suffix.clone();
        }
        if let Some(width) = self.width {
            config.chart.width = width;
        }
        if let Some(height) = self.height {
            config.chart.height = height;
        }
        if self.fail_fast {
            config.batch.fail_fast = true;
        }
    }

    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    let spec = match PatternSpec::reference() {
        Ok(spec) => spec,
        Err(e) => {
            tracing::error!(error = %e, "invalid pattern table");
            return ExitCode::FAILURE;
        }
    };
    for metric in spec.iter() {
        tracing::debug!(label = %metric.label, axis = %metric.axis, "metric rule");
    }

    let mut config = AnalysisConfig::default();
    cli.apply_overrides(&mut config);
    tracing::debug!(?config, "resolved settings");

    analyze::analyze_all(&cli.files, &spec, &config).exit_code()
}
