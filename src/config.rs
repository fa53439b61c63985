/// Run-wide settings. Every field has a default matching the standard
/// behavior; command-line flags override individual values.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub output: OutputConfig,
    pub chart: ChartConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Appended to the input path once its extension is stripped.
    pub suffix: String,
}

#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    /// Radius of the point markers, in pixels.
    pub point_radius: u32,
    pub line_width: u32,
    /// Upper bound on labelled (major) ticks along the time axis.
    pub max_time_labels: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Stop at the first failing file instead of moving on to the next.
    pub fail_fast: bool,
}

// --- Default implementations ---

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: "_rate_analysis.png".to_string(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            point_radius: 2,
            line_width: 2,
            max_time_labels: 24,
        }
    }
}
