//! The pattern table: which metrics to look for, which y-axis each one is
//! plotted against, and in what color.

use crate::detector::{MetricDetector, PatternError, RegexDetector};
use plotters::style::RGBColor;
use std::collections::HashSet;
use std::fmt;

/// Which of the two y-scales a metric is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Left,
    Right,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Left => write!(f, "left"),
            Axis::Right => write!(f, "right"),
        }
    }
}

pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const BLUE: RGBColor = RGBColor(0, 0, 255);
/// Web "green" (half intensity), not pure `#00FF00`.
pub const GREEN: RGBColor = RGBColor(0, 128, 0);

/// One row of the pattern table.
pub struct MetricSpec {
    pub label: String,
    pub detector: Box<dyn MetricDetector>,
    pub axis: Axis,
    pub color: RGBColor,
}

impl MetricSpec {
    pub fn new(
        label: impl Into<String>,
        detector: impl MetricDetector + 'static,
        axis: Axis,
        color: RGBColor,
    ) -> Self {
        Self {
            label: label.into(),
            detector: Box::new(detector),
            axis,
            color,
        }
    }
}

impl fmt::Debug for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricSpec")
            .field("label", &self.label)
            .field("axis", &self.axis)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

/// Ordered set of metrics with unique labels.
///
/// Declaration order is kept: it drives the order of series in every
/// extraction result and of entries in each legend.
#[derive(Debug)]
pub struct PatternSpec {
    metrics: Vec<MetricSpec>,
}

impl PatternSpec {
    pub fn new(metrics: Vec<MetricSpec>) -> Result<Self, PatternError> {
        let mut seen = HashSet::new();
        for metric in &metrics {
            if !seen.insert(metric.label.as_str()) {
                return Err(PatternError::DuplicateLabel(metric.label.clone()));
            }
        }
        Ok(Self { metrics })
    }

    /// The bulk-indexing table: retry attempts on the right axis, the
    /// configured and estimated document rates on the left.
    pub fn reference() -> Result<Self, PatternError> {
        Self::new(vec![
            MetricSpec::new(
                "Retry Count",
                RegexDetector::new(
                    r"(\d{2}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*Bulk request failed. attempt = ([0-9])",
                )?,
                Axis::Right,
                RED,
            ),
            MetricSpec::new(
                "Rate Limit",
                RegexDetector::new(
                    r"(\d{2}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*Current rate limit for bulk request is (\d+) documents/sec",
                )?,
                Axis::Left,
                BLUE,
            ),
            MetricSpec::new(
                "Estimated Rate",
                RegexDetector::new(
                    r"(\d{2}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*Current estimated rate is (\d+) documents/sec",
                )?,
                Axis::Left,
                GREEN,
            ),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricSpec> {
        self.metrics.iter()
    }

    #[allow(dead_code)]
    pub fn get(&self, label: &str) -> Option<&MetricSpec> {
        self.metrics.iter().find(|m| m.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }
}
