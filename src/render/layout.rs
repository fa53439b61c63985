use super::time_axis::TimeAxis;
use crate::metric::{Axis, PatternSpec};
use crate::series::{ExtractionResult, Sample};
use chrono::{NaiveDateTime, TimeDelta};
use plotters::style::RGBColor;
use std::ops::Range;

/// One label ready to plot: samples sorted by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub color: RGBColor,
    pub samples: Vec<Sample>,
}

impl PlotSeries {
    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, i64)> + '_ {
        self.samples.iter().map(|s| (s.timestamp, s.value))
    }
}

/// Series assigned to one y-axis and the value range that axis spans.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub series: Vec<PlotSeries>,
    pub range: Range<i64>,
}

impl AxisLayout {
    fn new(series: Vec<PlotSeries>) -> Self {
        let range = value_range(&series);
        Self { series, range }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }
}

/// Everything the drawing code needs, computed without touching a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub time: TimeAxis,
    pub left: AxisLayout,
    pub right: AxisLayout,
}

impl ChartLayout {
    /// Sort each non-empty series and route it to the axis its metric
    /// declares. Labels without samples are left out. Order follows the
    /// pattern table.
    pub fn prepare(result: &ExtractionResult, spec: &PatternSpec) -> Self {
        let sorted = result.sorted();
        let mut left = Vec::new();
        let mut right = Vec::new();

        for metric in spec.iter() {
            let series = match sorted.get(&metric.label) {
                Some(s) if !s.is_empty() => s,
                _ => {
                    tracing::debug!(label = %metric.label, "no samples, nothing to plot");
                    continue;
                }
            };
            let plot = PlotSeries {
                label: metric.label.clone(),
                color: metric.color,
                samples: series.samples().to_vec(),
            };
            match metric.axis {
                Axis::Left => left.push(plot),
                Axis::Right => right.push(plot),
            }
        }

        let time = time_span(left.iter().chain(right.iter()));
        Self {
            time,
            left: AxisLayout::new(left),
            right: AxisLayout::new(right),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.series.is_empty() && self.right.series.is_empty()
    }
}

/// Padded time range covering every sample.
///
/// No samples gives the hour after 1970-01-01 00:00:00; a single instant
/// gets 30 minutes either side; otherwise 5% of the span either side.
fn time_span<'a>(series: impl Iterator<Item = &'a PlotSeries>) -> TimeAxis {
    let mut bounds: Option<(NaiveDateTime, NaiveDateTime)> = None;
    for sample in series.flat_map(|s| s.samples.iter()) {
        bounds = Some(match bounds {
            None => (sample.timestamp, sample.timestamp),
            Some((lo, hi)) => (lo.min(sample.timestamp), hi.max(sample.timestamp)),
        });
    }

    match bounds {
        None => {
            let epoch = NaiveDateTime::default();
            TimeAxis::new(epoch, epoch + TimeDelta::hours(1))
        }
        Some((lo, hi)) if lo == hi => {
            let pad = TimeDelta::minutes(30);
            TimeAxis::new(lo - pad, hi + pad)
        }
        Some((lo, hi)) => {
            let pad = (hi - lo) / 20;
            TimeAxis::new(lo - pad, hi + pad)
        }
    }
}

/// Padded value range: ±1 around a single value, 5% margins otherwise,
/// and `0..1` for an axis with nothing on it.
fn value_range(series: &[PlotSeries]) -> Range<i64> {
    let mut values = series.iter().flat_map(|s| s.samples.iter().map(|p| p.value));
    let first = match values.next() {
        Some(v) => v,
        None => return 0..1,
    };
    let (lo, hi) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let span = hi.saturating_sub(lo);
    let pad = if span == 0 {
        1
    } else {
        (span as f64 * 0.05).ceil() as i64
    };
    lo.saturating_sub(pad)..hi.saturating_add(pad)
}
