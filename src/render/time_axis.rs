//! Time coordinate for the chart's x-axis.
//!
//! Bold key points fall on calendar-hour boundaries and light key points
//! every 15 minutes. Both are aligned to midnight; when a span holds more
//! marks than the chart can label, the step doubles until it fits.

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use std::ops::Range;

pub const MAJOR_STEP_MINUTES: i64 = 60;
pub const MINOR_STEP_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAxis {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeAxis {
    /// An empty or inverted span is widened to one minute past `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let end = if end > start {
            end
        } else {
            start + TimeDelta::minutes(1)
        };
        Self { start, end }
    }
}

impl Ranged for TimeAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = NaiveDateTime;

    fn map(&self, value: &NaiveDateTime, limit: (i32, i32)) -> i32 {
        let span = (self.end - self.start).num_milliseconds() as f64;
        let offset = (*value - self.start).num_milliseconds() as f64;
        let pixels = f64::from(limit.1 - limit.0);
        limit.0 + (pixels * offset / span).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<NaiveDateTime> {
        let step = if hint.weight().allow_light_points() {
            MINOR_STEP_MINUTES
        } else {
            MAJOR_STEP_MINUTES
        };
        tick_marks(self.start, self.end, step, hint.max_num_points())
    }

    fn range(&self) -> Range<NaiveDateTime> {
        self.start..self.end
    }
}

/// Marks every `step_minutes` (counted from midnight) inside `start..=end`,
/// coarsened by doubling the step until at most `max_points` remain.
pub fn tick_marks(
    start: NaiveDateTime,
    end: NaiveDateTime,
    step_minutes: i64,
    max_points: usize,
) -> Vec<NaiveDateTime> {
    if max_points == 0 || end < start {
        return Vec::new();
    }

    let mut step = step_minutes.max(1);
    loop {
        let first = align_up(start, step);
        let count = if first > end {
            0
        } else {
            ((end - first).num_minutes() / step + 1) as usize
        };
        if count <= max_points {
            return (0..count as i64)
                .map(|i| first + TimeDelta::minutes(step * i))
                .collect();
        }
        step *= 2;
    }
}

/// Earliest multiple of `step_minutes` past midnight that is not before `t`.
fn align_up(t: NaiveDateTime, step_minutes: i64) -> NaiveDateTime {
    let elapsed = i64::from(t.num_seconds_from_midnight());
    let midnight =
        t - TimeDelta::seconds(elapsed) - TimeDelta::nanoseconds(i64::from(t.nanosecond()));
    let step_secs = step_minutes * 60;
    let rounded = (elapsed + step_secs - 1) / step_secs * step_secs;
    let mut aligned = midnight + TimeDelta::seconds(rounded);
    if aligned < t {
        aligned += TimeDelta::seconds(step_secs);
    }
    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 2, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_hourly_marks_on_hour_boundaries() {
        let marks = tick_marks(at(1, 9, 50, 0), at(1, 12, 10, 0), MAJOR_STEP_MINUTES, 10);
        assert_eq!(marks, vec![at(1, 10, 0, 0), at(1, 11, 0, 0), at(1, 12, 0, 0)]);
    }

    #[test]
    fn test_quarter_hour_marks() {
        let marks = tick_marks(at(1, 10, 0, 0), at(1, 11, 0, 0), MINOR_STEP_MINUTES, 100);
        assert_eq!(
            marks,
            vec![
                at(1, 10, 0, 0),
                at(1, 10, 15, 0),
                at(1, 10, 30, 0),
                at(1, 10, 45, 0),
                at(1, 11, 0, 0),
            ]
        );
    }

    #[test]
    fn test_start_between_marks_rounds_up() {
        let marks = tick_marks(at(1, 10, 0, 1), at(1, 10, 31, 0), MINOR_STEP_MINUTES, 100);
        assert_eq!(marks, vec![at(1, 10, 15, 0), at(1, 10, 30, 0)]);
    }

    #[test]
    fn test_step_doubles_when_over_budget() {
        // 24 hourly marks from 00:00 to 23:00 do not fit in 10.
        let marks = tick_marks(at(1, 0, 0, 0), at(1, 23, 0, 0), MAJOR_STEP_MINUTES, 10);
        assert_eq!(marks.len(), 6);
        assert_eq!(marks[0], at(1, 0, 0, 0));
        assert_eq!(marks[1], at(1, 4, 0, 0));
    }

    #[test]
    fn test_marks_cross_midnight() {
        let marks = tick_marks(at(1, 23, 40, 0), at(2, 0, 20, 0), MAJOR_STEP_MINUTES, 10);
        assert_eq!(marks, vec![at(2, 0, 0, 0)]);
    }

    #[test]
    fn test_span_without_boundary_has_no_marks() {
        let marks = tick_marks(at(1, 10, 1, 0), at(1, 10, 59, 0), MAJOR_STEP_MINUTES, 10);
        assert!(marks.is_empty());
        assert!(tick_marks(at(1, 10, 0, 0), at(1, 12, 0, 0), MAJOR_STEP_MINUTES, 0).is_empty());
    }

    #[test]
    fn test_map_is_linear_over_span() {
        let axis = TimeAxis::new(at(1, 10, 0, 0), at(1, 11, 0, 0));
        assert_eq!(axis.map(&at(1, 10, 0, 0), (100, 700)), 100);
        assert_eq!(axis.map(&at(1, 10, 30, 0), (100, 700)), 400);
        assert_eq!(axis.map(&at(1, 11, 0, 0), (100, 700)), 700);
    }

    #[test]
    fn test_degenerate_span_is_widened() {
        let axis = TimeAxis::new(at(1, 10, 0, 0), at(1, 10, 0, 0));
        assert_eq!(axis.range(), at(1, 10, 0, 0)..at(1, 10, 1, 0));
    }
}
