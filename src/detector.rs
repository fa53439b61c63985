use crate::series::Sample;
use chrono::NaiveDateTime;
use regex::Regex;
use std::num::ParseIntError;

/// Timestamp layout used by the log sources: `DD/MM/YY HH:MM:SS`.
///
/// Two-digit years follow chrono's `%y` pivot: 00-68 are 20xx, 69-99 are 19xx.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// Errors produced when a line matches a detection rule but its fields
/// cannot be turned into a [`Sample`].
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("invalid timestamp {text:?}: {source}")]
    Timestamp {
        text: String,
        source: chrono::ParseError,
    },
    #[error("invalid integer value {text:?}: {source}")]
    Value { text: String, source: ParseIntError },
    #[error("capture group {group} did not participate in the match")]
    MissingField { group: usize },
}

/// Errors produced while building detection rules.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern {pattern:?}: {source}")]
    Regex {
        pattern: String,
        source: regex::Error,
    },
    #[error("pattern {pattern:?} has {found} capture groups, expected exactly 2")]
    CaptureGroups { pattern: String, found: usize },
    #[error("duplicate metric label {0:?}")]
    DuplicateLabel(String),
}

/// Recognizes one metric in a log line.
///
/// A detector owns both halves of the job: deciding whether a line is a
/// match, and turning the matched fields into a typed [`Sample`].
pub trait MetricDetector: Send + Sync {
    /// Inspect a single line.
    ///
    /// Returns `None` when the line does not match. A match whose fields
    /// fail to parse yields `Some(Err(_))`.
    fn detect(&self, line: &str) -> Option<Result<Sample, DetectError>>;
}

/// Regex-backed detector: group 1 is the timestamp text, group 2 the value.
///
/// Matching uses search semantics, so the rule may hit anywhere in the line.
#[derive(Debug, Clone)]
pub struct RegexDetector {
    regex: Regex,
    timestamp_format: String,
}

impl RegexDetector {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(pattern).map_err(|e| PatternError::Regex {
            pattern: pattern.to_string(),
            source: e,
        })?;
        // captures_len() counts the implicit whole-match group.
        let found = regex.captures_len() - 1;
        if found != 2 {
            return Err(PatternError::CaptureGroups {
                pattern: pattern.to_string(),
                found,
            });
        }
        Ok(Self {
            regex,
            timestamp_format: TIMESTAMP_FORMAT.to_string(),
        })
    }

    /// Parse timestamps with `format` instead of [`TIMESTAMP_FORMAT`].
    #[cfg(test)]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }
}

impl MetricDetector for RegexDetector {
    fn detect(&self, line: &str) -> Option<Result<Sample, DetectError>> {
        let caps = self.regex.captures(line)?;
        Some(parse_fields(
            caps.get(1).map(|m| m.as_str()),
            caps.get(2).map(|m| m.as_str()),
            &self.timestamp_format,
        ))
    }
}

fn parse_fields(
    timestamp: Option<&str>,
    value: Option<&str>,
    format: &str,
) -> Result<Sample, DetectError> {
    let timestamp = timestamp.ok_or(DetectError::MissingField { group: 1 })?;
    let value = value.ok_or(DetectError::MissingField { group: 2 })?;

    let timestamp =
        NaiveDateTime::parse_from_str(timestamp, format).map_err(|e| DetectError::Timestamp {
            text: timestamp.to_string(),
            source: e,
        })?;
    let value = value.parse::<i64>().map_err(|e| DetectError::Value {
        text: value.to_string(),
        source: e,
    })?;

    Ok(Sample::new(timestamp, value))
}
