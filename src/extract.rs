//! Line-by-line metric extraction: run every detector of the pattern table
//! over every line of a log source and group the samples by label.

use crate::detector::DetectError;
use crate::metric::PatternSpec;
use crate::series::ExtractionResult;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Errors that abort extraction of a single source.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The source could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A line matched a rule but its fields did not parse.
    #[error("{}:{line_number}: {label}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line_number: usize,
        label: String,
        source: DetectError,
    },
}

/// Open `path` and extract samples from it.
///
/// The file is read through a buffered reader and closed before returning.
pub fn extract_file(path: &Path, spec: &PatternSpec) -> Result<ExtractionResult, ExtractError> {
    tracing::info!(file = %path.display(), "processing file");
    let file = std::fs::File::open(path).map_err(|e| ExtractError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = std::io::BufReader::new(file);
    extract_lines(reader, spec, path)
}

/// Extract samples from any line source.
///
/// Each line is tested against every rule; one line may feed several labels.
/// `source` only names the input in traces and errors. The first line that
/// matches but fails to parse stops extraction.
pub fn extract_lines<R: BufRead>(
    reader: R,
    spec: &PatternSpec,
    source: &Path,
) -> Result<ExtractionResult, ExtractError> {
    let mut result = ExtractionResult::with_labels(spec.labels());
    tracing::debug!(file = %source.display(), metrics = spec.len(), "scanning lines");

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ExtractError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        let line_number = index + 1;

        for metric in spec.iter() {
            let sample = match metric.detector.detect(&line) {
                None => continue,
                Some(Ok(sample)) => sample,
                Some(Err(e)) => {
                    return Err(ExtractError::Parse {
                        path: source.to_path_buf(),
                        line_number,
                        label: metric.label.clone(),
                        source: e,
                    })
                }
            };
            tracing::info!(
                label = %metric.label,
                line = line_number,
                "matched line: {}",
                line.trim()
            );
            if let Some(series) = result.get_mut(&metric.label) {
                series.push(sample);
            }
        }
    }

    for (label, series) in result.iter() {
        tracing::info!(
            file = %source.display(),
            label,
            entries = series.len(),
            "entries"
        );
    }
    tracing::debug!(total = result.sample_count(), "extraction complete");

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::RegexDetector;
    use crate::metric::{Axis, MetricSpec, BLUE, RED};
    use crate::series::Sample;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::io::{Cursor, Write};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 2, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn extract_str(text: &str, spec: &PatternSpec) -> Result<ExtractionResult, ExtractError> {
        extract_lines(Cursor::new(text), spec, Path::new("test.log"))
    }

    const SCENARIO: &str = "\
01/02/23 10:00:00 WARN Bulk request failed. attempt = 2
01/02/23 10:05:00 INFO Current rate limit for bulk request is 500 documents/sec
01/02/23 10:06:00 INFO flushed segment 7
";

    #[test]
    fn test_three_line_scenario() {
        let spec = PatternSpec::reference().unwrap();
        let result = extract_str(SCENARIO, &spec).unwrap();

        assert_eq!(
            result.get("Retry Count").unwrap().samples(),
            &[Sample::new(at(10, 0), 2)]
        );
        assert_eq!(
            result.get("Rate Limit").unwrap().samples(),
            &[Sample::new(at(10, 5), 500)]
        );
        assert!(result.get("Estimated Rate").unwrap().is_empty());
    }

    #[test]
    fn test_every_label_present_for_empty_input() {
        let spec = PatternSpec::reference().unwrap();
        let result = extract_str("", &spec).unwrap();
        assert_eq!(result.iter().count(), spec.len());
        for label in spec.labels() {
            assert!(result.get(label).unwrap().is_empty(), "{label} should be empty");
        }
    }

    #[test]
    fn test_keeps_encounter_order() {
        let spec = PatternSpec::reference().unwrap();
        let text = "\
01/02/23 10:05:00 Current estimated rate is 300 documents/sec
01/02/23 10:01:00 Current estimated rate is 100 documents/sec
";
        let result = extract_str(text, &spec).unwrap();
        let values: Vec<i64> = result
            .get("Estimated Rate")
            .unwrap()
            .samples()
            .iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec![300, 100]);

        let sorted = result.sorted();
        let times: Vec<NaiveDateTime> = sorted
            .get("Estimated Rate")
            .unwrap()
            .samples()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(times, vec![at(10, 1), at(10, 5)]);
    }

    #[test]
    fn test_one_line_can_feed_several_labels() {
        let spec = PatternSpec::new(vec![
            MetricSpec::new(
                "queued",
                RegexDetector::new(r"(\S+ \S+) .*queued=(\d+)").unwrap(),
                Axis::Left,
                BLUE,
            ),
            MetricSpec::new(
                "failed",
                RegexDetector::new(r"(\S+ \S+) .*failed=(\d+)").unwrap(),
                Axis::Right,
                RED,
            ),
        ])
        .unwrap();
        let result = extract_str("01/02/23 10:00:00 stats queued=40 failed=3\n", &spec).unwrap();
        assert_eq!(result.get("queued").unwrap().samples()[0].value, 40);
        assert_eq!(result.get("failed").unwrap().samples()[0].value, 3);
    }

    #[test]
    fn test_parse_error_reports_line_and_label() {
        let spec = PatternSpec::new(vec![MetricSpec::new(
            "level",
            RegexDetector::new(r"(\S+ \S+) level=(\w+)").unwrap(),
            Axis::Left,
            BLUE,
        )])
        .unwrap();
        let text = "01/02/23 10:00:00 level=4\n01/02/23 10:01:00 level=high\n";
        let err = extract_str(text, &spec).unwrap_err();
        match err {
            ExtractError::Parse {
                line_number,
                label,
                source,
                ..
            } => {
                assert_eq!(line_number, 2);
                assert_eq!(label, "level");
                assert!(matches!(source, DetectError::Value { .. }));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cluster.log");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "{SCENARIO}").unwrap();
        drop(f);

        let spec = PatternSpec::reference().unwrap();
        let result = extract_file(&path, &spec).unwrap();
        assert_eq!(result.sample_count(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.log");
        let spec = PatternSpec::reference().unwrap();
        let err = extract_file(&path, &spec).unwrap_err();
        assert!(matches!(err, ExtractError::Io { path: p, .. } if p == path));
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.log");
        std::fs::write(&path, [0xff, 0xfe, b'\n']).unwrap();
        let spec = PatternSpec::reference().unwrap();
        assert!(matches!(
            extract_file(&path, &spec),
            Err(ExtractError::Io { .. })
        ));
    }
}
