//! Per-file extraction output: samples grouped into one series per label.

use chrono::NaiveDateTime;

/// One observation of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value: i64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: i64) -> Self {
        Self { timestamp, value }
    }
}

/// Samples for a single label, in the order the lines were encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Copy of this series ordered by timestamp.
    ///
    /// The sort is stable: samples sharing a timestamp keep encounter order.
    pub fn sorted(&self) -> Series {
        let mut samples = self.samples.clone();
        samples.sort_by_key(|s| s.timestamp);
        Series { samples }
    }
}

impl From<Vec<Sample>> for Series {
    fn from(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

/// Mapping from metric label to its series for one input file.
///
/// Every label of the pattern table is present, in declaration order,
/// whether or not it matched anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    entries: Vec<(String, Series)>,
}

impl ExtractionResult {
    /// Create a result with an empty series for each label.
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: labels
                .into_iter()
                .map(|label| (label.into(), Series::new()))
                .collect(),
        }
    }

    pub fn get(&self, label: &str) -> Option<&Series> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, series)| series)
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut Series> {
        self.entries
            .iter_mut()
            .find(|(l, _)| l == label)
            .map(|(_, series)| series)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.entries.iter().map(|(l, s)| (l.as_str(), s))
    }

    /// Total number of samples across all labels.
    pub fn sample_count(&self) -> usize {
        self.entries.iter().map(|(_, s)| s.len()).sum()
    }

    /// Copy with every series sorted by timestamp.
    pub fn sorted(&self) -> ExtractionResult {
        ExtractionResult {
            entries: self
                .entries
                .iter()
                .map(|(l, s)| (l.clone(), s.sorted()))
                .collect(),
        }
    }
}
