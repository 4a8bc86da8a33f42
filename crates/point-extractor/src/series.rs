//! Decoded samples and time series.

use serde::{Deserialize, Serialize};

use crate::calendar::CfDateTime;

/// One decoded reading: a calendar-aware instant and a physical value
/// (NaN when missing).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodedSample {
    pub timestamp: CfDateTime,
    pub value: f64,
}

impl DecodedSample {
    pub fn new(timestamp: CfDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

/// An ordered sequence of decoded samples.
///
/// Duplicate timestamps are allowed; they arise when source files overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    samples: Vec<DecodedSample>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[DecodedSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecodedSample> {
        self.samples.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn push(&mut self, sample: DecodedSample) {
        self.samples.push(sample);
    }

    /// Stable sort by timestamp; equal timestamps keep their insertion order.
    pub fn sort_by_time(&mut self) {
        self.samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }

    /// Remove every NaN-valued entry. Running it twice changes nothing.
    pub fn drop_missing(&mut self) {
        self.samples.retain(|s| !s.is_missing());
    }

    pub fn into_samples(self) -> Vec<DecodedSample> {
        self.samples
    }
}

impl From<Vec<DecodedSample>> for TimeSeries {
    fn from(samples: Vec<DecodedSample>) -> Self {
        Self { samples }
    }
}

impl FromIterator<DecodedSample> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = DecodedSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl Extend<DecodedSample> for TimeSeries {
    fn extend<I: IntoIterator<Item = DecodedSample>>(&mut self, iter: I) {
        self.samples.extend(iter);
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a DecodedSample;
    type IntoIter = std::slice::Iter<'a, DecodedSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
