//! The queryable sample store the engine reads from.
//!
//! [`SampleStore`] is the async boundary trait; [`MemoryStore`] implements
//! it over an in-process vector. [`Snapshot`] is the immutable set of rows a
//! single request works on.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::normalize::{Dimension, DimensionFilter};
use crate::quality::{Indicator, is_valid_reading};
use crate::sample::{NewSample, Sample, SampleUpdate};

/// Reads and writes graded samples.
///
/// Implementations must apply `insert` and `update` atomically: the reading,
/// its grade and the composite are committed together or not at all.
#[async_trait::async_trait]
pub trait SampleStore: Send + Sync {
    /// Returns every sample matching `filter`.
    async fn query(&self, filter: &DimensionFilter) -> Result<Snapshot, StoreError>;

    /// Grades and commits a new sample, returning it with its assigned id.
    async fn insert(&self, sample: NewSample) -> Result<Sample, StoreError>;

    /// Applies `update` to the sample with `id` and returns the result.
    async fn update(&self, id: u64, update: SampleUpdate) -> Result<Sample, StoreError>;
}

/// Summary of the present values of one indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorAggregate {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub present_count: usize,
}

/// An immutable set of samples fetched once per request.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    samples: Vec<Sample>,
}

impl Snapshot {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Counts samples per key.
    pub fn group_count<K, F>(&self, key: F) -> BTreeMap<K, usize>
    where
        K: Ord,
        F: Fn(&Sample) -> K,
    {
        let mut counts = BTreeMap::new();
        for s in &self.samples {
            *counts.entry(key(s)).or_insert(0) += 1;
        }
        counts
    }

    /// Average, maximum and minimum over the present readings of `indicator`.
    /// `None` when no sample carries a reading.
    pub fn aggregate(&self, indicator: Indicator) -> Option<IndicatorAggregate> {
        let values: Vec<f64> = self.readings(indicator).collect();
        if values.is_empty() {
            return None;
        }

        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);

        Some(IndicatorAggregate {
            avg: crate::analyzers::utility::mean(&values),
            max,
            min,
            present_count: values.len(),
        })
    }

    /// Present, valid readings of one indicator.
    pub fn readings(&self, indicator: Indicator) -> impl Iterator<Item = f64> + '_ {
        self.samples
            .iter()
            .filter_map(move |s| s.reading(indicator))
            .filter(|v| is_valid_reading(*v))
    }

    pub fn max_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.iter().map(|s| s.sampling_date).max()
    }

    /// Distinct values of a dimension, sorted.
    pub fn distinct(&self, dimension: Dimension) -> Vec<String> {
        self.group_count(|s| dimension.key_of(s))
            .into_keys()
            .filter(|k| !k.is_empty())
            .collect()
    }
}
