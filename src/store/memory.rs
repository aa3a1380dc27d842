use std::sync::RwLock;
use tracing::debug;

use super::{SampleStore, Snapshot};
use crate::error::StoreError;
use crate::normalize::DimensionFilter;
use crate::sample::{NewSample, Sample, SampleUpdate};

/// A [`SampleStore`] held entirely in memory.
///
/// Each write takes the lock once, so a reading and the grades derived from
/// it are never observed half-applied.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    rows: Vec<Sample>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests every row, assigning ids in input order.
    pub fn from_rows(rows: Vec<NewSample>) -> Result<Self, StoreError> {
        let store = Self::new();
        {
            let mut inner = store.inner.write().map_err(|_| StoreError::Poisoned)?;
            for row in rows {
                inner.commit(row)?;
            }
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn commit(&mut self, row: NewSample) -> Result<Sample, StoreError> {
        if row.river_name.trim().is_empty() {
            return Err(StoreError::InvalidData("river_name is blank".to_string()));
        }

        let mut sample = Sample::ingest(row);
        self.next_id += 1;
        sample.id = self.next_id;
        self.rows.push(sample.clone());
        Ok(sample)
    }
}

#[async_trait::async_trait]
impl SampleStore for MemoryStore {
    async fn query(&self, filter: &DimensionFilter) -> Result<Snapshot, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let rows: Vec<Sample> = inner
            .rows
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        debug!(?filter, rows = rows.len(), "Snapshot taken");
        Ok(Snapshot::new(rows))
    }

    async fn insert(&self, sample: NewSample) -> Result<Sample, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        inner.commit(sample)
    }

    async fn update(&self, id: u64, update: SampleUpdate) -> Result<Sample, StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let sample = inner
            .rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))?;
        sample.apply_update(update);
        Ok(sample.clone())
    }
}
