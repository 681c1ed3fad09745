use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{LedgerStore, StoreError};
use crate::core::{DocumentNumber, Estimate, EstimateId};
use crate::query::EstimateFilter;

/// Process-local store. Every call holds the lock for its whole duration,
/// so the conditional create and the range scan are atomic per call, the
/// same guarantee a document database gives per document.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
    offline: AtomicBool,
}

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<EstimateId, Estimate>,
    numbers: BTreeMap<DocumentNumber, EstimateId>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while offline every call fails with
    /// [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.documents.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.check_online()?;
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.check_online()?;
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }
}

impl LedgerStore for InMemoryStore {
    fn find_max_in_year(&self, year: i32) -> Result<Option<Estimate>, StoreError> {
        let inner = self.read()?;
        let (Ok(lo), Ok(hi)) = (
            DocumentNumber::first(year),
            DocumentNumber::new(year, u32::MAX),
        ) else {
            return Ok(None);
        };
        Ok(inner
            .numbers
            .range(lo..=hi)
            .next_back()
            .and_then(|(_, id)| inner.documents.get(id))
            .cloned())
    }

    fn create_if_absent(&self, estimate: &Estimate) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.numbers.contains_key(&estimate.number)
            || inner.documents.contains_key(&estimate.id)
        {
            tracing::trace!(number = %estimate.number, "conditional create rejected");
            return Err(StoreError::Conflict(estimate.number));
        }
        inner.numbers.insert(estimate.number, estimate.id);
        inner.documents.insert(estimate.id, estimate.clone());
        Ok(())
    }

    fn get(&self, id: EstimateId) -> Result<Estimate, StoreError> {
        self.read()?
            .documents
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn update(&self, estimate: &Estimate) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let stored = inner
            .documents
            .get_mut(&estimate.id)
            .ok_or(StoreError::NotFound(estimate.id))?;
        if stored.number != estimate.number {
            return Err(StoreError::Conflict(estimate.number));
        }
        *stored = estimate.clone();
        Ok(())
    }

    fn delete(&self, id: EstimateId) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let removed = inner.documents.remove(&id).ok_or(StoreError::NotFound(id))?;
        inner.numbers.remove(&removed.number);
        Ok(())
    }

    fn query(&self, filter: &EstimateFilter) -> Result<Vec<Estimate>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .numbers
            .values()
            .filter_map(|id| inner.documents.get(id))
            .filter(|estimate| filter.matches(estimate))
            .cloned()
            .collect())
    }
}
