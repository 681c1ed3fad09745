//! Ledger store adapter: the boundary to the external document collection.
//!
//! The engine needs exactly two coordination guarantees from a store:
//! a descending range scan over the number key of one year, and a
//! conditional create that fails when the number is already taken. Every
//! call is a blocking I/O boundary and may fail with
//! [`StoreError::Unavailable`].

#[cfg(feature = "memory-store")]
mod memory;

#[cfg(feature = "memory-store")]
pub use memory::InMemoryStore;

use std::sync::Arc;

use thiserror::Error;

use crate::core::{DocumentNumber, Estimate, EstimateError, EstimateId};
use crate::query::EstimateFilter;

/// Failures reported by a store adapter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No document with this id.
    #[error("document not found: {0}")]
    NotFound(EstimateId),

    /// A conditional write was rejected because the number is taken.
    #[error("number {0} is already taken")]
    Conflict(DocumentNumber),

    /// The store could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for EstimateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => EstimateError::NotFound(id),
            StoreError::Conflict(number) => {
                EstimateError::Validation(format!("number {number} cannot be reassigned"))
            }
            StoreError::Unavailable(msg) => EstimateError::StoreUnavailable(msg),
        }
    }
}

/// Persistence capability consumed by the engine.
pub trait LedgerStore: Send + Sync {
    /// The estimate holding the highest sequence of `year`, if any.
    fn find_max_in_year(&self, year: i32) -> Result<Option<Estimate>, StoreError>;

    /// Store a new estimate only if its number (and id) are unused.
    /// Fails with [`StoreError::Conflict`] otherwise. The number is never
    /// observable without its document.
    fn create_if_absent(&self, estimate: &Estimate) -> Result<(), StoreError>;

    fn get(&self, id: EstimateId) -> Result<Estimate, StoreError>;

    /// Replace an existing estimate. Its number must not change.
    fn update(&self, estimate: &Estimate) -> Result<(), StoreError>;

    fn delete(&self, id: EstimateId) -> Result<(), StoreError>;

    /// All estimates matching `filter`, in no particular order.
    fn query(&self, filter: &EstimateFilter) -> Result<Vec<Estimate>, StoreError>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for Arc<S> {
    fn find_max_in_year(&self, year: i32) -> Result<Option<Estimate>, StoreError> {
        (**self).find_max_in_year(year)
    }

    fn create_if_absent(&self, estimate: &Estimate) -> Result<(), StoreError> {
        (**self).create_if_absent(estimate)
    }

    fn get(&self, id: EstimateId) -> Result<Estimate, StoreError> {
        (**self).get(id)
    }

    fn update(&self, estimate: &Estimate) -> Result<(), StoreError> {
        (**self).update(estimate)
    }

    fn delete(&self, id: EstimateId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn query(&self, filter: &EstimateFilter) -> Result<Vec<Estimate>, StoreError> {
        (**self).query(filter)
    }
}
