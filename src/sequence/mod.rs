//! Per-year sequence allocation.
//!
//! Numbers are claimed with optimistic concurrency: read the highest
//! sequence of the year, try to create the owning estimate under the next
//! number with a conditional write, and on conflict re-read and try again.
//! The store's conditional create is the only coordination primitive, so
//! this is safe across threads and across processes sharing a store.

use tracing::{debug, error, info, warn};

use crate::core::{DocumentNumber, Estimate, EstimateError};
use crate::store::{LedgerStore, StoreError};

/// Default number of conditional-write attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Mints collision-free [`DocumentNumber`]s.
///
/// Gaps are possible (a caller may abandon between attempts) and are never
/// filled in; duplicates are not possible as long as the store honours its
/// conditional create.
#[derive(Debug, Clone)]
pub struct SequenceAllocator<S> {
    store: S,
    max_attempts: u32,
}

impl<S: LedgerStore> SequenceAllocator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the retry budget (at least one attempt is always made).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Preview the number the next allocation for `year` would try first.
    /// Nothing is reserved.
    pub fn peek(&self, year: i32) -> Result<DocumentNumber, EstimateError> {
        self.next_candidate(year, None)
    }

    /// Claim the next free number of `year` and persist the estimate that
    /// owns it in the same conditional write.
    ///
    /// `mint` builds the owning estimate for a candidate number; it runs
    /// once per attempt. The returned estimate is exactly what was stored.
    ///
    /// Fails with [`EstimateError::AllocationConflict`] once the retry
    /// budget is spent, and with [`EstimateError::StoreUnavailable`] as
    /// soon as the store cannot be reached.
    pub fn allocate<F>(&self, year: i32, mut mint: F) -> Result<Estimate, EstimateError>
    where
        F: FnMut(DocumentNumber) -> Estimate,
    {
        let mut last_tried = None;

        for attempt in 1..=self.max_attempts {
            let candidate = self.next_candidate(year, last_tried)?;
            debug!(
                year,
                attempt,
                max_attempts = self.max_attempts,
                number = %candidate,
                "attempting number allocation"
            );

            let mut estimate = mint(candidate);
            estimate.number = candidate;

            match self.store.create_if_absent(&estimate) {
                Ok(()) => {
                    if attempt > 1 {
                        info!(number = %candidate, attempt, "number allocated after retry");
                    }
                    return Ok(estimate);
                }
                Err(StoreError::Conflict(taken)) => {
                    warn!(
                        year,
                        attempt,
                        number = %taken,
                        "number taken by a concurrent allocation, retrying"
                    );
                    last_tried = Some(candidate);
                }
                Err(other) => return Err(other.into()),
            }
        }

        error!(
            year,
            attempts = self.max_attempts,
            "number allocation exhausted its retry budget"
        );
        Err(EstimateError::AllocationConflict {
            year,
            attempts: self.max_attempts,
        })
    }

    /// The successor of whichever is higher: the stored maximum of the year
    /// or the last number this caller already lost. Never cached.
    fn next_candidate(
        &self,
        year: i32,
        last_tried: Option<DocumentNumber>,
    ) -> Result<DocumentNumber, EstimateError> {
        let stored_max = self.store.find_max_in_year(year)?.map(|e| e.number);
        match stored_max.max(last_tried) {
            Some(highest) => highest.successor(),
            None => DocumentNumber::first(year),
        }
    }
}
