//! Read-side façade: filtering, sorting and listing statistics.
//!
//! Filter and sort settings are plain inputs; nothing here holds state
//! between calls or writes to the store.

mod filter;
mod sort;

pub use filter::EstimateFilter;
pub use sort::SortKey;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::{money, Estimate, EstimateError, EstimateStatus};
use crate::store::LedgerStore;

/// Listing statistics over a filtered set of estimates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateSummary {
    pub count: usize,
    /// Estimates awaiting a customer decision.
    pub sent: usize,
    pub approved: usize,
    /// Sum of estimate totals.
    pub total_value: Decimal,
    /// Zero when there are no estimates.
    pub average_value: Decimal,
    /// Approved share of all estimates, in whole percent.
    pub conversion_rate: u32,
}

impl EstimateSummary {
    pub fn from_estimates(estimates: &[Estimate]) -> Self {
        let count = estimates.len();
        let sent = count_status(estimates, EstimateStatus::Sent);
        let approved = count_status(estimates, EstimateStatus::Approved);
        let total_value = money(estimates.iter().map(|e| e.total).sum());

        let (average_value, conversion_rate) = if count == 0 {
            (money(Decimal::ZERO), 0)
        } else {
            let count_dec = Decimal::from(count);
            let rate = (Decimal::from(approved * 100) / count_dec)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            (money(total_value / count_dec), rate.to_u32().unwrap_or(0))
        };

        Self {
            count,
            sent,
            approved,
            total_value,
            average_value,
            conversion_rate,
        }
    }
}

fn count_status(estimates: &[Estimate], status: EstimateStatus) -> usize {
    estimates.iter().filter(|e| e.status == status).count()
}

/// Query façade over a [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct EstimateFinder<S> {
    store: S,
}

impl<S: LedgerStore> EstimateFinder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Estimates matching `filter`, ordered by `sort`. Repeated calls with
    /// the same inputs and no intervening writes return the same sequence.
    pub fn search(
        &self,
        filter: &EstimateFilter,
        sort: SortKey,
    ) -> Result<Vec<Estimate>, EstimateError> {
        let mut estimates = self.store.query(filter)?;
        // Adapters may over-approximate; the filter is authoritative.
        estimates.retain(|e| filter.matches(e));
        sort.sort(&mut estimates);
        tracing::debug!(count = estimates.len(), ?sort, "estimate search");
        Ok(estimates)
    }

    pub fn summary(&self, filter: &EstimateFilter) -> Result<EstimateSummary, EstimateError> {
        let mut estimates = self.store.query(filter)?;
        estimates.retain(|e| filter.matches(e));
        Ok(EstimateSummary::from_estimates(&estimates))
    }
}
