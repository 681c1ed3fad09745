use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::core::Estimate;

/// Sort order for estimate listings. Each key has one fixed comparator;
/// ties always fall back to the estimate id, ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Rendered number text, ascending. Lexicographic, so `EST-2025-1000`
    /// sorts before `EST-2025-999`.
    #[default]
    Number,
    /// Customer name, ascending, case-insensitive.
    ClientName,
    /// Newest first.
    CreatedDate,
    /// Soonest expiry first.
    ValidUntil,
    /// Highest total first.
    Total,
    /// Status label, ascending.
    Status,
}

impl SortKey {
    pub fn compare(&self, a: &Estimate, b: &Estimate) -> Ordering {
        let primary = match self {
            Self::Number => a.number.to_string().cmp(&b.number.to_string()),
            Self::ClientName => a
                .customer
                .name
                .to_lowercase()
                .cmp(&b.customer.name.to_lowercase())
                .then_with(|| a.customer.name.cmp(&b.customer.name)),
            Self::CreatedDate => b.created_at.cmp(&a.created_at),
            Self::ValidUntil => a.valid_until.cmp(&b.valid_until),
            Self::Total => b.total.cmp(&a.total),
            Self::Status => a.status.label().cmp(b.status.label()),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// Sort in place; the result depends only on the estimates, never on
    /// their input order.
    pub fn sort(&self, estimates: &mut [Estimate]) {
        estimates.sort_by(|a, b| self.compare(a, b));
    }
}
