use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{Estimate, EstimateStatus};

/// Conjunctive estimate filter. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateFilter {
    pub status: Option<EstimateStatus>,
    pub project_id: Option<String>,
    /// Case-insensitive prefix of the customer name.
    pub customer_prefix: Option<String>,
    /// Inclusive lower bound on the creation date.
    pub created_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date.
    pub created_to: Option<NaiveDate>,
    /// Case-insensitive substring of the number, customer name or project
    /// description.
    pub search: Option<String>,
}

impl EstimateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: EstimateStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn customer_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.customer_prefix = Some(prefix.into());
        self
    }

    pub fn created_between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    pub fn created_from(mut self, from: NaiveDate) -> Self {
        self.created_from = Some(from);
        self
    }

    pub fn created_to(mut self, to: NaiveDate) -> Self {
        self.created_to = Some(to);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, estimate: &Estimate) -> bool {
        if let Some(status) = self.status {
            if estimate.status != status {
                return false;
            }
        }

        if let Some(project_id) = &self.project_id {
            if estimate.project_id.as_deref() != Some(project_id.as_str()) {
                return false;
            }
        }

        if let Some(prefix) = &self.customer_prefix {
            if !estimate
                .customer
                .name
                .to_lowercase()
                .starts_with(&prefix.to_lowercase())
            {
                return false;
            }
        }

        let created = estimate.created_date();
        if self.created_from.is_some_and(|from| created < from)
            || self.created_to.is_some_and(|to| created > to)
        {
            return false;
        }

        if let Some(term) = &self.search {
            let term = term.trim().to_lowercase();
            if !term.is_empty() {
                let hit = estimate.number.to_string().to_lowercase().contains(&term)
                    || estimate.customer.name.to_lowercase().contains(&term)
                    || estimate.project_description.to_lowercase().contains(&term);
                if !hit {
                    return false;
                }
            }
        }

        true
    }
}
