use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{Customer, EstimateStatus, LineItemInput};

/// Partial update of an estimate. `None` leaves a field unchanged.
///
/// Everything except `status` is content and may only change while the
/// estimate is a draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatePatch {
    pub customer: Option<Customer>,
    /// `Some(None)` unlinks the project.
    pub project_id: Option<Option<String>>,
    pub project_description: Option<String>,
    pub notes: Option<String>,
    pub valid_until: Option<NaiveDate>,
    /// Replaces the full list of line items, in order.
    pub line_items: Option<Vec<LineItemInput>>,
    pub discount_percent: Option<Decimal>,
    pub tax_percent: Option<Decimal>,
    pub status: Option<EstimateStatus>,
}

impl EstimatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn project(mut self, project_id: Option<String>) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn project_description(mut self, description: impl Into<String>) -> Self {
        self.project_description = Some(description.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn valid_until(mut self, date: NaiveDate) -> Self {
        self.valid_until = Some(date);
        self
    }

    pub fn line_items(mut self, items: Vec<LineItemInput>) -> Self {
        self.line_items = Some(items);
        self
    }

    pub fn discount(mut self, percent: Decimal) -> Self {
        self.discount_percent = Some(percent);
        self
    }

    pub fn tax(mut self, percent: Decimal) -> Self {
        self.tax_percent = Some(percent);
        self
    }

    pub fn status(mut self, status: EstimateStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// True if the patch changes line items, discount or tax.
    pub fn touches_pricing(&self) -> bool {
        self.line_items.is_some() || self.discount_percent.is_some() || self.tax_percent.is_some()
    }

    /// True if the patch changes anything besides the status.
    pub fn touches_content(&self) -> bool {
        self.touches_pricing()
            || self.customer.is_some()
            || self.project_id.is_some()
            || self.project_description.is_some()
            || self.notes.is_some()
            || self.valid_until.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_content() && self.status.is_none()
    }
}
