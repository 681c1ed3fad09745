use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::types::*;

/// Upper bound on line items per estimate.
pub const MAX_LINE_ITEMS: usize = 10_000;

/// Input for creating an estimate. Numbers, ids, timestamps, status and
/// totals are all assigned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEstimate {
    pub customer: Customer,
    pub project_id: Option<String>,
    pub project_description: String,
    pub notes: String,
    pub line_items: Vec<LineItemInput>,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    /// Defaults to the configured validity period from the creation date.
    pub valid_until: Option<NaiveDate>,
}

impl NewEstimate {
    /// Shape checks that do not depend on stored state.
    /// Returns all findings (not just the first).
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        validate_customer(&self.customer, &mut errors);
        validate_line_inputs(&self.line_items, &mut errors);
        errors
    }
}

pub(crate) fn validate_customer(customer: &Customer, errors: &mut Vec<ValidationError>) {
    if customer.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "customer.name",
            "customer name is required",
        ));
    }
}

pub(crate) fn validate_line_inputs(items: &[LineItemInput], errors: &mut Vec<ValidationError>) {
    if items.len() > MAX_LINE_ITEMS {
        errors.push(ValidationError::new(
            "line_items",
            format!("an estimate cannot have more than {MAX_LINE_ITEMS} line items"),
        ));
    }
    let mut seen = std::collections::HashSet::new();
    for (i, item) in items.iter().enumerate() {
        if let Some(id) = item.id {
            if !seen.insert(id) {
                errors.push(ValidationError::new(
                    format!("line_items[{i}].id"),
                    format!("duplicate line item id {id}"),
                ));
            }
        }
    }
}

/// Builder for [`NewEstimate`].
///
/// ```
/// use offerta::core::*;
/// use rust_decimal_macros::dec;
///
/// let new = NewEstimateBuilder::new("Jane Doe")
///     .email("jane@example.com")
///     .project_description("Kitchen remodel")
///     .add_line("Cabinet install", dec!(1), dec!(1200))
///     .add_line("Countertop", dec!(3.5), dec!(80))
///     .discount(dec!(5))
///     .tax(dec!(8.25))
///     .build();
///
/// assert!(new.validate().is_empty());
/// ```
pub struct NewEstimateBuilder {
    customer: Customer,
    project_id: Option<String>,
    project_description: String,
    notes: String,
    line_items: Vec<LineItemInput>,
    discount_percent: Decimal,
    tax_percent: Decimal,
    valid_until: Option<NaiveDate>,
}

impl NewEstimateBuilder {
    pub fn new(customer_name: impl Into<String>) -> Self {
        Self::for_customer(Customer::new(customer_name))
    }

    pub fn for_customer(customer: Customer) -> Self {
        Self {
            customer,
            project_id: None,
            project_description: String::new(),
            notes: String::new(),
            line_items: Vec::new(),
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
            valid_until: None,
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.customer.email = email.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.customer.phone = phone.into();
        self
    }

    pub fn project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn project_description(mut self, description: impl Into<String>) -> Self {
        self.project_description = description.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn add_line(
        mut self,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        self.line_items
            .push(LineItemInput::new(description, quantity, unit_price));
        self
    }

    pub fn add_line_input(mut self, input: LineItemInput) -> Self {
        self.line_items.push(input);
        self
    }

    pub fn discount(mut self, percent: Decimal) -> Self {
        self.discount_percent = percent;
        self
    }

    pub fn tax(mut self, percent: Decimal) -> Self {
        self.tax_percent = percent;
        self
    }

    pub fn valid_until(mut self, date: NaiveDate) -> Self {
        self.valid_until = Some(date);
        self
    }

    pub fn build(self) -> NewEstimate {
        NewEstimate {
            customer: self.customer,
            project_id: self.project_id,
            project_description: self.project_description,
            notes: self.notes,
            line_items: self.line_items,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
            valid_until: self.valid_until,
        }
    }
}

/// Builder for a standalone [`LineItem`]. The total is left at zero until
/// the line passes through the aggregator.
pub struct LineItemBuilder {
    id: Option<LineItemId>,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
}

impl LineItemBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            id: None,
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    pub fn id(mut self, id: LineItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn build(self) -> LineItem {
        LineItemInput {
            id: self.id,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
        .into_line_item()
    }
}
