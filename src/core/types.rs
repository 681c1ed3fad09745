use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::numbering::DocumentNumber;

/// Opaque estimate identifier.
pub type EstimateId = Uuid;

/// Opaque line item identifier, unique within an estimate.
pub type LineItemId = Uuid;

/// The estimate aggregate root. Owns its line items exclusively.
///
/// The derived amounts (`subtotal` through `total`, and every
/// `LineItem::total`) are written by the aggregator only; see
/// [`calculate_totals`](crate::core::calculate_totals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub id: EstimateId,
    /// Assigned once at creation, never reassigned.
    pub number: DocumentNumber,
    pub customer: Customer,
    /// Project this estimate was prepared for, if any.
    pub project_id: Option<String>,
    pub project_description: String,
    pub notes: String,
    pub line_items: Vec<LineItem>,
    /// Discount in percent of the subtotal, within `0..=100`.
    pub discount_percent: Decimal,
    /// Tax in percent of the taxable amount, within `0..=100`.
    pub tax_percent: Decimal,
    /// Sum of the rounded line totals.
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    /// `subtotal - discount_amount`.
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    /// `taxable_amount + tax_amount`.
    pub total: Decimal,
    pub valid_until: NaiveDate,
    pub status: EstimateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Estimate {
    /// UTC calendar date of creation, used by date-range filters.
    pub fn created_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    /// True if at least one line item has a non-blank description.
    pub fn has_described_line_item(&self) -> bool {
        self.line_items.iter().any(LineItem::is_described)
    }

    /// Snapshot of the derived amounts currently stored on the estimate.
    pub fn totals(&self) -> Totals {
        Totals {
            line_totals: self.line_items.iter().map(|l| l.total).collect(),
            subtotal: self.subtotal,
            discount_amount: self.discount_amount,
            taxable_amount: self.taxable_amount,
            tax_amount: self.tax_amount,
            total: self.total,
        }
    }
}

/// Customer contact details as printed on the estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }
}

/// A single priced line of an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub description: String,
    /// Quantity, never negative.
    pub quantity: Decimal,
    /// Price per unit, never negative.
    pub unit_price: Decimal,
    /// `round(quantity * unit_price, 2)`.
    pub total: Decimal,
}

impl LineItem {
    pub fn is_described(&self) -> bool {
        !self.description.trim().is_empty()
    }

    /// True if both lines carry the same description, quantity and price.
    /// Ids and totals are ignored.
    pub fn same_content(&self, other: &LineItem) -> bool {
        self.description == other.description
            && self.quantity == other.quantity
            && self.unit_price == other.unit_price
    }
}

/// Caller-supplied line item content. The id is kept when editing an
/// existing line and minted for new ones; the total is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub id: Option<LineItemId>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl LineItemInput {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            id: None,
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// Keep the id of an existing line item.
    pub fn with_id(mut self, id: LineItemId) -> Self {
        self.id = Some(id);
        self
    }

    /// Materialize into a line item with a zero total, ready for
    /// aggregation.
    pub(crate) fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            total: Decimal::ZERO,
        }
    }
}

impl From<&LineItem> for LineItemInput {
    fn from(item: &LineItem) -> Self {
        Self {
            id: Some(item.id),
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Estimate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    /// Editable; the only state in which content may change.
    Draft,
    /// Delivered to the customer, awaiting a decision.
    Sent,
    /// Accepted by the customer. Terminal here; invoicing happens elsewhere.
    Approved,
    /// Declined by the customer. Terminal.
    Rejected,
    /// Lapsed past `valid_until` while sent. Terminal.
    Expired,
}

impl EstimateStatus {
    pub const ALL: [EstimateStatus; 5] = [
        Self::Draft,
        Self::Sent,
        Self::Approved,
        Self::Rejected,
        Self::Expired,
    ];

    /// Lowercase label, also used as the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Parse from the lowercase label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Expired)
    }

    pub fn is_editable(&self) -> bool {
        *self == Self::Draft
    }
}

impl fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived amounts for a set of line items, discount and tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Rounded total per line, in line order.
    pub line_totals: Vec<Decimal>,
    /// Sum of `line_totals`.
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}
