use rust_decimal::Decimal;
use thiserror::Error;

use super::numbering::DocumentNumber;
use super::types::{EstimateId, EstimateStatus};

/// Errors returned by every fallible engine operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EstimateError {
    /// One or more input fields failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Discount or tax percentage outside `0..=100`.
    #[error("invalid percentage for {field}: {value} (must be between 0 and 100)")]
    InvalidPercentage { field: &'static str, value: Decimal },

    /// A line item carries a negative quantity or unit price.
    #[error("line item {index} has a negative quantity or unit price")]
    InvalidQuantityOrPrice { index: usize },

    /// The allocator could not claim a unique number within its retry budget.
    #[error("could not allocate a unique number for {year} after {attempts} attempts")]
    AllocationConflict { year: i32, attempts: u32 },

    /// Content edits are only allowed while the estimate is a draft.
    #[error("estimate {number} is locked (status: {status})")]
    EstimateLocked {
        number: DocumentNumber,
        status: EstimateStatus,
    },

    /// The requested status change is not part of the state machine.
    #[error("cannot move estimate from {from} to {to}")]
    InvalidTransition {
        from: EstimateStatus,
        to: EstimateStatus,
    },

    /// No estimate with this id exists.
    #[error("estimate not found: {0}")]
    NotFound(EstimateId),

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Coarse error category, for callers that map failures to presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    AllocationConflict,
    EstimateLocked,
    InvalidTransition,
    NotFound,
    StoreUnavailable,
}

impl EstimateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InvalidPercentage { .. }
            | Self::InvalidQuantityOrPrice { .. } => ErrorKind::Validation,
            Self::AllocationConflict { .. } => ErrorKind::AllocationConflict,
            Self::EstimateLocked { .. } => ErrorKind::EstimateLocked,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// Whether retrying the whole operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AllocationConflict | ErrorKind::StoreUnavailable
        )
    }

    pub(crate) fn from_findings(errors: &[ValidationError]) -> Self {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self::Validation(msg)
    }
}

/// A single validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "customer.name").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
