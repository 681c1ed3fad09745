use chrono::NaiveDate;

use crate::core::builder::validate_customer;
use crate::core::{Estimate, EstimateError, EstimateStatus, ValidationError};

/// Statuses reachable from `from` in one step.
pub fn allowed_transitions(from: EstimateStatus) -> &'static [EstimateStatus] {
    match from {
        EstimateStatus::Draft => &[EstimateStatus::Sent],
        EstimateStatus::Sent => &[
            EstimateStatus::Approved,
            EstimateStatus::Rejected,
            EstimateStatus::Expired,
        ],
        EstimateStatus::Approved | EstimateStatus::Rejected | EstimateStatus::Expired => &[],
    }
}

/// Check that `estimate` may move to `to` on `today`.
///
/// Keeping the current status is always accepted. Leaving `Draft` requires
/// a customer name and a described line item; `Sent → Expired` requires
/// `valid_until` to lie in the past.
pub fn check_transition(
    estimate: &Estimate,
    to: EstimateStatus,
    today: NaiveDate,
) -> Result<(), EstimateError> {
    let from = estimate.status;
    if from == to {
        return Ok(());
    }
    if !allowed_transitions(from).contains(&to) {
        return Err(EstimateError::InvalidTransition { from, to });
    }

    match (from, to) {
        (EstimateStatus::Draft, EstimateStatus::Sent) => {
            let errors = validate_for_sending(estimate);
            if !errors.is_empty() {
                return Err(EstimateError::from_findings(&errors));
            }
        }
        (EstimateStatus::Sent, EstimateStatus::Expired) => {
            if estimate.valid_until >= today {
                return Err(EstimateError::InvalidTransition { from, to });
            }
        }
        _ => {}
    }
    Ok(())
}

/// Requirements an estimate must meet before it leaves `Draft`.
/// Returns all findings (not just the first).
pub fn validate_for_sending(estimate: &Estimate) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_customer(&estimate.customer, &mut errors);
    if !estimate.has_described_line_item() {
        errors.push(ValidationError::new(
            "line_items",
            "at least one line item with a description is required",
        ));
    }
    errors
}
