//! Estimate lifecycle: create, update, duplicate, delete and status changes.
//!
//! Every mutation that affects pricing recomputes the totals before it is
//! persisted, so a stored estimate is always consistent with its line
//! items. Numbers come from the [`SequenceAllocator`] exactly once, at
//! creation.

mod patch;
mod transitions;

pub use patch::EstimatePatch;
pub use transitions::{allowed_transitions, check_transition, validate_for_sending};

use chrono::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::core::builder::{validate_customer, validate_line_inputs};
use crate::core::totals::apply_totals;
use crate::core::{
    Clock, DocumentNumber, EngineConfig, Estimate, EstimateError, EstimateId, EstimateStatus,
    LineItem, LineItemInput, NewEstimate, SystemClock, recompute,
};
use crate::query::EstimateFilter;
use crate::sequence::SequenceAllocator;
use crate::store::LedgerStore;

/// Orchestrates the estimate lifecycle over a [`LedgerStore`].
///
/// ```
/// use offerta::core::*;
/// use offerta::lifecycle::{EstimateManager, EstimatePatch};
/// use offerta::store::InMemoryStore;
/// use rust_decimal_macros::dec;
///
/// let manager = EstimateManager::new(InMemoryStore::new());
/// let estimate = manager
///     .create(NewEstimateBuilder::new("Jane Doe").add_line("Drywall", dec!(2), dec!(50)).build())
///     .unwrap();
/// assert_eq!(estimate.status, EstimateStatus::Draft);
/// assert_eq!(estimate.subtotal, dec!(100.00));
///
/// let sent = manager
///     .update(estimate.id, EstimatePatch::new().status(EstimateStatus::Sent))
///     .unwrap();
/// assert_eq!(sent.number, estimate.number);
/// ```
#[derive(Debug)]
pub struct EstimateManager<S, C = SystemClock> {
    allocator: SequenceAllocator<S>,
    clock: C,
    config: EngineConfig,
}

impl<S: LedgerStore> EstimateManager<S, SystemClock> {
    /// Manager with the wall clock and default configuration.
    pub fn new(store: S) -> Self {
        let config = EngineConfig::default();
        Self {
            allocator: SequenceAllocator::new(store)
                .with_max_attempts(config.max_allocation_attempts),
            clock: SystemClock,
            config,
        }
    }
}

impl<S: LedgerStore, C: Clock> EstimateManager<S, C> {
    /// Manager with an explicit clock and configuration.
    pub fn with_clock(store: S, clock: C, config: EngineConfig) -> Result<Self, EstimateError> {
        config.validate()?;
        Ok(Self {
            allocator: SequenceAllocator::new(store)
                .with_max_attempts(config.max_allocation_attempts),
            clock,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.allocator.store()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Number the next `create` would try first. Nothing is reserved, so
    /// the created estimate may end up with a later number.
    pub fn peek_next_number(&self) -> Result<DocumentNumber, EstimateError> {
        self.allocator.peek(self.clock.current_year())
    }

    /// Create a draft estimate numbered in the current calendar year.
    ///
    /// Inputs are validated and totals computed before a number is claimed,
    /// so rejected input never consumes a sequence.
    #[instrument(skip_all, fields(customer = %new.customer.name))]
    pub fn create(&self, new: NewEstimate) -> Result<Estimate, EstimateError> {
        let errors = new.validate();
        if !errors.is_empty() {
            return Err(EstimateError::from_findings(&errors));
        }

        let line_items = materialize(new.line_items);
        let totals = recompute(&line_items, new.discount_percent, new.tax_percent)?;

        let now = self.clock.now();
        let year = self.clock.current_year();
        let valid_until = new.valid_until.unwrap_or_else(|| {
            self.clock.today() + Duration::days(i64::from(self.config.default_validity_days))
        });

        let mut template = Estimate {
            id: Uuid::nil(),
            number: DocumentNumber::first(year)?,
            customer: new.customer,
            project_id: new.project_id,
            project_description: new.project_description,
            notes: new.notes,
            line_items,
            discount_percent: new.discount_percent,
            tax_percent: new.tax_percent,
            subtotal: Default::default(),
            discount_amount: Default::default(),
            taxable_amount: Default::default(),
            tax_amount: Default::default(),
            total: Default::default(),
            valid_until,
            status: EstimateStatus::Draft,
            created_at: now,
            updated_at: now,
        };
        apply_totals(&mut template, totals);

        let estimate = self.allocator.allocate(year, |number| Estimate {
            id: Uuid::new_v4(),
            number,
            ..template.clone()
        })?;

        info!(
            number = %estimate.number,
            id = %estimate.id,
            total = %estimate.total,
            "estimate created"
        );
        Ok(estimate)
    }

    pub fn get(&self, id: EstimateId) -> Result<Estimate, EstimateError> {
        Ok(self.store().get(id)?)
    }

    /// Apply a patch. Content changes require `Draft`; status changes
    /// follow the state machine in [`check_transition`]. Returns the stored
    /// estimate; an empty or no-op patch writes nothing.
    #[instrument(skip_all, fields(id = %id))]
    pub fn update(&self, id: EstimateId, patch: EstimatePatch) -> Result<Estimate, EstimateError> {
        let current = self.store().get(id)?;

        if patch.touches_content() && !current.status.is_editable() {
            return Err(EstimateError::EstimateLocked {
                number: current.number,
                status: current.status,
            });
        }

        let reprice = patch.touches_pricing();
        let mut next = current.clone();
        let mut errors = Vec::new();

        if let Some(customer) = patch.customer {
            validate_customer(&customer, &mut errors);
            next.customer = customer;
        }
        if let Some(project_id) = patch.project_id {
            next.project_id = project_id;
        }
        if let Some(description) = patch.project_description {
            next.project_description = description;
        }
        if let Some(notes) = patch.notes {
            next.notes = notes;
        }
        if let Some(valid_until) = patch.valid_until {
            next.valid_until = valid_until;
        }

        if let Some(items) = patch.line_items {
            validate_line_inputs(&items, &mut errors);
            next.line_items = materialize(items);
        }
        if !errors.is_empty() {
            return Err(EstimateError::from_findings(&errors));
        }
        if let Some(discount) = patch.discount_percent {
            next.discount_percent = discount;
        }
        if let Some(tax) = patch.tax_percent {
            next.tax_percent = tax;
        }

        if let Some(to) = patch.status {
            if to != current.status {
                if to == EstimateStatus::Sent {
                    let before = next.line_items.len();
                    next.line_items.retain(LineItem::is_described);
                    if next.line_items.len() != before {
                        debug!(
                            dropped = before - next.line_items.len(),
                            "dropping blank line items on send"
                        );
                    }
                }
                check_transition(&next, to, self.clock.today())?;
                next.status = to;
            }
        }

        if reprice || next.line_items.len() != current.line_items.len() {
            let totals = recompute(&next.line_items, next.discount_percent, next.tax_percent)?;
            apply_totals(&mut next, totals);
        }

        if next == current {
            return Ok(current);
        }

        next.updated_at = self.clock.now();
        self.store().update(&next)?;

        if next.status != current.status {
            info!(
                number = %next.number,
                from = %current.status,
                to = %next.status,
                "estimate status changed"
            );
        } else {
            info!(number = %next.number, total = %next.total, "estimate updated");
        }
        Ok(next)
    }

    /// Shorthand for a status-only [`update`](Self::update).
    pub fn set_status(
        &self,
        id: EstimateId,
        status: EstimateStatus,
    ) -> Result<Estimate, EstimateError> {
        self.update(id, EstimatePatch::new().status(status))
    }

    /// Copy an estimate into a new draft with a fresh number from the
    /// current year, fresh line item ids, and the copy suffix appended to
    /// the customer name.
    #[instrument(skip_all, fields(id = %id))]
    pub fn duplicate(&self, id: EstimateId) -> Result<Estimate, EstimateError> {
        let source = self.store().get(id)?;

        let mut customer = source.customer;
        customer.name.push_str(&self.config.copy_suffix);

        let new = NewEstimate {
            customer,
            project_id: source.project_id,
            project_description: source.project_description,
            notes: source.notes,
            line_items: source
                .line_items
                .iter()
                .map(|item| {
                    LineItemInput::new(item.description.clone(), item.quantity, item.unit_price)
                })
                .collect(),
            discount_percent: source.discount_percent,
            tax_percent: source.tax_percent,
            valid_until: Some(source.valid_until),
        };

        let copy = self.create(new)?;
        info!(source = %source.number, number = %copy.number, "estimate duplicated");
        Ok(copy)
    }

    /// Hard delete.
    #[instrument(skip_all, fields(id = %id))]
    pub fn delete(&self, id: EstimateId) -> Result<(), EstimateError> {
        self.store().delete(id)?;
        info!(id = %id, "estimate deleted");
        Ok(())
    }

    /// Mark every sent estimate whose `valid_until` has passed as expired.
    /// Returns the estimates that changed.
    pub fn expire_overdue(&self) -> Result<Vec<Estimate>, EstimateError> {
        let today = self.clock.today();
        let now = self.clock.now();
        let overdue = self
            .store()
            .query(&EstimateFilter::new().status(EstimateStatus::Sent))?
            .into_iter()
            .filter(|e| e.status == EstimateStatus::Sent && e.valid_until < today);

        let mut expired = Vec::new();
        for mut estimate in overdue {
            check_transition(&estimate, EstimateStatus::Expired, today)?;
            estimate.status = EstimateStatus::Expired;
            estimate.updated_at = now;
            self.store().update(&estimate)?;
            info!(
                number = %estimate.number,
                valid_until = %estimate.valid_until,
                "estimate expired"
            );
            expired.push(estimate);
        }
        Ok(expired)
    }
}

fn materialize(items: Vec<LineItemInput>) -> Vec<LineItem> {
    items.into_iter().map(LineItemInput::into_line_item).collect()
}
