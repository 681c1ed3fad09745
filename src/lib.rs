//! # offerta
//!
//! Estimate numbering and quote computation engine: collision-free
//! per-year document numbers (`EST-2025-001`), exact line-item totals, a
//! draft → sent → approved/rejected/expired lifecycle, and read-side
//! filtering.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Rounding is half-up to cents at every derived stage.
//!
//! ## Quick Start
//!
//! ```rust
//! use offerta::core::*;
//! use offerta::lifecycle::{EstimateManager, EstimatePatch};
//! use offerta::store::InMemoryStore;
//! use rust_decimal_macros::dec;
//!
//! let manager = EstimateManager::new(InMemoryStore::new());
//!
//! let estimate = manager
//!     .create(NewEstimateBuilder::new("Jane Doe").build())
//!     .unwrap();
//! assert!(estimate.number.to_string().starts_with("EST-"));
//!
//! let priced = manager
//!     .update(
//!         estimate.id,
//!         EstimatePatch::new()
//!             .line_items(vec![LineItemInput::new("Tile work", dec!(2), dec!(50))])
//!             .discount(dec!(10))
//!             .tax(dec!(8.5)),
//!     )
//!     .unwrap();
//! assert_eq!(priced.total, dec!(97.65));
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`core`] | Types, numbering, the line-item aggregator, errors, config |
//! | [`store`] | `LedgerStore` adapter trait, in-memory store (`memory-store` feature, default) |
//! | [`sequence`] | Optimistic per-year number allocation |
//! | [`lifecycle`] | Create / update / duplicate / delete, status transitions |
//! | [`query`] | Filtering, sorting and listing statistics |

pub mod core;
pub mod lifecycle;
pub mod query;
pub mod sequence;
pub mod store;

// Re-export core types at crate root for convenience
pub use crate::core::*;
pub use crate::lifecycle::{EstimateManager, EstimatePatch};
pub use crate::query::{EstimateFilter, EstimateFinder, EstimateSummary, SortKey};
pub use crate::sequence::SequenceAllocator;
pub use crate::store::{LedgerStore, StoreError};
