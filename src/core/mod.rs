//! Core estimate types, numbering, and the line-item aggregator.
//!
//! Everything in this module is free of I/O: values, pure computations and
//! the error taxonomy shared by the rest of the crate.

pub(crate) mod builder;
mod clock;
mod config;
mod error;
mod numbering;
pub(crate) mod totals;
mod types;

pub use builder::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use numbering::*;
pub use totals::*;
pub use types::*;
