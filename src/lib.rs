//! Donor roster service.
//!
//! Builds a searchable, sortable, paginated view of donors enriched with
//! pledge statistics, on top of a record store that only supports filtered
//! reads of one table and keyed bulk lookups of the others.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod roster;
pub mod state;

pub use error::{AppError, Result};
