//! Funding ledger aggregation and reporting for municipal construction
//! projects.
//!
//! [`reports`] holds the pure aggregation engine; the remaining modules load,
//! validate, persist and export the data it consumes and produces.
pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod store;
pub mod types;
pub mod util;
pub mod validate;
