//! Core types for BoM compliance and impacted-substances results.
//!
//! This crate holds the indicator model, the substance merger and the typed
//! item-result tree. It performs no I/O; the raw service responses are turned
//! into these types by `bomcheck-results`.

pub mod error;
pub mod indicator;
pub mod item;
pub mod message;
pub mod reference;
pub mod substance;

pub use error::{Error, Result};
