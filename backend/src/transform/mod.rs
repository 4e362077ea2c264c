//! Transformation module.
//!
//! This module handles roster to report transformation:
//! - Layout: Fixed header offsets and product-column discovery
//! - Aggregate: Person rows to line items and report rows
//! - Pipeline: Main transformation pipeline

pub mod aggregate;
pub mod layout;
pub mod pipeline;

pub use aggregate::{build_rows, collect_persons, round_to};
pub use layout::product_columns;
pub use pipeline::*;
