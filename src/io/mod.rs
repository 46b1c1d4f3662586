//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - augmented-table and summary exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
