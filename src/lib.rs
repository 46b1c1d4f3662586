//! `norm-curves` library crate.
//!
//! The binary (`norm`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline stays a pure function (I/O only at the process boundary)
//! - modules are reusable (e.g., embedding the scorer in a larger service)

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
pub mod score;
