//! Reference curve construction.
//!
//! Responsibilities:
//!
//! - generate the evenly spaced age grid (`grid`)
//! - run a hard-kernel locally weighted linear fit at each grid age,
//!   in parallel (`curve`)

pub mod curve;
pub mod grid;

pub use curve::*;
pub use grid::*;
