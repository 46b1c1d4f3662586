//! Mathematical utilities: weighted least squares and column normalization.

pub mod normalize;
pub mod wls;

pub use normalize::*;
pub use wls::*;
