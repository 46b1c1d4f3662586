//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run configuration (`RunConfig`, `AgeUnit`)
//! - parsed subject rows (`SubjectRow`, `SubjectTable`)
//! - the fitted reference curve (`ReferenceCurve`, `CurvePoint`)
//! - per-subject outputs (`SubjectScore`, `Rank`)

pub mod types;

pub use types::*;
