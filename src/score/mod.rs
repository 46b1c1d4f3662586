//! Subject scoring and rank classification.
//!
//! Each subject is standardized against the reference curve point nearest
//! its age, then bucketed into one of five ordinal ranks. Both steps are
//! pure per-subject functions of read-only inputs: no subject's result
//! depends on another's, and the whole pass is order independent.

use crate::domain::{Rank, ReferenceCurve, SubjectScore};

/// Index of the grid age closest to `age`.
///
/// Exact ties resolve to the earliest index; floating comparisons can
/// produce exact ties at symmetric grid spacing, so the rule is explicit
/// rather than left to the minimum search. Ages outside the grid range
/// clamp naturally to a boundary index. Returns `None` only for an empty
/// grid or a non-finite age.
pub fn nearest_grid_index(age: f64, grid: &[f64]) -> Option<usize> {
    if !age.is_finite() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, &g) in grid.iter().enumerate() {
        let d = (age - g).abs();
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Standardized deviation of one subject from the age-matched reference.
///
/// `None` when the subject's age or normalized score is missing, the nearest
/// grid point is undefined, or the local standard error is zero/non-finite.
pub fn standardized_deviation(
    age: Option<f64>,
    normalized_score: Option<f64>,
    curve: &ReferenceCurve,
) -> Option<f64> {
    let idx = nearest_grid_index(age?, &curve.grid)?;
    let point = curve.points[idx]?;
    let ns = normalized_score?;

    if !(point.se_pred.is_finite() && point.se_pred != 0.0) {
        return None;
    }

    Some((ns - point.mean) / point.se_pred)
}

/// Map a standardized deviation to its ordinal rank.
///
/// The rules are evaluated in order with inclusive upper boundaries:
/// `v <= -2`, `(-2, -1]`, `(-1, +1]`, `(+1, +2]`, `v > +2`. NaN satisfies no
/// comparison and is unclassifiable; infinities land in the extreme buckets.
pub fn classify(v: f64) -> Option<Rank> {
    if v.is_nan() {
        None
    } else if v <= -2.0 {
        Some(Rank::WellBelow)
    } else if v <= -1.0 {
        Some(Rank::Below)
    } else if v <= 1.0 {
        Some(Rank::Typical)
    } else if v <= 2.0 {
        Some(Rank::Above)
    } else {
        Some(Rank::WellAbove)
    }
}

/// Score one subject against the reference curve.
pub fn score_subject(
    age: Option<f64>,
    normalized_score: Option<f64>,
    curve: &ReferenceCurve,
) -> SubjectScore {
    let deviation = standardized_deviation(age, normalized_score, curve);
    SubjectScore {
        normalized_score,
        deviation,
        rank: deviation.and_then(classify),
    }
}
