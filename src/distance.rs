//! The distance metric used throughout the core: Euclidean distance with a
//! small epsilon deadband, per spec §3.

use crate::types::{Axis, Coords};
use num_traits::Zero;

/// Trait that needs to be implemented by any potential distance metric used
/// within queries. Mirrors `kiddo`'s `DistanceMetric` trait shape
/// (`distance_metric.rs`), specialized to the fixed two dimensions this
/// engine supports.
pub trait DistanceMetric<A: Axis> {
    /// Returns the adjusted distance between two points.
    fn distance(a: &Coords<A>, b: &Coords<A>) -> A;
}

/// The deadband subtracted from the raw Euclidean distance before any
/// comparison inside the core, per spec §3: "compute the raw Euclidean
/// distance d, then return max(0, d - epsilon) where epsilon = 1e-3".
pub const EPSILON: f64 = 1e-3;

/// Euclidean distance with the epsilon deadband applied. Every comparison
/// inside the tree search core and the aggregators uses this adjusted
/// distance; there is no other distance metric in scope (spec §1 Non-goals).
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjustedEuclidean;

impl<A: Axis> DistanceMetric<A> for AdjustedEuclidean {
    #[inline]
    fn distance(a: &Coords<A>, b: &Coords<A>) -> A {
        let dx = a[0] - b[0];
        let dy = a[1] - b[1];
        let raw = (dx * dx + dy * dy).sqrt();
        let eps = A::from(EPSILON).unwrap_or_else(A::zero);
        (raw - eps).max(A::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_coincident_points() {
        let a = [1.0f64, 2.0];
        let b = [1.0f64, 2.0];
        assert_eq!(AdjustedEuclidean::distance(&a, &b), 0.0);
    }

    #[test]
    fn deadband_absorbs_sub_millimeter_drift() {
        let a = [0.0f64, 0.0];
        let b = [0.0f64, 0.0005];
        assert_eq!(AdjustedEuclidean::distance(&a, &b), 0.0);
    }

    #[test]
    fn distance_beyond_deadband_is_reduced_by_epsilon() {
        let a = [0.0f64, 0.0];
        let b = [3.0f64, 4.0];
        let d = AdjustedEuclidean::distance(&a, &b);
        assert!((d - (5.0 - EPSILON)).abs() < 1e-9);
    }

    #[test]
    fn never_negative() {
        let a = [0.0f64, 0.0];
        let b = [0.0f64, 0.0000001];
        assert!(AdjustedEuclidean::distance(&a, &b) >= 0.0);
    }
}
