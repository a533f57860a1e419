//! A result item returned by a tree query, and the working result set used
//! by the k-nearest pass (spec §4.5).

use crate::types::Axis;
use num_traits::Zero;
use std::cmp::Ordering;

/// An entry in the results of a nearest-neighbor query: the adjusted
/// distance of the point from the query location, and the point's index
/// into the owning `PointStore`. Mirrors the shape of `kiddo`'s
/// `NearestNeighbour`/`BestNeighbour` result types.
#[derive(Debug, Clone, Copy)]
pub struct Neighbour<A: Axis> {
    pub distance: A,
    pub point_index: usize,
}

impl<A: Axis> PartialEq for Neighbour<A> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.point_index == other.point_index
    }
}
impl<A: Axis> Eq for Neighbour<A> {}

impl<A: Axis> PartialOrd for Neighbour<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.distance.partial_cmp(&other.distance)
    }
}
impl<A: Axis> Ord for Neighbour<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// The working result set `R` from spec §4.5: up to `k` `(point, distance)`
/// entries, plus the current min- and max-distance among them.
///
/// Uniqueness is enforced by the identity of the underlying leaf (its
/// `point_index`), not by distance equality, per spec §9's "Duplicate
/// detection in the working set" design note — two distinct points that
/// land at the same adjusted distance must both be retained.
#[derive(Debug, Clone)]
pub struct ResultSet<A: Axis> {
    entries: Vec<Neighbour<A>>,
    capacity: usize,
    max_distance: A,
}

impl<A: Axis> ResultSet<A> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            max_distance: A::zero(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn max_distance(&self) -> A {
        self.max_distance
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Directly sets the pruning radius used by the traversal, per spec
    /// §4.6's guard-and-multiply step ("set R.max-distance <- max(1,
    /// R.max-distance)" then "multiply R.max-distance by a growing
    /// multiplier"). Only meaningful while the set isn't yet at capacity;
    /// once full, §4.5 requires max-distance to be the true max of the
    /// entries present, recomputed by `offer`'s eviction path.
    pub fn set_max_distance(&mut self, value: A) {
        self.max_distance = value;
    }

    fn contains(&self, point_index: usize) -> bool {
        self.entries.iter().any(|e| e.point_index == point_index)
    }

    /// Offers a candidate leaf to the working set, per spec §4.5's
    /// insertion rules: reject duplicates by leaf identity, insert
    /// unconditionally while under capacity, otherwise insert-and-evict only
    /// if strictly closer than the current max, then rescan to recompute
    /// max-distance (the new max may be any remaining entry).
    pub fn offer(&mut self, candidate: Neighbour<A>) {
        if self.contains(candidate.point_index) {
            return;
        }

        if self.entries.len() < self.capacity {
            self.entries.push(candidate);
            self.recompute_max();
            return;
        }

        if candidate.distance < self.max_distance {
            if let Some(pos) = self.position_of_max() {
                self.entries[pos] = candidate;
                self.recompute_max();
            }
        }
    }

    fn position_of_max(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
            .map(|(i, _)| i)
    }

    fn recompute_max(&mut self) {
        self.max_distance = self
            .entries
            .iter()
            .map(|e| e.distance)
            .fold(A::zero(), A::max);
    }

    /// Consumes the set, returning its entries sorted by ascending distance.
    pub fn into_sorted(mut self) -> Vec<Neighbour<A>> {
        self.entries
            .sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        self.entries
    }

    pub fn entries(&self) -> &[Neighbour<A>] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(d: f64, i: usize) -> Neighbour<f64> {
        Neighbour {
            distance: d,
            point_index: i,
        }
    }

    #[test]
    fn fills_up_to_capacity_unconditionally() {
        let mut r = ResultSet::new(2);
        r.offer(n(5.0, 0));
        r.offer(n(1.0, 1));
        assert_eq!(r.len(), 2);
        assert_eq!(r.max_distance(), 5.0);
    }

    #[test]
    fn evicts_current_max_when_improved() {
        let mut r = ResultSet::new(2);
        r.offer(n(5.0, 0));
        r.offer(n(1.0, 1));
        r.offer(n(2.0, 2));
        assert_eq!(r.len(), 2);
        assert_eq!(r.max_distance(), 2.0);
        let ids: Vec<usize> = r.entries().iter().map(|e| e.point_index).collect();
        assert!(ids.contains(&1));
        assert!(ids.contains(&2));
    }

    #[test]
    fn rejects_duplicate_leaf_identity() {
        let mut r = ResultSet::new(2);
        r.offer(n(1.0, 0));
        r.offer(n(1.0, 0));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn does_not_reject_distinct_points_with_equal_distance() {
        let mut r = ResultSet::new(2);
        r.offer(n(1.0, 0));
        r.offer(n(1.0, 1));
        assert_eq!(r.len(), 2);
    }
}
