//! The point store: the immutable input table of points, per spec §4.1.

use crate::types::{Axis, Coords};
use std::collections::HashMap;

/// A single input point: a 2-d coordinate, a stable identifier, and the
/// (possibly empty) list of record identifiers attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Point<A: Axis> {
    pub coords: Coords<A>,
    pub id: i64,
    pub records: Vec<i64>,
}

impl<A: Axis> Point<A> {
    pub fn new(id: i64, coords: Coords<A>) -> Self {
        Self {
            coords,
            id,
            records: Vec::new(),
        }
    }
}

/// Read-only collection of points, indexed by original insertion position and,
/// separately, by stable identifier.
///
/// No other behavior is exposed: mutation of the store once built is a
/// non-goal (spec §1) and every tree built over it borrows it for its own
/// lifetime (spec §3 "Lifecycle").
#[derive(Debug, Clone)]
pub struct PointStore<A: Axis> {
    points: Vec<Point<A>>,
    index_by_id: HashMap<i64, usize>,
}

impl<A: Axis> PointStore<A> {
    pub fn new(points: Vec<Point<A>>) -> Self {
        let index_by_id = points
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id, idx))
            .collect();
        Self {
            points,
            index_by_id,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Random access by original insertion position.
    #[inline]
    pub fn get(&self, index: usize) -> &Point<A> {
        &self.points[index]
    }

    /// Random access by stable topic identifier.
    #[inline]
    pub fn get_by_id(&self, id: i64) -> Option<&Point<A>> {
        self.index_by_id.get(&id).map(|&idx| &self.points[idx])
    }

    /// Indices, in insertion order, of points carrying at least one record.
    /// Used to build the pruned tree (spec §4.8 "Preparation").
    pub fn indices_with_records(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.records.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// All insertion-position indices, 0..len. Used to build the full tree.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.points.len()).collect()
    }

    /// Total count of distinct record identifiers attached to any point.
    /// Precomputed once at setup per spec §4.8/§9 ("derived constant computed
    /// once at setup").
    pub fn distinct_record_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for p in &self.points {
            seen.extend(p.records.iter().copied());
        }
        seen.len()
    }
}
