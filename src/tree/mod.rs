//! The 2-d tree itself: construction and the search operations built on it.

pub mod builder;
pub mod neighbour;
pub mod node;
pub mod query;

use crate::distance::DistanceMetric;
use crate::point::PointStore;
use crate::tree::neighbour::{Neighbour, ResultSet};
use crate::tree::node::Node;
use crate::types::{Axis, Coords};
use num_traits::One;

/// A tree built over a borrowed [`PointStore`], per spec §3 "Tree" and
/// §4.2's construction algorithm. Carries its own root and the count of
/// leaves it was built over; an empty input subset is a well-formed tree
/// with no root and zero leaves.
#[derive(Debug)]
pub struct KdTree<'a, A: Axis> {
    points: &'a PointStore<A>,
    root: Option<Box<Node<A>>>,
    leaf_count: usize,
}

impl<'a, A: Axis> KdTree<'a, A> {
    /// Builds a tree over every point in `points`.
    pub fn build(points: &'a PointStore<A>) -> Self {
        Self::build_over(points, &points.all_indices())
    }

    /// Builds a tree over a subset of `points`, identified by index. Used to
    /// build the "pruned tree" of spec §4.8, restricted to points carrying
    /// at least one record.
    pub fn build_over(points: &'a PointStore<A>, indices: &[usize]) -> Self {
        tracing::debug!(count = indices.len(), "building tree");
        let root = builder::build(points, indices);
        let leaf_count = indices.len();
        tracing::debug!(leaf_count, "tree built");
        Self {
            points,
            root,
            leaf_count,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    #[inline]
    pub fn points(&self) -> &PointStore<A> {
        self.points
    }

    /// Finds the single nearest point to `query`, per spec §4.4. Returns
    /// `None` only when the tree is empty.
    pub fn nearest_one<D: DistanceMetric<A>>(&self, query: &Coords<A>) -> Option<Neighbour<A>> {
        let root = self.root.as_deref()?;
        let (best, visited) = query::nearest_one::<A, D>(root, self.points, query);
        tracing::trace!(visited, distance = ?best.distance, "nearest_one");
        Some(best)
    }

    /// Finds up to `k` nearest points to `query`, expanding the search
    /// radius across passes as needed to reach `k`, per spec §4.6.
    ///
    /// Returns fewer than `k` entries only when the tree itself has fewer
    /// than `k` leaves (clamped per spec §7, handled by the caller).
    pub fn nearest_n<D: DistanceMetric<A>>(&self, query: &Coords<A>, k: usize) -> Vec<Neighbour<A>> {
        let Some(root) = self.root.as_deref() else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }
        let k = k.min(self.leaf_count);

        if k == 1 {
            let (best, _) = query::nearest_one::<A, D>(root, self.points, query);
            return vec![best];
        }

        let seed = query::descend_to_leaf(root, query);
        let seed_index = match seed {
            Node::Leaf { point_index } => *point_index,
            Node::Internal { .. } => unreachable!(),
        };
        let mut result = ResultSet::new(k);
        result.offer(Neighbour {
            distance: D::distance(&self.points.get(seed_index).coords, query),
            point_index: seed_index,
        });

        let mut multiplier = 1.0f64;
        while result.len() < k {
            let guarded = result.max_distance().max(A::one());
            let factor = A::from(multiplier).unwrap_or_else(A::one);
            result.set_max_distance(guarded * factor);
            query::nearest_n_pass::<A, D>(root, self.points, query, &mut result);
            multiplier += 0.1;
        }

        result.into_sorted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::AdjustedEuclidean;
    use crate::point::Point;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn store(coords: &[(f64, f64)]) -> PointStore<f64> {
        let points = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Point::new(i as i64, [x, y]))
            .collect();
        PointStore::new(points)
    }

    #[test]
    fn empty_tree_returns_nothing() {
        let ps = store(&[]);
        let tree = KdTree::build(&ps);
        assert!(tree.is_empty());
        assert!(tree.nearest_one::<AdjustedEuclidean>(&[0.0, 0.0]).is_none());
        assert!(tree.nearest_n::<AdjustedEuclidean>(&[0.0, 0.0], 5).is_empty());
    }

    #[test]
    fn nearest_n_eventually_reaches_k_via_radius_expansion() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let coords: Vec<(f64, f64)> = (0..150)
            .map(|_| (rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0)))
            .collect();
        let ps = store(&coords);
        let tree = KdTree::build(&ps);

        for _ in 0..20 {
            let q = [rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0)];
            let k = rng.gen_range(1..20);
            let found = tree.nearest_n::<AdjustedEuclidean>(&q, k);
            assert_eq!(found.len(), k);
            let mut sorted = found.clone();
            sorted.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap());
            assert_eq!(found.iter().map(|n| n.distance).collect::<Vec<_>>(),
                       sorted.iter().map(|n| n.distance).collect::<Vec<_>>());

            let mut all: Vec<f64> = (0..ps.len())
                .map(|i| AdjustedEuclidean::distance(&ps.get(i).coords, &q))
                .collect();
            all.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for (f, e) in found.iter().zip(all.iter().take(k)) {
                assert!((f.distance - e).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn nearest_n_clamps_k_to_available_leaves() {
        let ps = store(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let tree = KdTree::build(&ps);
        let found = tree.nearest_n::<AdjustedEuclidean>(&[0.0, 0.0], 10);
        assert_eq!(found.len(), 3);
    }
}
