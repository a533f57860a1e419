//! Linked-record aggregation, per spec §4.7: a "question" query asks for the
//! nearest `k` distinct records, where each point may carry zero or more
//! records and a record may be attached to more than one point.

use crate::distance::DistanceMetric;
use crate::point::PointStore;
use crate::tree::KdTree;
use crate::types::{Axis, Coords};

/// A record found by a question query, paired with the distance of the
/// nearest point that carries it (the distance at which it was first
/// reached during the traversal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordHit<A: Axis> {
    pub record_id: i64,
    pub distance: A,
}

/// Finds up to `k` distinct records nearest to `query`, per spec §4.7.
///
/// `tree` must be built over the subset of points carrying at least one
/// record (the "pruned tree" of spec §4.8); points with no records
/// contribute nothing and would only waste traversal budget.
///
/// Walks an expanding point-count window (starting at `k` points and
/// doubling) until either `k` distinct records have been accumulated or the
/// underlying point set is exhausted, accumulating records in the order
/// their carrying point was first reached. `k` larger than the number of
/// distinct records available is clamped silently, per spec §7.
pub fn nearest_records<A: Axis, D: DistanceMetric<A>>(
    tree: &KdTree<A>,
    points: &PointStore<A>,
    query: &Coords<A>,
    k: usize,
) -> Vec<RecordHit<A>> {
    if k == 0 || tree.is_empty() {
        return Vec::new();
    }

    let mut inner_k = k;
    let mut hits: Vec<RecordHit<A>> = Vec::new();

    loop {
        let neighbours = tree.nearest_n::<D>(query, inner_k);

        hits.clear();
        let mut seen = std::collections::HashSet::new();
        'outer: for n in &neighbours {
            let point = points.get(n.point_index);
            for &record_id in &point.records {
                if seen.insert(record_id) {
                    hits.push(RecordHit {
                        record_id,
                        distance: n.distance,
                    });
                    if hits.len() == k {
                        break 'outer;
                    }
                }
            }
        }

        if hits.len() >= k || neighbours.len() >= tree.leaf_count() {
            return hits;
        }

        tracing::debug!(inner_k, found = hits.len(), target = k, "doubling inner k for record search");
        inner_k *= 2;
    }
}
