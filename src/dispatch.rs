//! Query dispatch, per spec §4.8: builds the full tree and the pruned tree
//! over the input, and routes each query (`t` or `q`, a result count and a
//! 2-d location) to the appropriate aggregator.

use crate::distance::DistanceMetric;
use crate::point::{Point, PointStore};
use crate::records::{self, RecordHit};
use crate::tree::neighbour::Neighbour;
use crate::tree::KdTree;
use crate::types::{Axis, Coords};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while preparing or dispatching queries. `k` larger than
/// what is available is never an error (spec §7 clamps it silently); these
/// cover only malformed or genuinely unanswerable situations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// A question referenced a topic identifier that was never declared,
    /// per spec §7's "out-of-range" error kind.
    #[error("question references unknown topic id {0}")]
    UnknownTopic(i64),
    /// A `q` query was issued but no topic carries any record, per spec §7's
    /// "empty pruned tree with a `q` query" error kind.
    #[error("no points carry any records; question queries have nothing to search")]
    EmptyPrunedTree,
}

/// One declared topic: a stable identifier and its 2-d coordinates.
#[derive(Debug, Clone, Copy)]
pub struct TopicInput<A: Axis> {
    pub id: i64,
    pub coords: Coords<A>,
}

/// One declared question: a stable identifier and the topics it is attached
/// to (possibly none).
#[derive(Debug, Clone)]
pub struct QuestionInput {
    pub id: i64,
    pub topic_ids: Vec<i64>,
}

/// Builds the point store from declared topics and questions, attaching each
/// question's identifier to every topic it references. Fails with
/// [`DispatchError::UnknownTopic`] if a question references a topic id that
/// was never declared, per spec §7's "out-of-range" error kind.
pub fn build_point_store<A: Axis>(
    topics: Vec<TopicInput<A>>,
    questions: &[QuestionInput],
) -> Result<PointStore<A>, DispatchError> {
    let mut points: Vec<Point<A>> = topics
        .into_iter()
        .map(|t| Point::new(t.id, t.coords))
        .collect();
    let index_by_id: HashMap<i64, usize> =
        points.iter().enumerate().map(|(i, p)| (p.id, i)).collect();

    for question in questions {
        for &topic_id in &question.topic_ids {
            let idx = index_by_id.get(&topic_id).copied().ok_or_else(|| {
                tracing::error!(topic_id, question_id = question.id, "question references unknown topic");
                DispatchError::UnknownTopic(topic_id)
            })?;
            points[idx].records.push(question.id);
        }
    }

    Ok(PointStore::new(points))
}

/// Owns the two trees built over a borrowed point store, per spec §4.8's
/// "Preparation" step: the full tree for `t` queries, the pruned tree
/// (restricted to points carrying at least one record) for `q` queries, and
/// the precomputed distinct-record ceiling.
pub struct QueryEngine<'a, A: Axis> {
    points: &'a PointStore<A>,
    full_tree: KdTree<'a, A>,
    pruned_tree: KdTree<'a, A>,
    distinct_record_count: usize,
}

impl<'a, A: Axis> QueryEngine<'a, A> {
    pub fn new(points: &'a PointStore<A>) -> Self {
        let full_tree = KdTree::build(points);
        let pruned_tree = KdTree::build_over(points, &points.indices_with_records());
        let distinct_record_count = points.distinct_record_count();
        tracing::debug!(
            total_points = points.len(),
            pruned_points = pruned_tree.leaf_count(),
            distinct_record_count,
            "query engine ready"
        );
        Self {
            points,
            full_tree,
            pruned_tree,
            distinct_record_count,
        }
    }

    /// Answers a topic query: the `k` nearest points to `query`, per spec
    /// §4.8. `k` is clamped to the number of points in the store when it
    /// exceeds that count.
    pub fn topic<D: DistanceMetric<A>>(&self, query: &Coords<A>, k: usize) -> Vec<Neighbour<A>> {
        let k = k.min(self.full_tree.leaf_count());
        self.full_tree.nearest_n::<D>(query, k)
    }

    /// Answers a question query: the `k` nearest distinct records to
    /// `query`, per spec §4.8. `k` is clamped to the number of distinct
    /// records available. Fails with [`DispatchError::EmptyPrunedTree`] when
    /// no point in the store carries any record.
    pub fn question<D: DistanceMetric<A>>(
        &self,
        query: &Coords<A>,
        k: usize,
    ) -> Result<Vec<RecordHit<A>>, DispatchError> {
        if self.pruned_tree.is_empty() {
            tracing::error!("question query dispatched against an empty pruned tree");
            return Err(DispatchError::EmptyPrunedTree);
        }
        let k = k.min(self.distinct_record_count);
        Ok(records::nearest_records::<A, D>(
            &self.pruned_tree,
            self.points,
            query,
            k,
        ))
    }
}
