//! Bulk top-down 2-d tree construction, per spec §4.2.
//!
//! Builds two index arrays over the input subset, each sorted by one
//! coordinate, then recursively splits on the axis of maximum spread,
//! partitioning both sorted arrays in a single stable linear pass per level.

use crate::point::PointStore;
use crate::tree::node::Node;
use crate::types::{Axis, SplitAxis};
use num_traits::One;
use std::collections::HashSet;

/// Builds a tree over the given subset of point-store indices. Returns
/// `None` only when `indices` is empty (an empty tree has no root, matching
/// the "missing child" tolerance spec §9 describes for transient states;
/// here it is simply the well-formed empty case).
pub fn build<A: Axis>(points: &PointStore<A>, indices: &[usize]) -> Option<Box<Node<A>>> {
    if indices.is_empty() {
        return None;
    }

    let mut sorted: [Vec<usize>; 2] = [indices.to_vec(), indices.to_vec()];
    for axis in SplitAxis::ORDER {
        sorted[axis.index()].sort_by(|&a, &b| {
            axis.component(&points.get(a).coords)
                .partial_cmp(&axis.component(&points.get(b).coords))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    build_recursive(points, sorted)
}

fn build_recursive<A: Axis>(
    points: &PointStore<A>,
    sublists: [Vec<usize>; 2],
) -> Option<Box<Node<A>>> {
    let s = sublists[0].len();

    if s == 0 {
        return None;
    }
    if s == 1 {
        return Some(Box::new(Node::Leaf {
            point_index: sublists[0][0],
        }));
    }

    // Choose the splitting axis: the extrema on each axis come from the
    // first/last elements of THAT axis's own sorted sublist (looking at a
    // different axis's sublist would give the wrong order). Break ties by
    // preferring the first axis (x).
    let spread = |axis: SplitAxis| -> A {
        let list = &sublists[axis.index()];
        let lo = axis.component(&points.get(*list.first().unwrap()).coords);
        let hi = axis.component(&points.get(*list.last().unwrap()).coords);
        hi - lo
    };
    let spread_x = spread(SplitAxis::X);
    let spread_y = spread(SplitAxis::Y);
    let axis = if spread_y > spread_x {
        SplitAxis::Y
    } else {
        SplitAxis::X
    };

    let chosen = &sublists[axis.index()];
    let m = s / 2;
    let v_lower = axis.component(&points.get(chosen[m - 1]).coords);
    let v_upper = axis.component(&points.get(chosen[m]).coords);
    let value = (v_lower + v_upper) / (A::one() + A::one());

    // The chosen axis's own sublist is already sorted by this axis, so its
    // median split is a plain position cut: [0, m) left, [m, s) right. The
    // remaining axis sublists are assigned by membership in that position
    // cut rather than by re-comparing each coordinate against `value`: under
    // exact coordinate ties straddling the pivot, a plain `<= value` compare
    // can disagree with the chosen axis's own position cut and produce
    // mismatched left/right lengths across axes. Membership keeps every
    // axis's sublist in lockstep (same length, same point set) no matter
    // how the input is tied, matching spec §9's tolerance for duplicate
    // coordinates "producing no stability guarantee beyond what §4
    // specifies".
    let left_set: HashSet<usize> = chosen[..m].iter().copied().collect();

    let mut left: [Vec<usize>; 2] = [Vec::with_capacity(m), Vec::with_capacity(m)];
    let mut right: [Vec<usize>; 2] = [Vec::with_capacity(s - m), Vec::with_capacity(s - m)];
    for (axis_idx, list) in sublists.into_iter().enumerate() {
        for idx in list {
            if left_set.contains(&idx) {
                left[axis_idx].push(idx);
            } else {
                right[axis_idx].push(idx);
            }
        }
    }

    let left_node = build_recursive(points, left);
    let right_node = build_recursive(points, right);

    Some(Box::new(Node::Internal {
        axis,
        value,
        left: left_node,
        right: right_node,
    }))
}
