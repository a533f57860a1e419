//! A 2-d nearest-neighbor query engine over a static point set with attached
//! records.
//!
//! Answers two classes of proximity query against a bulk-built k-d tree: a
//! *topic* query (the k nearest points to a location) and a *question*
//! query (the k nearest distinct records attached to points). See
//! [`dispatch::QueryEngine`] for the entry point once an input has been
//! parsed and a [`point::PointStore`] built from it.

pub mod dispatch;
pub mod distance;
pub mod input;
pub mod point;
pub mod records;
pub mod tree;
pub mod types;

pub use dispatch::{DispatchError, QueryEngine};
pub use distance::AdjustedEuclidean;
pub use input::{ParseError, ParsedInput};
pub use point::{Point, PointStore};
pub use tree::KdTree;
