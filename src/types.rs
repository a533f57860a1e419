//! Definitions for types shared across the tree, aggregator, and dispatcher modules.

use num_traits::Float;
use std::fmt::Debug;

/// `Axis` is the trait that must be implemented by the type used to represent a
/// coordinate value. This will usually be `f64` or `f32`.
pub trait Axis: Float + Default + Debug + Copy + Sync + Send {}
impl<T: Float + Default + Debug + Copy + Sync + Send> Axis for T {}

/// A point is fixed at two dimensions per this engine's non-goal of supporting
/// other dimensionalities.
pub type Coords<A> = [A; 2];

/// Which of the two axes a stem node splits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    X,
    Y,
}

impl SplitAxis {
    /// Both axes, in a fixed order, used by the builder to presort each
    /// axis's index array once before construction starts.
    pub const ORDER: [SplitAxis; 2] = [SplitAxis::X, SplitAxis::Y];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            SplitAxis::X => 0,
            SplitAxis::Y => 1,
        }
    }

    #[inline]
    pub fn component<A: Axis>(self, coords: &Coords<A>) -> A {
        coords[self.index()]
    }
}
