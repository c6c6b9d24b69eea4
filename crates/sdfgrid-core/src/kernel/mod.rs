//! Grid operations built on per-voxel kernels
//!
//! Every operation here follows the same steps:
//!
//! 1. Derive the destination box from the operands' world bounds
//! 2. Lay out an axis-aligned destination grid at the primary operand's voxel size
//! 3. Dispatch a [`VoxelKernel`](crate::backend::VoxelKernel) over it
//!
//! Operands are only ever read. Results always live in a freshly allocated grid.

mod combine;
mod sweep;

pub use combine::{
    BooleanOp, Intersection, intersection, intersects_bounds, subtract_sphere, union, union_with,
};
pub use sweep::{swept_bounds, swept_volume};
