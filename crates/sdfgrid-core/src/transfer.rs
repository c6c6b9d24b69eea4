//! Bulk readback of a grid's voxels into flat host memory
//!
//! Used to fill a grid's sample cache, by the intersection emptiness test, and by
//! exporters. A drain always covers the whole grid and blocks until every voxel has
//! been copied.

use crate::grid::Grid;
use rayon::prelude::*;

/// Copy every voxel of `grid` into a new vector, x fastest
pub fn drain(grid: &Grid) -> Vec<f32> {
    let mut out = Vec::new();
    drain_into(grid, &mut out);
    out
}

/// Copy every voxel of `grid` into `out`, reusing its allocation.
///
/// Returns the number of voxels written. `out` is resized to exactly that length.
pub fn drain_into(grid: &Grid, out: &mut Vec<f32>) -> usize {
    let src = grid.buffer();
    out.clear();
    out.resize(src.len(), 0.0);

    let dims = grid.dimensions();
    let slab = dims.x as usize * dims.y as usize;
    out.par_chunks_mut(slab)
        .zip(src.par_chunks(slab))
        .for_each(|(dst, src)| dst.copy_from_slice(src));

    src.len()
}

/// Number of values at or below `threshold`
pub fn count_at_or_below(values: &[f32], threshold: f32) -> usize {
    values.par_iter().filter(|&&v| v <= threshold).count()
}
