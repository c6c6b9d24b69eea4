//! Interface to whatever produces an initial grid from source geometry
//!
//! Baking itself lives outside this crate. Implementations share [`bake_layout`] so
//! every baked grid is placed and sized the same way.

use crate::bounds::Aabb;
use crate::grid::{Grid, GridLayout};
use crate::{Error, Result};
use glam::{Mat4, Vec3};

/// Produces a grid from posed source geometry
pub trait Baker {
    /// Geometry the baker understands (meshes, analytic shapes, ...)
    type Source;

    /// Bake `sources`, each placed by its pose, into a grid covering `bounds`.
    ///
    /// `resolution` is the number of voxels along the longest axis of `bounds`.
    fn bake(
        &self,
        sources: &[(Self::Source, Mat4)],
        resolution: u32,
        bounds: Aabb,
    ) -> Result<Grid>;
}

/// Layout of a baked grid.
///
/// Voxel size is `max(bounds size) / resolution`, each axis holds
/// `ceil(size / voxel_size)` voxels and the local origin sits at `bounds.min`.
pub fn bake_layout(resolution: u32, bounds: &Aabb) -> Result<GridLayout> {
    if resolution == 0 {
        return Err(Error::InvalidParameter(
            "bake resolution must be at least 1".into(),
        ));
    }

    let size = bounds.size();
    if !size.is_finite() || size.cmplt(Vec3::ZERO).any() || size.max_element() <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "bake bounds must be finite and non-empty, got {:?}..{:?}",
            bounds.min, bounds.max
        )));
    }

    let voxel_size = size.max_element() / resolution as f32;
    GridLayout::covering(bounds, voxel_size, 1e-4)
}
