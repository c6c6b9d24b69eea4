//! Nearest-voxel distance lookup and central-difference gradients
//!
//! Points inside the stored volume read the voxel they fall in, with no interpolation.
//! Points outside are extrapolated from the nearest boundary voxel:
//!
//! ```text
//! d(p) = max(v_clamped, 0) + |cell(p) - clamp(cell(p))| * voxel_size
//! ```
//!
//! The boundary value is floored at zero because nothing outside the volume can be
//! inside the solid. The result grows continuously with distance from the grid, which
//! keeps sweeps and gradients well behaved near the edges.

use crate::{Error, Result};
use glam::{Mat4, UVec3, Vec3};

/// Borrowed, read-only view of a grid's voxels plus the data needed to address them
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    values: &'a [f32],
    dimensions: UVec3,
    voxel_size: f32,
    world_to_local: Mat4,
}

impl<'a> GridView<'a> {
    pub fn new(values: &'a [f32], dimensions: UVec3, voxel_size: f32, world_to_local: Mat4) -> Self {
        debug_assert_eq!(
            values.len(),
            dimensions.x as usize * dimensions.y as usize * dimensions.z as usize
        );
        Self {
            values,
            dimensions,
            voxel_size,
            world_to_local,
        }
    }

    pub fn dimensions(&self) -> UVec3 {
        self.dimensions
    }

    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    #[inline]
    fn index(&self, voxel: UVec3) -> usize {
        let w = self.dimensions.x as usize;
        let h = self.dimensions.y as usize;
        voxel.x as usize + voxel.y as usize * w + voxel.z as usize * w * h
    }

    /// Signed distance at a point in grid-local space
    #[inline]
    pub fn distance_local(&self, local: Vec3) -> f32 {
        let cell = (local / self.voxel_size).floor();
        let last = (self.dimensions - UVec3::ONE).as_vec3();
        let clamped = cell.clamp(Vec3::ZERO, last);
        let value = self.values[self.index(clamped.as_uvec3())];

        if clamped == cell {
            return value;
        }

        value.max(0.0) + (cell - clamped).length() * self.voxel_size
    }

    /// Signed distance at a world-space point
    #[inline]
    pub fn distance(&self, world: Vec3) -> f32 {
        self.distance_local(self.world_to_local.transform_point3(world))
    }

    /// Unit gradient at a world-space point.
    ///
    /// Each world axis is perturbed by `1.5 * voxel_size` in both directions. Fails with
    /// [`Error::DegenerateGradient`] when all three differences are exactly zero.
    pub fn gradient(&self, world: Vec3) -> Result<Vec3> {
        let eps = self.voxel_size * 1.5;
        let mut grad = Vec3::ZERO;
        for axis in 0..3 {
            let mut offset = Vec3::ZERO;
            offset[axis] = eps;
            grad[axis] = (self.distance(world + offset) - self.distance(world - offset)) / (2.0 * eps);
        }

        if grad == Vec3::ZERO {
            return Err(Error::DegenerateGradient);
        }
        Ok(grad.normalize())
    }
}
