//! Dense voxel grids of signed distances
//!
//! A [`Grid`] exclusively owns its voxel buffer. Operations that build a new shape
//! always allocate a fresh grid; the only way to change a grid's buffer in place is
//! [`Grid::replace_buffer`] (or [`Grid::replace_with`]), which releases the old buffer
//! and clears the sample cache.

use crate::bounds::Aabb;
use crate::sampler::GridView;
use crate::{Error, Result, transfer};
use glam::{Mat4, UVec3, Vec3};
use rayon::prelude::*;
use std::fmt;
use std::sync::OnceLock;

/// Shape, resolution and placement of a grid, without its data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Voxel counts along x, y, z
    pub dimensions: UVec3,
    /// Edge length of one cubic voxel in local space
    pub voxel_size: f32,
    /// Maps local space (origin at the corner of voxel (0, 0, 0)) to world space
    pub local_to_world: Mat4,
}

impl GridLayout {
    pub fn new(dimensions: UVec3, voxel_size: f32, local_to_world: Mat4) -> Self {
        Self {
            dimensions,
            voxel_size,
            local_to_world,
        }
    }

    /// Axis-aligned layout whose origin sits at `bounds.min` and whose voxels cover
    /// `bounds` entirely.
    ///
    /// Each axis gets `ceil(size / voxel_size)` voxels, at least one. `epsilon` (in
    /// voxels) is absorbed before rounding up so that a size that is a whole number of
    /// voxels up to float noise does not gain an extra slice.
    pub fn covering(bounds: &Aabb, voxel_size: f32, epsilon: f32) -> Result<Self> {
        validate_voxel_size(voxel_size)?;

        let cells = (bounds.size() / voxel_size - Vec3::splat(epsilon))
            .ceil()
            .max(Vec3::ONE);
        if !cells.is_finite() || cells.max_element() > u32::MAX as f32 {
            return Err(Error::ResourceExhaustion(format!(
                "bounds {:?}..{:?} at voxel size {voxel_size} need {cells} voxels",
                bounds.min, bounds.max
            )));
        }

        Ok(Self::new(
            cells.as_uvec3(),
            voxel_size,
            Mat4::from_translation(bounds.min),
        ))
    }

    /// Total number of voxels, saturating at `u64::MAX`
    pub fn voxel_count(&self) -> u64 {
        (self.dimensions.x as u64)
            .saturating_mul(self.dimensions.y as u64)
            .saturating_mul(self.dimensions.z as u64)
    }

    /// Buffer of `voxel_count` voxels set to `value`, failing instead of aborting when
    /// it cannot be allocated
    pub fn allocate(&self, value: f32) -> Result<Vec<f32>> {
        let count = usize::try_from(self.voxel_count())
            .ok()
            .filter(|&n| n < usize::MAX)
            .ok_or_else(|| {
                Error::ResourceExhaustion(format!(
                    "{} voxels ({}) do not fit in memory",
                    self.voxel_count(),
                    self.dimensions
                ))
            })?;

        let mut data = Vec::new();
        data.try_reserve_exact(count).map_err(|e| {
            Error::ResourceExhaustion(format!("failed to allocate {count} voxels: {e}"))
        })?;
        data.resize(count, value);
        Ok(data)
    }

    /// World-space position of a voxel's center
    #[inline]
    pub fn voxel_center(&self, voxel: UVec3) -> Vec3 {
        self.local_to_world
            .transform_point3((voxel.as_vec3() + Vec3::splat(0.5)) * self.voxel_size)
    }

    /// Local box `[0, dimensions * voxel_size]`
    pub fn local_bounds(&self) -> Aabb {
        Aabb::new(Vec3::ZERO, self.dimensions.as_vec3() * self.voxel_size)
    }

    /// Local box mapped to world space by `local_to_world`
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds().transform(&self.local_to_world)
    }

    fn validate(&self) -> Result<()> {
        if self.dimensions.min_element() == 0 {
            return Err(Error::InvalidParameter(format!(
                "grid dimensions must be at least 1, got {}",
                self.dimensions
            )));
        }
        validate_voxel_size(self.voxel_size)?;
        checked_inverse(&self.local_to_world).map(|_| ())
    }
}

fn validate_voxel_size(voxel_size: f32) -> Result<()> {
    if voxel_size > 0.0 && voxel_size.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "voxel size must be positive and finite, got {voxel_size}"
        )))
    }
}

/// Inverse of an affine transform, rejecting singular or non-finite matrices
pub fn checked_inverse(matrix: &Mat4) -> Result<Mat4> {
    let det = matrix.determinant();
    if det == 0.0 || !det.is_finite() || !matrix.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "transform is not invertible: {matrix}"
        )));
    }
    Ok(matrix.inverse())
}

/// A discretized signed distance field
#[derive(Clone)]
pub struct Grid {
    buffer: Box<[f32]>,
    layout: GridLayout,
    world_to_local: Mat4,
    /// Host-side flat copy of the buffer, filled on the first sample call
    voxel_data: OnceLock<Vec<f32>>,
}

impl Grid {
    /// Take ownership of `data` laid out x fastest, then y, then z
    pub fn new(data: Vec<f32>, layout: GridLayout) -> Result<Self> {
        layout.validate()?;
        if data.len() as u64 != layout.voxel_count() {
            return Err(Error::InvalidParameter(format!(
                "grid of {} needs {} voxels, got {}",
                layout.dimensions,
                layout.voxel_count(),
                data.len()
            )));
        }

        Ok(Self {
            buffer: data.into_boxed_slice(),
            world_to_local: layout.local_to_world.inverse(),
            layout,
            voxel_data: OnceLock::new(),
        })
    }

    /// Grid with every voxel set to `value`
    pub fn filled(layout: GridLayout, value: f32) -> Result<Self> {
        layout.validate()?;
        Self::new(layout.allocate(value)?, layout)
    }

    /// Grid whose voxels are produced by `f(x, y, z)`, evaluated in parallel
    pub fn from_fn<F>(layout: GridLayout, f: F) -> Result<Self>
    where
        F: Fn(UVec3) -> f32 + Sync,
    {
        layout.validate()?;
        let w = layout.dimensions.x as usize;
        let h = layout.dimensions.y as usize;

        let mut data = layout.allocate(0.0)?;
        data.par_iter_mut().enumerate().for_each(|(idx, v)| {
            let x = idx % w;
            let y = (idx / w) % h;
            let z = idx / (w * h);
            *v = f(UVec3::new(x as u32, y as u32, z as u32));
        });
        Self::new(data, layout)
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn dimensions(&self) -> UVec3 {
        self.layout.dimensions
    }

    pub fn voxel_size(&self) -> f32 {
        self.layout.voxel_size
    }

    pub fn voxel_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn local_to_world(&self) -> Mat4 {
        self.layout.local_to_world
    }

    pub fn world_to_local(&self) -> Mat4 {
        self.world_to_local
    }

    /// Re-place the grid in the world.
    ///
    /// Distances are stored in local space, so the sample cache stays valid.
    pub fn set_local_to_world(&mut self, local_to_world: Mat4) -> Result<()> {
        self.world_to_local = checked_inverse(&local_to_world)?;
        self.layout.local_to_world = local_to_world;
        Ok(())
    }

    /// Swap in a new buffer and layout.
    ///
    /// The previous buffer is released and the sample cache cleared before the new
    /// buffer is accepted. On error the grid is left untouched.
    pub fn replace_buffer(&mut self, data: Vec<f32>, layout: GridLayout) -> Result<()> {
        let replacement = Self::new(data, layout)?;
        self.replace_with(replacement);
        Ok(())
    }

    /// Move another grid's buffer and layout into this one
    pub fn replace_with(&mut self, other: Grid) {
        self.voxel_data.take();
        *self = other;
    }

    /// Local bounding box, `[0, dimensions * voxel_size]`
    pub fn local_bounds(&self) -> Aabb {
        self.layout.local_bounds()
    }

    /// World bounding box
    pub fn world_bounds(&self) -> Aabb {
        self.layout.world_bounds()
    }

    /// Overlap of the two grids' world boxes, if any
    pub fn intersects_bounds(&self, other: &Grid) -> Option<Aabb> {
        self.world_bounds().intersect(&other.world_bounds())
    }

    /// Flat index of a voxel
    #[inline]
    pub fn index(&self, voxel: UVec3) -> usize {
        let w = self.layout.dimensions.x as usize;
        let h = self.layout.dimensions.y as usize;
        voxel.x as usize + voxel.y as usize * w + voxel.z as usize * w * h
    }

    /// Stored value of a voxel, `None` outside the grid
    pub fn value(&self, voxel: UVec3) -> Option<f32> {
        if voxel.cmplt(self.layout.dimensions).all() {
            Some(self.buffer[self.index(voxel)])
        } else {
            None
        }
    }

    /// Host-side flat copy of every voxel.
    ///
    /// Drained from the buffer on first use and kept until the buffer is replaced.
    pub fn voxel_data(&self) -> &[f32] {
        self.voxel_data.get_or_init(|| transfer::drain(self))
    }

    /// True once the sample cache has been filled
    pub fn is_cached(&self) -> bool {
        self.voxel_data.get().is_some()
    }

    /// Signed distance at a world point (nearest voxel, extrapolated outside)
    pub fn distance_at(&self, world: Vec3) -> f32 {
        self.sampler().distance(world)
    }

    /// Unit gradient at a world point by central differences
    pub fn gradient_at(&self, world: Vec3) -> Result<Vec3> {
        self.sampler().gradient(world)
    }

    /// Number of voxels whose value is at or below `threshold`
    pub fn count_at_or_below(&self, threshold: f32) -> usize {
        transfer::count_at_or_below(self.voxel_data(), threshold)
    }

    /// View over the host-side cache
    pub fn sampler(&self) -> GridView<'_> {
        GridView::new(
            self.voxel_data(),
            self.layout.dimensions,
            self.layout.voxel_size,
            self.world_to_local,
        )
    }

    /// View over the owned buffer, as read by kernels
    pub(crate) fn view(&self) -> GridView<'_> {
        GridView::new(
            &self.buffer,
            self.layout.dimensions,
            self.layout.voxel_size,
            self.world_to_local,
        )
    }

    pub(crate) fn buffer(&self) -> &[f32] {
        &self.buffer
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("dimensions", &self.layout.dimensions)
            .field("voxel_size", &self.layout.voxel_size)
            .field("local_to_world", &self.layout.local_to_world)
            .field("cached", &self.is_cached())
            .finish_non_exhaustive()
    }
}

/// A grid that is repositioned by poses relative to its original placement
#[derive(Debug, Clone)]
pub struct MovingGrid {
    grid: Grid,
    base: Mat4,
}

impl MovingGrid {
    pub fn new(grid: Grid) -> Self {
        let base = grid.local_to_world();
        Self { grid, base }
    }

    /// Wrap `grid` with an explicit original placement
    pub fn with_base(grid: Grid, base: Mat4) -> Self {
        Self { grid, base }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The placement the grid had when it was wrapped
    pub fn base(&self) -> Mat4 {
        self.base
    }

    /// Current placement, `pose * base`
    pub fn local_to_world(&self) -> Mat4 {
        self.grid.local_to_world()
    }

    /// Place the grid at `pose * base`
    pub fn set_pose(&mut self, pose: Mat4) -> Result<()> {
        self.grid.set_local_to_world(pose * self.base)
    }

    pub fn into_inner(self) -> Grid {
        self.grid
    }
}
