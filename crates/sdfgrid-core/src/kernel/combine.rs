//! Boolean combination of grids: union, intersection, sphere subtraction

use crate::backend::VoxelKernel;
use crate::bounds::Aabb;
use crate::context::SdfContext;
use crate::grid::{Grid, GridLayout};
use crate::sampler::GridView;
use crate::{Error, Result};
use glam::{UVec3, Vec3};
use tracing::debug;

/// Boolean operator between two distance fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Inside either operand: `min(a, b)`
    Union,
    /// Inside both operands: `max(a, b)`
    Intersection,
}

impl BooleanOp {
    #[inline]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BooleanOp::Union => a.min(b),
            BooleanOp::Intersection => a.max(b),
        }
    }

    fn kernel_name(self) -> &'static str {
        match self {
            BooleanOp::Union => "op_union",
            BooleanOp::Intersection => "op_intersection",
        }
    }
}

struct BooleanKernel<'a> {
    op: BooleanOp,
    a: GridView<'a>,
    b: GridView<'a>,
    dest: GridLayout,
}

impl VoxelKernel for BooleanKernel<'_> {
    fn name(&self) -> &'static str {
        self.op.kernel_name()
    }

    fn evaluate(&self, voxel: UVec3) -> f32 {
        let p = self.dest.voxel_center(voxel);
        self.op.apply(self.a.distance(p), self.b.distance(p))
    }
}

struct SphereSubtractKernel<'a> {
    grid: GridView<'a>,
    center: Vec3,
    radius: f32,
    dest: GridLayout,
}

impl VoxelKernel for SphereSubtractKernel<'_> {
    fn name(&self) -> &'static str {
        "op_sphere_subtraction"
    }

    fn evaluate(&self, voxel: UVec3) -> f32 {
        let p = self.dest.voxel_center(voxel);
        self.grid.distance(p).max(self.radius - p.distance(self.center))
    }
}

fn combine(ctx: &SdfContext, op: BooleanOp, a: &Grid, b: &Grid, bounds: &Aabb) -> Result<Grid> {
    let dest = ctx.layout_covering(bounds, a.voxel_size())?;
    let kernel = BooleanKernel {
        op,
        a: a.view(),
        b: b.view(),
        dest,
    };
    ctx.dispatch(dest, &kernel)
}

/// Union of two grids, covering both world boxes.
///
/// Both grids must share a voxel size (within the context tolerance).
pub fn union(ctx: &SdfContext, a: &Grid, b: &Grid) -> Result<Grid> {
    ctx.check_voxel_sizes(a, b)?;
    let bounds = a.world_bounds().union(&b.world_bounds());
    combine(ctx, BooleanOp::Union, a, b, &bounds)
}

/// Grow `target` by `other` in place.
///
/// The union is computed into a new buffer which then replaces `target`'s. If the
/// union fails, `target` is unchanged.
pub fn union_with(ctx: &SdfContext, target: &mut Grid, other: &Grid) -> Result<()> {
    let merged = union(ctx, target, other)?;
    target.replace_with(merged);
    Ok(())
}

/// Overlap of two grids' world boxes. A cheap rejection test ahead of [`intersection`].
pub fn intersects_bounds(a: &Grid, b: &Grid) -> Option<Aabb> {
    a.intersects_bounds(b)
}

/// A non-empty intersection of two grids
#[derive(Debug, Clone)]
pub struct Intersection {
    pub grid: Grid,
    /// Voxels at or below the threshold passed to [`intersection`]
    pub volume_voxel_count: usize,
}

impl Intersection {
    /// Approximate overlap volume in world units, assuming an unscaled placement
    pub fn volume(&self) -> f32 {
        self.volume_voxel_count as f32 * self.grid.voxel_size().powi(3)
    }
}

/// Intersection of two grids, restricted to the overlap of their world boxes.
///
/// Returns `Ok(None)` when the boxes do not overlap or when no destination voxel is
/// at or below `distance`. Use `distance = 0.0` to count voxels inside both solids.
pub fn intersection(
    ctx: &SdfContext,
    a: &Grid,
    b: &Grid,
    distance: f32,
) -> Result<Option<Intersection>> {
    ctx.check_voxel_sizes(a, b)?;

    let Some(bounds) = intersects_bounds(a, b) else {
        debug!("intersection rejected: world bounds are disjoint");
        return Ok(None);
    };

    let grid = combine(ctx, BooleanOp::Intersection, a, b, &bounds)?;
    let volume_voxel_count = grid.count_at_or_below(distance);
    if volume_voxel_count == 0 {
        debug!(
            dimensions = %grid.dimensions(),
            distance,
            "intersection empty: no voxel at or below threshold"
        );
        return Ok(None);
    }

    Ok(Some(Intersection {
        grid,
        volume_voxel_count,
    }))
}

/// Carve a sphere out of a grid.
///
/// The result covers the grid's box and the sphere's box. When the two boxes do not
/// touch there is nothing to carve and the result is a copy of `grid`. Returns
/// `Ok(None)` when no voxel of the result is left at or below zero.
pub fn subtract_sphere(
    ctx: &SdfContext,
    grid: &Grid,
    center: Vec3,
    radius: f32,
) -> Result<Option<Grid>> {
    if !(radius > 0.0 && radius.is_finite()) || !center.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "sphere must have a finite center and positive radius, got {center} / {radius}"
        )));
    }

    let grid_bounds = grid.world_bounds();
    let sphere_bounds = Aabb::from_center(center, Vec3::splat(radius));
    let carved = if grid_bounds.intersects(&sphere_bounds) {
        let dest = ctx.layout_covering(&grid_bounds.union(&sphere_bounds), grid.voxel_size())?;
        let kernel = SphereSubtractKernel {
            grid: grid.view(),
            center,
            radius,
            dest,
        };
        ctx.dispatch(dest, &kernel)?
    } else {
        debug!("sphere subtraction skipped: sphere misses grid bounds");
        grid.clone()
    };

    if carved.count_at_or_below(0.0) == 0 {
        debug!(
            dimensions = %carved.dimensions(),
            "sphere subtraction empty: no solid voxel left"
        );
        return Ok(None);
    }
    Ok(Some(carved))
}
