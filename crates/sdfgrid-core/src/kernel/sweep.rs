//! Swept volumes: the union of one grid placed at every pose of a motion

use crate::backend::VoxelKernel;
use crate::bounds::Aabb;
use crate::context::SdfContext;
use crate::grid::{Grid, GridLayout, checked_inverse};
use crate::sampler::GridView;
use crate::{Error, Result};
use glam::{Mat4, UVec3};

struct SweepKernel<'a> {
    source: GridView<'a>,
    inverse_poses: &'a [Mat4],
    dest: GridLayout,
}

impl VoxelKernel for SweepKernel<'_> {
    fn name(&self) -> &'static str {
        "swept_volume"
    }

    fn evaluate(&self, voxel: UVec3) -> f32 {
        let p = self.dest.voxel_center(voxel);
        self.inverse_poses
            .iter()
            .fold(f32::INFINITY, |acc, inv| {
                acc.min(self.source.distance(inv.transform_point3(p)))
            })
    }
}

/// World box covered by `grid` across all `poses`, `None` for an empty motion
pub fn swept_bounds(grid: &Grid, poses: &[Mat4]) -> Option<Aabb> {
    let bounds = grid.world_bounds();
    poses
        .iter()
        .map(|pose| bounds.transform(pose))
        .reduce(|acc, b| acc.union(&b))
}

/// Sweep `grid` through `poses`.
///
/// Each pose is a world-space transform applied on top of the grid's own placement.
/// A destination voxel stores the minimum distance of the grid over every pose, so it
/// is inside the result if the shape covered it at any point of the motion. Cost is
/// one sample per voxel per pose; pose inverses are computed once up front.
pub fn swept_volume(ctx: &SdfContext, grid: &Grid, poses: &[Mat4]) -> Result<Grid> {
    let Some(bounds) = swept_bounds(grid, poses) else {
        return Err(Error::InvalidParameter(
            "swept volume needs at least one pose".into(),
        ));
    };

    let inverse_poses = poses
        .iter()
        .map(checked_inverse)
        .collect::<Result<Vec<_>>>()?;

    let dest = ctx.layout_covering(&bounds, grid.voxel_size())?;
    let kernel = SweepKernel {
        source: grid.view(),
        inverse_poses: &inverse_poses,
        dest,
    };
    ctx.dispatch(dest, &kernel)
}
