//! Voxelize posed analytic shapes into a grid

use crate::{Sdf, SdfNode};
use glam::{Mat4, UVec3};
use rayon::prelude::*;
use sdfgrid_core::bake::{Baker, bake_layout};
use sdfgrid_core::bounds::Aabb;
use sdfgrid_core::grid::{Grid, checked_inverse};
use sdfgrid_core::{Error, Result};
use std::time::Instant;
use tracing::debug;

/// Samples analytic shapes at voxel centers.
///
/// Each voxel stores the minimum over all sources of `shape.distance(pose⁻¹ · p)`.
/// Poses are expected to be rigid; a scaling pose leaves distances in the shape's
/// own units.
#[derive(Debug, Clone, Copy)]
pub struct ShapeBaker {
    pub max_voxels: u64,
}

impl Default for ShapeBaker {
    fn default() -> Self {
        Self {
            max_voxels: 512 * 512 * 512,
        }
    }
}

impl ShapeBaker {
    pub fn with_max_voxels(mut self, max_voxels: u64) -> Self {
        self.max_voxels = max_voxels;
        self
    }

    /// Bake a single shape at its own placement, over its bounds grown by `margin`
    pub fn bake_shape(&self, shape: &SdfNode, resolution: u32, margin: f32) -> Result<Grid> {
        let bounds = shape.bounds().expand(margin);
        self.bake(&[(shape.clone(), Mat4::IDENTITY)], resolution, bounds)
    }
}

/// World box covering every posed source, `None` when there are no sources
pub fn posed_bounds(sources: &[(SdfNode, Mat4)]) -> Option<Aabb> {
    sources
        .iter()
        .map(|(shape, pose)| shape.bounds().transform(pose))
        .reduce(|acc, b| acc.union(&b))
}

impl Baker for ShapeBaker {
    type Source = SdfNode;

    fn bake(&self, sources: &[(SdfNode, Mat4)], resolution: u32, bounds: Aabb) -> Result<Grid> {
        if sources.is_empty() {
            return Err(Error::InvalidParameter(
                "bake needs at least one source".into(),
            ));
        }

        let layout = bake_layout(resolution, &bounds)?;
        if layout.voxel_count() > self.max_voxels {
            return Err(Error::ResourceExhaustion(format!(
                "bake of {} voxels ({}) exceeds the limit of {}",
                layout.voxel_count(),
                layout.dimensions,
                self.max_voxels
            )));
        }

        let placed = sources
            .iter()
            .map(|(shape, pose)| Ok((shape, checked_inverse(pose)?)))
            .collect::<Result<Vec<_>>>()?;

        let start = Instant::now();
        let dims = layout.dimensions;
        let slice = dims.x as usize * dims.y as usize;
        let mut data = layout.allocate(0.0)?;

        // One z-slice per task
        data.par_chunks_mut(slice)
            .enumerate()
            .for_each(|(z, slab)| {
                for y in 0..dims.y {
                    let row = y as usize * dims.x as usize;
                    for x in 0..dims.x {
                        let p = layout.voxel_center(UVec3::new(x, y, z as u32));
                        slab[row + x as usize] = placed
                            .iter()
                            .fold(f32::INFINITY, |acc, (shape, inv)| {
                                acc.min(shape.distance(inv.transform_point3(p)))
                            });
                    }
                }
            });

        debug!(
            sources = sources.len(),
            dimensions = %dims,
            voxel_size = layout.voxel_size,
            elapsed_us = start.elapsed().as_micros() as u64,
            "shapes baked"
        );

        Grid::new(data, layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SdfExt;
    use crate::primitives::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    #[test]
    fn baked_sphere_matches_analytic_distance_at_centers() {
        let shape = sphere(1.0).into_node();
        let grid = ShapeBaker::default()
            .bake(
                &[(shape.clone(), Mat4::IDENTITY)],
                8,
                Aabb::new(Vec3::splat(-2.0), Vec3::splat(2.0)),
            )
            .unwrap();

        assert_eq!(grid.dimensions(), UVec3::splat(8));
        assert_relative_eq!(grid.voxel_size(), 0.5);
        for v in [UVec3::ZERO, UVec3::new(3, 4, 3), UVec3::new(7, 0, 5)] {
            let p = grid.layout().voxel_center(v);
            assert_relative_eq!(grid.value(v).unwrap(), shape.distance(p), epsilon = 1e-6);
        }
    }

    #[test]
    fn poses_place_sources_and_union() {
        let ball = sphere(0.5).into_node();
        let sources = [
            (ball.clone(), Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0))),
            (ball, Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0))),
        ];
        let bounds = posed_bounds(&sources).unwrap().expand(0.5);
        let grid = ShapeBaker::default().bake(&sources, 16, bounds).unwrap();

        assert!(grid.distance_at(Vec3::new(-1.0, 0.0, 0.0)) < 0.0);
        assert!(grid.distance_at(Vec3::new(1.0, 0.0, 0.0)) < 0.0);
        assert!(grid.distance_at(Vec3::ZERO) > 0.0);
    }

    #[test]
    fn bake_shape_covers_margin() {
        let grid = ShapeBaker::default()
            .bake_shape(&cube(2.0).into_node(), 10, 0.5)
            .unwrap();
        let b = grid.world_bounds();
        assert_relative_eq!(b.min.x, -1.5, epsilon = 1e-5);
        assert_relative_eq!(b.max.x, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn rejects_empty_sources_singular_poses_and_oversized_grids() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let baker = ShapeBaker::default();
        assert!(baker.bake(&[], 4, bounds).is_err());

        let flat = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(baker.bake(&[(sphere(1.0).into_node(), flat)], 4, bounds).is_err());

        let small = baker.with_max_voxels(10);
        assert!(matches!(
            small.bake(&[(sphere(1.0).into_node(), Mat4::IDENTITY)], 4, bounds),
            Err(Error::ResourceExhaustion(_))
        ));
    }

    #[test]
    fn unallocatable_bake_is_resource_exhaustion() {
        let unlimited = ShapeBaker::default().with_max_voxels(u64::MAX);
        let bounds = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(matches!(
            unlimited.bake(&[(sphere(1.0).into_node(), Mat4::IDENTITY)], u32::MAX, bounds),
            Err(Error::ResourceExhaustion(_))
        ));
    }
}
