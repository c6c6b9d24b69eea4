//! Named-grid session over one context and one arena

use crate::config::EngineConfig;
use anyhow::{Context, Result, anyhow};
use glam::{Mat4, Vec3};
use sdfgrid_core::arena::GridArena;
use sdfgrid_core::bake::Baker;
use sdfgrid_core::bounds::Aabb;
use sdfgrid_core::context::SdfContext;
use sdfgrid_core::export::{Exporter, RenderParams};
use sdfgrid_core::grid::{Grid, MovingGrid};
use sdfgrid_core::kernel;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of a clearance check between two grids
#[derive(Debug, Clone, PartialEq)]
pub enum Clearance {
    /// World boxes do not overlap; no kernel was run
    Separated,
    /// Boxes overlap but no voxel is inside both solids
    Clear { overlap: Aabb },
    /// The solids overlap
    Colliding { voxels: usize, volume: f32 },
}

impl Clearance {
    pub fn is_colliding(&self) -> bool {
        matches!(self, Clearance::Colliding { .. })
    }
}

/// Owns every grid of a working session, keyed by name.
///
/// Operations read their operands by name and store results under a name. Each
/// stored grid remembers the placement it had when stored, which [`Session::set_pose`]
/// composes poses onto.
pub struct Session {
    ctx: SdfContext,
    arena: GridArena,
    bases: BTreeMap<String, Mat4>,
    config: EngineConfig,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            ctx: SdfContext::new(config.context.clone()),
            arena: GridArena::new(),
            bases: BTreeMap::new(),
            config,
        }
    }

    /// Session configured from a JSON file (defaults if the file is missing)
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Ok(Self::new(EngineConfig::load(path)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &SdfContext {
        &self.ctx
    }

    /// Store `grid` under `name`, replacing any grid already there
    pub fn insert(&mut self, name: &str, grid: Grid) -> Option<Grid> {
        self.bases.insert(name.to_string(), grid.local_to_world());
        self.arena.insert(name, grid)
    }

    pub fn get(&self, name: &str) -> Result<&Grid> {
        self.arena
            .get(name)
            .with_context(|| format!("no grid named '{name}'"))
    }

    pub fn remove(&mut self, name: &str) -> Result<Grid> {
        self.bases.remove(name);
        self.arena
            .remove(name)
            .with_context(|| format!("no grid named '{name}'"))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.arena.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arena.names()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Bake posed sources with `baker` and store the grid as `name`
    pub fn bake<B: Baker>(
        &mut self,
        name: &str,
        baker: &B,
        sources: &[(B::Source, Mat4)],
        resolution: u32,
        bounds: Aabb,
    ) -> Result<()> {
        let grid = baker
            .bake(sources, resolution, bounds)
            .with_context(|| format!("Failed to bake '{name}'"))?;
        info!(
            grid = name,
            dimensions = %grid.dimensions(),
            voxel_size = grid.voxel_size(),
            "grid baked"
        );
        self.insert(name, grid);
        Ok(())
    }

    /// Union of `a` and `b`, stored as `dest`
    pub fn union(&mut self, a: &str, b: &str, dest: &str) -> Result<()> {
        let merged = kernel::union(&self.ctx, self.get(a)?, self.get(b)?)
            .with_context(|| format!("Failed to union '{a}' and '{b}'"))?;
        info!(a, b, dest, dimensions = %merged.dimensions(), "union stored");
        self.insert(dest, merged);
        Ok(())
    }

    /// Grow `target` by `other` in place
    pub fn union_into(&mut self, target: &str, other: &str) -> Result<()> {
        if target == other {
            return self.get(target).map(|_| ());
        }

        let mut grid = self.remove(target)?;
        let result = match self.arena.get(other) {
            Some(source) => kernel::union_with(&self.ctx, &mut grid, source)
                .with_context(|| format!("Failed to union '{other}' into '{target}'")),
            None => Err(anyhow!("no grid named '{other}'")),
        };
        self.insert(target, grid);
        result
    }

    /// Voxels of the intersection of `a` and `b` at or below the configured threshold.
    ///
    /// An empty intersection is reported as [`sdfgrid_core::Error::EmptyResult`].
    pub fn intersect(&self, a: &str, b: &str) -> Result<usize> {
        let threshold = self.config.intersection_threshold;
        match kernel::intersection(&self.ctx, self.get(a)?, self.get(b)?, threshold)? {
            Some(hit) => {
                info!(a, b, voxels = hit.volume_voxel_count, "grids intersect");
                Ok(hit.volume_voxel_count)
            }
            None => {
                warn!(a, b, threshold, "intersection is empty");
                Err(sdfgrid_core::Error::EmptyResult("intersection").into())
            }
        }
    }

    /// Bounds rejection first, then a full intersection only where the boxes overlap
    pub fn clearance(&self, a: &str, b: &str) -> Result<Clearance> {
        let (ga, gb) = (self.get(a)?, self.get(b)?);
        let Some(overlap) = kernel::intersects_bounds(ga, gb) else {
            info!(a, b, "clearance: bounds disjoint");
            return Ok(Clearance::Separated);
        };

        let threshold = self.config.intersection_threshold;
        let report = match kernel::intersection(&self.ctx, ga, gb, threshold)? {
            Some(hit) => Clearance::Colliding {
                voxels: hit.volume_voxel_count,
                volume: hit.volume(),
            },
            None => Clearance::Clear { overlap },
        };
        info!(a, b, report = ?report, "clearance checked");
        Ok(report)
    }

    /// Carve a sphere out of `name` in place.
    ///
    /// A carve that leaves no solid voxel is reported as
    /// [`sdfgrid_core::Error::EmptyResult`] and `name` is left unchanged.
    pub fn subtract_sphere(&mut self, name: &str, center: Vec3, radius: f32) -> Result<()> {
        let carved = kernel::subtract_sphere(&self.ctx, self.get(name)?, center, radius)
            .with_context(|| format!("Failed to carve sphere from '{name}'"))?;
        let Some(carved) = carved else {
            warn!(grid = name, radius, "sphere subtraction leaves nothing solid");
            return Err(sdfgrid_core::Error::EmptyResult("sphere subtraction").into());
        };
        self.insert(name, carved);
        Ok(())
    }

    /// Sweep `name` through `poses`, storing the swept volume as `dest`
    pub fn sweep(&mut self, name: &str, poses: &[Mat4], dest: &str) -> Result<()> {
        let swept = kernel::swept_volume(&self.ctx, self.get(name)?, poses)
            .with_context(|| format!("Failed to sweep '{name}'"))?;
        info!(
            grid = name,
            dest,
            poses = poses.len(),
            dimensions = %swept.dimensions(),
            "swept volume stored"
        );
        self.insert(dest, swept);
        Ok(())
    }

    pub fn distance(&self, name: &str, point: Vec3) -> Result<f32> {
        Ok(self.get(name)?.distance_at(point))
    }

    pub fn gradient(&self, name: &str, point: Vec3) -> Result<Vec3> {
        self.get(name)?
            .gradient_at(point)
            .with_context(|| format!("No gradient for '{name}' at {point}"))
    }

    /// Place `name` at `pose` relative to the placement it was stored with
    pub fn set_pose(&mut self, name: &str, pose: Mat4) -> Result<()> {
        let base = *self
            .bases
            .get(name)
            .with_context(|| format!("no grid named '{name}'"))?;
        let grid = self.remove(name)?;

        let mut moving = MovingGrid::with_base(grid, base);
        let placed = moving.set_pose(pose);
        self.arena.insert(name, moving.into_inner());
        self.bases.insert(name.to_string(), base);
        placed.with_context(|| format!("Failed to pose '{name}'"))
    }

    pub fn render_params(&self, name: &str) -> Result<RenderParams> {
        Ok(RenderParams::from(self.get(name)?))
    }

    pub fn export<E: Exporter>(&self, name: &str, exporter: &mut E) -> Result<()> {
        exporter
            .export_grid(self.get(name)?)
            .with_context(|| format!("Failed to export '{name}'"))
    }

    /// Release every stored grid. Returns how many were released.
    pub fn shutdown(&mut self) -> usize {
        self.bases.clear();
        self.arena.shutdown()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("grids", &self.arena.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
