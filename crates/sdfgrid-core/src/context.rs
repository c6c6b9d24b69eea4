//! Explicit execution context shared by all grid operations
//!
//! Built once per session and passed by reference into every combinator and sweep.
//! Holding the backend here keeps kernel dispatch free of global state and lets
//! tests swap in a deterministic backend.

use crate::backend::{ComputeBackend, RayonBackend, SerialBackend, VoxelKernel};
use crate::bounds::Aabb;
use crate::config::ContextConfig;
use crate::grid::{Grid, GridLayout};
use crate::{Error, Result};
use std::fmt;
use std::time::Instant;
use tracing::debug;

pub struct SdfContext {
    backend: Box<dyn ComputeBackend>,
    config: ContextConfig,
}

impl SdfContext {
    /// Context with the backend selected by `config.parallel`
    pub fn new(config: ContextConfig) -> Self {
        let backend: Box<dyn ComputeBackend> = if config.parallel {
            Box::new(RayonBackend::new(config.block_size))
        } else {
            Box::new(SerialBackend)
        };
        Self { backend, config }
    }

    /// Context running on a caller-provided backend
    pub fn with_backend<B: ComputeBackend + 'static>(backend: B, config: ContextConfig) -> Self {
        Self {
            backend: Box::new(backend),
            config,
        }
    }

    /// Single-threaded context with default limits
    pub fn serial() -> Self {
        Self::new(ContextConfig::default().with_parallel(false))
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn ComputeBackend {
        self.backend.as_ref()
    }

    /// Axis-aligned destination layout covering `bounds`, checked against `max_voxels`
    pub fn layout_covering(&self, bounds: &Aabb, voxel_size: f32) -> Result<GridLayout> {
        let layout = GridLayout::covering(bounds, voxel_size, self.config.dimension_epsilon)?;
        if layout.voxel_count() > self.config.max_voxels {
            return Err(Error::ResourceExhaustion(format!(
                "destination of {} voxels ({}) exceeds the limit of {}",
                layout.voxel_count(),
                layout.dimensions,
                self.config.max_voxels
            )));
        }
        Ok(layout)
    }

    /// Reject operands whose voxel sizes differ beyond the configured tolerance
    pub fn check_voxel_sizes(&self, primary: &Grid, secondary: &Grid) -> Result<()> {
        let a = primary.voxel_size();
        let b = secondary.voxel_size();
        if (a - b).abs() > self.config.voxel_size_tolerance * a.max(b) {
            return Err(Error::MismatchedVoxelSize {
                primary: a,
                secondary: b,
            });
        }
        Ok(())
    }

    /// Allocate a destination buffer for `layout`, run `kernel` over it and wrap the
    /// result in a new grid. Blocks until every voxel is written.
    pub fn dispatch(&self, layout: GridLayout, kernel: &dyn VoxelKernel) -> Result<Grid> {
        let mut data = layout.allocate(0.0)?;

        let start = Instant::now();
        self.backend.dispatch(layout.dimensions, kernel, &mut data);
        debug!(
            kernel = kernel.name(),
            backend = self.backend.name(),
            dimensions = %layout.dimensions,
            elapsed_us = start.elapsed().as_micros() as u64,
            "kernel dispatched"
        );

        Grid::new(data, layout)
    }
}

impl Default for SdfContext {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

impl fmt::Debug for SdfContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdfContext")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}
