//! Runtime configuration for an [`SdfContext`](crate::context::SdfContext)

use serde::{Deserialize, Serialize};

/// Knobs shared by every kernel dispatched through a context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Edge length, in voxels, of the cubic work blocks handed to the worker pool
    pub block_size: u32,
    /// Largest destination grid (in voxels) an operation may allocate
    pub max_voxels: u64,
    /// Relative difference tolerated between combinator operands' voxel sizes
    pub voxel_size_tolerance: f32,
    /// Slack, in voxels, absorbed before rounding a box size up to whole voxels
    pub dimension_epsilon: f32,
    /// Run kernels on the rayon pool (`false` selects the serial backend)
    pub parallel: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            block_size: 8,
            max_voxels: 512 * 512 * 512,
            voxel_size_tolerance: 1e-5,
            dimension_epsilon: 1e-4,
            parallel: true,
        }
    }
}

impl ContextConfig {
    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_max_voxels(mut self, max_voxels: u64) -> Self {
        self.max_voxels = max_voxels;
        self
    }

    pub fn with_voxel_size_tolerance(mut self, tolerance: f32) -> Self {
        self.voxel_size_tolerance = tolerance;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
