//! # sdfgrid core
//!
//! Solid shapes stored as discretized signed distance fields on dense voxel grids.
//!
//! A [`Grid`] is a dense block of signed distances together with a voxel size and a
//! local-to-world transform. Grids are combined with boolean operators, swept along a
//! sequence of poses, and queried for distance and gradient at arbitrary world points.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sdfgrid_core::prelude::*;
//!
//! let ctx = SdfContext::new(ContextConfig::default());
//!
//! let merged = union(&ctx, &part_a, &part_b)?;
//! let swept = swept_volume(&ctx, &merged, &poses)?;
//!
//! if let Some(hit) = intersection(&ctx, &swept, &obstacle, 0.0)? {
//!     println!("overlap: {} voxels", hit.volume_voxel_count);
//! }
//! ```
//!
//! ## Conventions
//!
//! - **Distances**: negative inside, positive outside, stored in grid-local units
//! - **Layout**: `index = x + y * width + z * width * height`
//! - **Precision**: `f32` throughout, matching accelerator texture formats
//! - **Destinations**: every combinator and sweep result is axis-aligned in world space

pub mod arena;
pub mod backend;
pub mod bake;
pub mod bounds;
pub mod config;
pub mod context;
pub mod export;
pub mod grid;
pub mod kernel;
pub mod sampler;
pub mod transfer;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::arena::GridArena;
    pub use crate::backend::{ComputeBackend, RayonBackend, SerialBackend, VoxelKernel};
    pub use crate::bake::{Baker, bake_layout};
    pub use crate::bounds::Aabb;
    pub use crate::config::ContextConfig;
    pub use crate::context::SdfContext;
    pub use crate::export::{Exporter, RawVolumeExporter, RenderParams};
    pub use crate::grid::{Grid, GridLayout, MovingGrid};
    pub use crate::kernel::{
        Intersection, intersection, intersects_bounds, subtract_sphere, swept_volume, union,
        union_with,
    };

    pub use glam::{Mat4, Quat, UVec3, Vec3};

    pub use crate::{Error, Result};
}
