//! Analytic signed distance functions and a baker that voxelizes them
//!
//! Shapes here stand in for meshes as bake sources: they describe a solid exactly and
//! [`ShapeBaker`] samples them into an [`sdfgrid_core::grid::Grid`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use sdfgrid_shapes::prelude::*;
//!
//! let arm = capsule(0.1, 0.6).rotate_z(0.4);
//! let grid = ShapeBaker::default().bake_shape(&arm, 64, 0.1)?;
//! ```

pub mod baker;
pub mod primitives;
pub mod transforms;

use glam::{Quat, Vec3};
use sdfgrid_core::bounds::Aabb;
use std::sync::Arc;

pub use baker::{ShapeBaker, posed_bounds};

/// The core SDF trait - any type that can compute distance from a point
pub trait Sdf: Send + Sync {
    /// Calculate the signed distance from point `p` to the surface.
    ///
    /// - Returns negative values for points inside the shape
    /// - Returns positive values for points outside the shape
    /// - Returns zero for points exactly on the surface
    fn distance(&self, p: Vec3) -> f32;

    /// Bounding box of the solid in the shape's own space
    fn bounds(&self) -> Aabb;
}

/// A shared, type-erased SDF
#[derive(Clone)]
pub struct SdfNode {
    inner: Arc<dyn Sdf>,
}

impl SdfNode {
    /// Create a new SDF node from any type implementing Sdf
    pub fn new<S: Sdf + 'static>(sdf: S) -> Self {
        Self {
            inner: Arc::new(sdf),
        }
    }
}

impl Sdf for SdfNode {
    fn distance(&self, p: Vec3) -> f32 {
        self.inner.distance(p)
    }

    fn bounds(&self) -> Aabb {
        self.inner.bounds()
    }
}

impl std::fmt::Debug for SdfNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdfNode")
            .field("bounds", &self.inner.bounds())
            .finish_non_exhaustive()
    }
}

/// Builder-style placement and combination, available on every shape
pub trait SdfExt: Sdf + Sized + 'static {
    fn into_node(self) -> SdfNode {
        SdfNode::new(self)
    }

    /// Solid covered by either shape
    fn union<S: Sdf + 'static>(self, other: S) -> SdfNode {
        SdfNode::new(transforms::Union::new(self, other))
    }

    /// Shape moved by `(x, y, z)`
    fn translate(self, x: f32, y: f32, z: f32) -> SdfNode {
        SdfNode::new(transforms::Translate::new(self, Vec3::new(x, y, z)))
    }

    fn translate_x(self, x: f32) -> SdfNode {
        self.translate(x, 0.0, 0.0)
    }

    /// Shape turned about the X axis by `angle` radians
    fn rotate_x(self, angle: f32) -> SdfNode {
        SdfNode::new(transforms::Rotate::new(self, Quat::from_rotation_x(angle)))
    }

    /// Shape turned about the Z axis by `angle` radians
    fn rotate_z(self, angle: f32) -> SdfNode {
        SdfNode::new(transforms::Rotate::new(self, Quat::from_rotation_z(angle)))
    }
}

impl<T: Sdf + 'static> SdfExt for T {}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::primitives::*;
    pub use crate::{Sdf, SdfExt, SdfNode, ShapeBaker, posed_bounds};
    pub use sdfgrid_core::bake::Baker;
}
