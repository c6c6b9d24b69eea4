//! sdfgrid engine - session runtime over the grid kernels
//!
//! A [`Session`] owns the execution context, the grids of a working session and the
//! engine configuration. Callers refer to grids by name:
//!
//! ```ignore
//! use sdfgrid_engine::{EngineConfig, Session};
//!
//! let mut session = Session::new(EngineConfig::default());
//! session.bake("arm", &ShapeBaker::default(), &arm_sources, 64, arm_bounds)?;
//! session.bake("post", &ShapeBaker::default(), &post_sources, 64, post_bounds)?;
//!
//! session.sweep("arm", &poses, "arm_swept")?;
//! let report = session.clearance("arm_swept", "post")?;
//! ```

pub mod config;
pub mod session;

pub use config::EngineConfig;
pub use session::{Clearance, Session};

// Re-export commonly used types from the core crate
pub use sdfgrid_core::bounds::Aabb;
pub use sdfgrid_core::config::ContextConfig;
pub use sdfgrid_core::export::{Exporter, RawVolumeExporter, RenderParams};
pub use sdfgrid_core::grid::Grid;
