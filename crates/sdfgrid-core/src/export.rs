//! Hand-off points to renderers and exporters

use crate::grid::Grid;
use crate::{Error, Result, transfer};
use glam::UVec3;
use std::io::Write;

/// Per-grid parameters a ray-marching renderer binds next to the voxel texture.
///
/// Layout matches a WGSL/HLSL uniform block: 16 bytes of scalars followed by a
/// column-major 4x4 matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderParams {
    pub voxel_size: f32,
    pub dimensions: [u32; 3],
    pub local_to_world: [f32; 16],
}

impl From<&Grid> for RenderParams {
    fn from(grid: &Grid) -> Self {
        Self {
            voxel_size: grid.voxel_size(),
            dimensions: grid.dimensions().to_array(),
            local_to_world: grid.local_to_world().to_cols_array(),
        }
    }
}

/// Writes drained voxel data somewhere persistent
pub trait Exporter {
    /// Consume a flat buffer (x fastest) of `dimensions` voxels
    fn export(&mut self, values: &[f32], dimensions: UVec3) -> Result<()>;

    /// Drain `grid` and export it
    fn export_grid(&mut self, grid: &Grid) -> Result<()> {
        let mut values = Vec::new();
        transfer::drain_into(grid, &mut values);
        self.export(&values, grid.dimensions())
    }
}

/// Raw volume: three little-endian `u32` dimensions followed by little-endian `f32`
/// voxels
#[derive(Debug)]
pub struct RawVolumeExporter<W: Write> {
    writer: W,
}

impl<W: Write> RawVolumeExporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Exporter for RawVolumeExporter<W> {
    fn export(&mut self, values: &[f32], dimensions: UVec3) -> Result<()> {
        let expected = dimensions.x as usize * dimensions.y as usize * dimensions.z as usize;
        if values.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "{dimensions} volume needs {expected} values, got {}",
                values.len()
            )));
        }

        for d in dimensions.to_array() {
            self.writer.write_all(&d.to_le_bytes())?;
        }
        if cfg!(target_endian = "little") {
            self.writer.write_all(bytemuck::cast_slice(values))?;
        } else {
            for v in values {
                self.writer.write_all(&v.to_le_bytes())?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
