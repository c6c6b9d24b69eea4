//! Parallel map over a 3D index space
//!
//! Kernels describe the math for a single voxel through [`VoxelKernel`]. A
//! [`ComputeBackend`] decides how the index space is walked. Every voxel depends only
//! on read-only operand state, so backends need no synchronization beyond handing out
//! disjoint output ranges.

use glam::UVec3;
use rayon::prelude::*;

/// Per-voxel math of an operation
pub trait VoxelKernel: Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Value of the destination voxel at `voxel`
    fn evaluate(&self, voxel: UVec3) -> f32;
}

/// Executes a kernel over every voxel of a destination grid
pub trait ComputeBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Evaluate `kernel` at every voxel of `dimensions`, writing into `out`
    /// (`x + y * width + z * width * height`). Returns once all voxels are written.
    fn dispatch(&self, dimensions: UVec3, kernel: &dyn VoxelKernel, out: &mut [f32]);
}

/// Runs kernels on the rayon thread pool.
///
/// The index space is split into slabs `block_size` voxels deep. Each slab is one
/// rayon task and is walked in `block_size`³ blocks.
#[derive(Debug, Clone, Copy)]
pub struct RayonBackend {
    block_size: u32,
}

impl RayonBackend {
    pub fn new(block_size: u32) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }
}

impl Default for RayonBackend {
    fn default() -> Self {
        Self::new(8)
    }
}

impl ComputeBackend for RayonBackend {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn dispatch(&self, dimensions: UVec3, kernel: &dyn VoxelKernel, out: &mut [f32]) {
        let w = dimensions.x as usize;
        let h = dimensions.y as usize;
        debug_assert_eq!(out.len(), w * h * dimensions.z as usize);

        let block = self.block_size as usize;
        let slice = w * h;

        out.par_chunks_mut(slice * block)
            .enumerate()
            .for_each(|(slab, chunk)| {
                let z0 = slab * block;
                let depth = chunk.len() / slice;

                for by in (0..h).step_by(block) {
                    for bx in (0..w).step_by(block) {
                        for dz in 0..depth {
                            for y in by..(by + block).min(h) {
                                let row = dz * slice + y * w;
                                for x in bx..(bx + block).min(w) {
                                    let voxel = UVec3::new(x as u32, y as u32, (z0 + dz) as u32);
                                    chunk[row + x] = kernel.evaluate(voxel);
                                }
                            }
                        }
                    }
                }
            });
    }
}

/// Runs kernels on the calling thread, in index order
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn dispatch(&self, dimensions: UVec3, kernel: &dyn VoxelKernel, out: &mut [f32]) {
        debug_assert_eq!(
            out.len(),
            dimensions.x as usize * dimensions.y as usize * dimensions.z as usize
        );

        let mut i = 0;
        for z in 0..dimensions.z {
            for y in 0..dimensions.y {
                for x in 0..dimensions.x {
                    out[i] = kernel.evaluate(UVec3::new(x, y, z));
                    i += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Encode;

    impl VoxelKernel for Encode {
        fn name(&self) -> &'static str {
            "encode"
        }

        fn evaluate(&self, voxel: UVec3) -> f32 {
            (voxel.x + 100 * voxel.y + 10_000 * voxel.z) as f32
        }
    }

    fn expected(dims: UVec3) -> Vec<f32> {
        let mut v = Vec::new();
        for z in 0..dims.z {
            for y in 0..dims.y {
                for x in 0..dims.x {
                    v.push((x + 100 * y + 10_000 * z) as f32);
                }
            }
        }
        v
    }

    #[test]
    fn serial_writes_every_voxel_in_order() {
        let dims = UVec3::new(3, 4, 5);
        let mut out = vec![f32::NAN; 60];
        SerialBackend.dispatch(dims, &Encode, &mut out);
        assert_eq!(out, expected(dims));
    }

    #[test]
    fn rayon_matches_serial_for_ragged_blocks() {
        // Dimensions that are not multiples of the block size
        for dims in [UVec3::new(11, 9, 13), UVec3::new(1, 1, 1), UVec3::new(17, 3, 8)] {
            for block in [1, 4, 8] {
                let len = (dims.x * dims.y * dims.z) as usize;
                let mut out = vec![f32::NAN; len];
                RayonBackend::new(block).dispatch(dims, &Encode, &mut out);
                assert_eq!(out, expected(dims), "dims {dims}, block {block}");
            }
        }
    }

    #[test]
    fn zero_block_size_is_clamped() {
        assert_eq!(RayonBackend::new(0).block_size(), 1);
    }
}
