//! Explicit owner for grids that outlive a single operation
//!
//! Short-lived grids are dropped by whoever holds them. Grids meant to live for a
//! whole session go in a [`GridArena`], which releases everything it still owns in
//! [`GridArena::shutdown`] (or on drop) instead of relying on process exit.

use crate::grid::Grid;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct GridArena {
    grids: BTreeMap<String, Grid>,
}

impl GridArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `grid` under `name`, returning the grid it replaced
    pub fn insert(&mut self, name: impl Into<String>, grid: Grid) -> Option<Grid> {
        let name = name.into();
        debug!(name = %name, dimensions = %grid.dimensions(), "grid stored in arena");
        self.grids.insert(name, grid)
    }

    pub fn get(&self, name: &str) -> Option<&Grid> {
        self.grids.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Grid> {
        self.grids.get_mut(name)
    }

    /// Take a grid out of the arena; the caller becomes its owner
    pub fn remove(&mut self, name: &str) -> Option<Grid> {
        self.grids.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.grids.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Total voxels held across every stored grid
    pub fn voxel_count(&self) -> usize {
        self.grids.values().map(Grid::voxel_count).sum()
    }

    /// Release every grid still held. Returns how many were released.
    pub fn shutdown(&mut self) -> usize {
        let released = self.grids.len();
        if released > 0 {
            info!(
                grids = released,
                voxels = self.voxel_count(),
                "releasing grids held by arena"
            );
        }
        self.grids.clear();
        released
    }
}

impl Drop for GridArena {
    fn drop(&mut self) {
        self.shutdown();
    }
}
