//! Seed types for building the shared initial grid.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::compute::{Grid, GridError};

fn default_grid_seed() -> Option<u64> {
    Some(70)
}

/// How the initial grid of a run is obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GridSeed {
    /// Uniform random cells.
    Random {
        rows: usize,
        cols: usize,
        /// Generator seed (None = entropy).
        #[serde(default = "default_grid_seed")]
        seed: Option<u64>,
    },
    /// Explicit cell values as nested rows.
    Cells { cells: Grid },
}

impl Default for GridSeed {
    fn default() -> Self {
        Self::Random {
            rows: 100,
            cols: 100,
            seed: default_grid_seed(),
        }
    }
}

impl GridSeed {
    /// Check the seed without generating the grid.
    pub fn validate(&self) -> Result<(), GridError> {
        match self {
            GridSeed::Random { rows, cols, .. } => Grid::check_dimensions(*rows, *cols),
            // Explicit cells are validated on construction
            GridSeed::Cells { .. } => Ok(()),
        }
    }

    /// Build the grid.
    pub fn generate(&self) -> Result<Grid, GridError> {
        match self {
            GridSeed::Random { rows, cols, seed } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_entropy(),
                };
                Grid::random(*rows, *cols, &mut rng)
            }
            GridSeed::Cells { cells } => Ok(cells.clone()),
        }
    }
}
