//! Fitness evaluation for rule search.
//!
//! A rule is scored by running it on a grid and measuring how close the final
//! proportion of live cells is to one half, through a Gaussian:
//!
//! `score = 100 * exp(-(p - 0.5)^2 / (2 * 0.15^2))`

use crate::compute::{Grid, run};
use crate::schema::Rule;

/// Live-cell proportion with the highest score.
pub const TARGET_PROPORTION: f64 = 0.5;

/// Width of the Gaussian around the target proportion.
pub const PROPORTION_SIGMA: f64 = 0.15;

/// Score at the target proportion.
pub const MAX_FITNESS: f64 = 100.0;

/// Score a live-cell proportion.
///
/// Output range: (0, 100]. Strictly decreasing in `|p - 0.5|`.
#[inline]
pub fn density_score(proportion: f64) -> f64 {
    let diff = proportion - TARGET_PROPORTION;
    MAX_FITNESS * (-diff * diff / (2.0 * PROPORTION_SIGMA * PROPORTION_SIGMA)).exp()
}

/// Score a final grid.
pub fn fitness(grid: &Grid) -> f64 {
    density_score(grid.live_proportion())
}

/// Evaluates rules by running them for a fixed number of steps.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator {
    steps: usize,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Run `rule` from `grid` and score the final state.
    pub fn evaluate(&self, rule: &Rule, grid: &Grid) -> f64 {
        fitness(&run(grid, rule, self.steps))
    }
}
