//! Rule encoders and the random number generator shared by the genetic operators.
//!
//! Selection, crossover and mutation are implemented on [`RuleRng`] in their
//! own modules so that one seeded generator drives a whole run.

use rand::prelude::*;

use crate::compute::{Grid, GridError};
use crate::schema::{Encoding, Rule};

/// Random number generator wrapper for rule operations.
pub struct RuleRng {
    pub(super) rng: StdRng,
}

impl RuleRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generate a fully defined rule with independent uniform-random values.
    pub fn random_rule(&mut self, encoding: Encoding) -> Rule {
        let table = (0..encoding.key_count())
            .map(|_| Some(self.rng.gen_range(0..=1u8)))
            .collect();
        Rule::from_raw(encoding, table)
    }

    /// Random 18-entry neighbour-count rule.
    pub fn encode_living(&mut self) -> Rule {
        self.random_rule(Encoding::Living)
    }

    /// Random 512-entry pattern rule.
    pub fn encode_pattern(&mut self) -> Rule {
        self.random_rule(Encoding::Pattern)
    }

    /// Uniformly random grid.
    pub fn random_grid(&mut self, rows: usize, cols: usize) -> Result<Grid, GridError> {
        Grid::random(rows, cols, &mut self.rng)
    }

    /// Two items at distinct positions, drawn uniformly.
    pub fn pick_pair<'a, T>(&mut self, items: &'a [T]) -> Option<(&'a T, &'a T)> {
        if items.len() < 2 {
            return None;
        }
        let picked = rand::seq::index::sample(&mut self.rng, items.len(), 2);
        Some((&items[picked.index(0)], &items[picked.index(1)]))
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}
