//! Crossover strategies over the canonical key ordering of a rule.
//!
//! Children always share the parents' key domain; only values are exchanged.

use rand::Rng;

use crate::schema::{CrossoverMethod, Rule};

use super::encode::RuleRng;
use super::search::EvolutionError;

/// Key count shared by both parents.
fn shared_length(parent1: &Rule, parent2: &Rule) -> Result<usize, EvolutionError> {
    if parent1.encoding() != parent2.encoding() {
        return Err(EvolutionError::EncodingMismatch {
            first: parent1.encoding(),
            second: parent2.encoding(),
        });
    }
    Ok(parent1.key_count())
}

/// Copy of `parent1` with positions `[start, end)` taken from `parent2`.
fn splice(parent1: &Rule, parent2: &Rule, start: usize, end: usize) -> Rule {
    let mut table = parent1.table().to_vec();
    table[start..end].copy_from_slice(&parent2.table()[start..end]);
    Rule::from_raw(parent1.encoding(), table)
}

/// Positions `[0, L/2)` from `parent1`, `[L/2, L)` from `parent2`.
pub fn crossover_half(parent1: &Rule, parent2: &Rule) -> Result<Rule, EvolutionError> {
    let len = shared_length(parent1, parent2)?;
    Ok(splice(parent1, parent2, len / 2, len))
}

impl RuleRng {
    /// Recombine two parents with the specified method.
    pub fn crossover(
        &mut self,
        method: CrossoverMethod,
        parent1: &Rule,
        parent2: &Rule,
    ) -> Result<Rule, EvolutionError> {
        match method {
            CrossoverMethod::Half => crossover_half(parent1, parent2),
            CrossoverMethod::OnePoint => self.crossover_one_point(parent1, parent2),
            CrossoverMethod::TwoPoint => self.crossover_two_point(parent1, parent2),
        }
    }

    /// Random cut in `[1, L-1]`: head from `parent1`, tail from `parent2`.
    pub fn crossover_one_point(
        &mut self,
        parent1: &Rule,
        parent2: &Rule,
    ) -> Result<Rule, EvolutionError> {
        let len = shared_length(parent1, parent2)?;
        let cut = self.rng.gen_range(1..len);
        Ok(splice(parent1, parent2, cut, len))
    }

    /// Cuts `pos1` in `[1, L-3]` and `pos2` in `[pos1+1, L]`: the middle
    /// segment comes from `parent2`, both ends from `parent1`.
    pub fn crossover_two_point(
        &mut self,
        parent1: &Rule,
        parent2: &Rule,
    ) -> Result<Rule, EvolutionError> {
        let len = shared_length(parent1, parent2)?;
        let first = self.rng.gen_range(1..=len - 3);
        let second = self.rng.gen_range(first + 1..=len);
        Ok(splice(parent1, parent2, first, second))
    }
}
