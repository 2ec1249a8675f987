//! Parent selection strategies.
//!
//! Every strategy fails with [`EvolutionError::SelectionTooLarge`] when asked
//! for more individuals than the population holds.

use rand::seq::SliceRandom;
use rand::seq::index;

use crate::schema::{ScoredRule, SelectionMethod};

use super::encode::RuleRng;
use super::search::EvolutionError;

/// Added to every score before weighting so no individual has zero weight.
pub const WEIGHT_EPSILON: f64 = 0.001;

fn check_count(count: usize, available: usize) -> Result<(), EvolutionError> {
    if count > available {
        return Err(EvolutionError::SelectionTooLarge {
            requested: count,
            available,
        });
    }
    Ok(())
}

/// The `count` highest-scoring individuals, in descending score order.
///
/// Ties keep population order.
pub fn select_best(
    population: &[ScoredRule],
    count: usize,
) -> Result<Vec<&ScoredRule>, EvolutionError> {
    check_count(count, population.len())?;

    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| population[b].fitness.total_cmp(&population[a].fitness));

    Ok(order
        .into_iter()
        .take(count)
        .map(|i| &population[i])
        .collect())
}

/// Winner of a pairwise contest: `second` only if it scores strictly higher.
#[inline]
fn contest<'a>(first: &'a ScoredRule, second: &'a ScoredRule) -> &'a ScoredRule {
    if second.fitness > first.fitness {
        second
    } else {
        first
    }
}

impl RuleRng {
    /// Select `count` parents using the specified method.
    pub fn select<'a>(
        &mut self,
        method: SelectionMethod,
        population: &'a [ScoredRule],
        count: usize,
    ) -> Result<Vec<&'a ScoredRule>, EvolutionError> {
        match method {
            SelectionMethod::Random => self.select_random(population, count),
            SelectionMethod::Best => select_best(population, count),
            SelectionMethod::Weighted => self.select_weighted(population, count),
            SelectionMethod::Tournament => self.select_tournament(population, count),
        }
    }

    /// `count` distinct individuals drawn uniformly; scores are ignored.
    pub fn select_random<'a>(
        &mut self,
        population: &'a [ScoredRule],
        count: usize,
    ) -> Result<Vec<&'a ScoredRule>, EvolutionError> {
        check_count(count, population.len())?;

        Ok(index::sample(&mut self.rng, population.len(), count)
            .into_iter()
            .map(|i| &population[i])
            .collect())
    }

    /// `count` distinct individuals drawn with probability proportional to
    /// `fitness + WEIGHT_EPSILON`.
    pub fn select_weighted<'a>(
        &mut self,
        population: &'a [ScoredRule],
        count: usize,
    ) -> Result<Vec<&'a ScoredRule>, EvolutionError> {
        check_count(count, population.len())?;

        // Weights are computed once and normalized before sampling
        let total: f64 = population.iter().map(|c| c.fitness + WEIGHT_EPSILON).sum();
        let weights: Vec<f64> = population
            .iter()
            .map(|c| (c.fitness + WEIGHT_EPSILON) / total)
            .collect();

        let indices: Vec<usize> = (0..population.len()).collect();
        let chosen = indices
            .choose_multiple_weighted(&mut self.rng, count, |&i| weights[i])
            .map_err(|e| EvolutionError::InvalidWeights(e.to_string()))?;

        Ok(chosen.map(|&i| &population[i]).collect())
    }

    /// `count` pairwise contests between two distinct individuals drawn
    /// uniformly. The higher score wins; the first drawn wins ties.
    ///
    /// Winners are drawn with replacement across contests, so the same
    /// individual may be selected more than once.
    pub fn select_tournament<'a>(
        &mut self,
        population: &'a [ScoredRule],
        count: usize,
    ) -> Result<Vec<&'a ScoredRule>, EvolutionError> {
        check_count(count, population.len())?;
        if count > 0 && population.len() < 2 {
            return Err(EvolutionError::TournamentTooSmall(population.len()));
        }

        Ok((0..count)
            .map(|_| {
                let pair = index::sample(&mut self.rng, population.len(), 2);
                contest(&population[pair.index(0)], &population[pair.index(1)])
            })
            .collect())
    }
}
