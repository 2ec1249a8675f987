//! Scoring evolved rules on fresh random grids.
//!
//! Evolution scores every rule on one shared grid; generalisation
//! re-evaluates the resulting rules on many new grids.

use rayon::prelude::*;

use crate::schema::{EvolutionConfigError, GeneralisationConfig, Rule};

use super::encode::RuleRng;
use super::fitness::FitnessEvaluator;

/// Scores of one rule across all repetitions.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleGeneralisation {
    /// 1-based position of the rule in the input.
    pub rule: usize,
    pub scores: Vec<f64>,
}

impl RuleGeneralisation {
    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    pub fn max(&self) -> f64 {
        self.scores.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneralisationReport {
    pub repetitions: usize,
    /// One entry per input rule, in input order.
    pub results: Vec<RuleGeneralisation>,
}

/// Evaluate every rule on `repetitions` fresh random grids.
///
/// Each rule gets its own generator seeded from one master generator, so
/// results are reproducible for a fixed `random_seed` regardless of how the
/// rules are scheduled across threads.
pub fn generalise(
    rules: &[Rule],
    config: &GeneralisationConfig,
) -> Result<GeneralisationReport, EvolutionConfigError> {
    config.validate()?;

    let mut master = match config.random_seed {
        Some(seed) => RuleRng::new(seed),
        None => RuleRng::random(),
    };
    let seeds: Vec<u64> = rules.iter().map(|_| master.next_seed()).collect();
    let evaluator = FitnessEvaluator::new(config.steps);

    log::info!(
        "generalising {} rules over {} grids of {}x{}",
        rules.len(),
        config.repetitions,
        config.rows,
        config.cols
    );

    let results = rules
        .par_iter()
        .zip(seeds.par_iter())
        .enumerate()
        .map(|(index, (rule, &seed))| {
            let mut rng = RuleRng::new(seed);
            let scores = (0..config.repetitions)
                .map(|_| {
                    let grid = rng.random_grid(config.rows, config.cols)?;
                    Ok(evaluator.evaluate(rule, &grid))
                })
                .collect::<Result<Vec<f64>, EvolutionConfigError>>()?;

            let result = RuleGeneralisation {
                rule: index + 1,
                scores,
            };
            log::debug!("rule {}: mean {:.4}", result.rule, result.mean());
            Ok(result)
        })
        .collect::<Result<Vec<_>, EvolutionConfigError>>()?;

    Ok(GeneralisationReport {
        repetitions: config.repetitions,
        results,
    })
}
