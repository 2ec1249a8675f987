//! Evolution configuration types for rule search.
//!
//! This module provides the configuration consumed by the genetic-algorithm
//! driver, the selection and crossover method enums, and the progress and
//! result types the driver reports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compute::{Grid, GridError};

use super::{Encoding, GridSeed, Rule};

/// Number of rules returned at the end of a run.
pub const FINAL_BEST_COUNT: usize = 3;

/// Top-level configuration for a rule search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Rule encoding to evolve.
    #[serde(default)]
    pub encoding: Encoding,
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Selection, crossover and mutation settings.
    #[serde(default)]
    pub genetic: GeneticAlgorithmConfig,
    /// Evaluation settings (steps per candidate).
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Shared initial grid every rule is evaluated on.
    #[serde(default)]
    pub grid: GridSeed,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Population and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of individuals in population.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Number of evaluate/select/reproduce cycles.
    #[serde(default = "default_generations")]
    pub generations: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            generations: default_generations(),
        }
    }
}

fn default_population_size() -> usize {
    10
}
fn default_generations() -> usize {
    10
}

/// Genetic Algorithm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticAlgorithmConfig {
    /// Selection method.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Number of parents selected each generation.
    #[serde(default = "default_selection_size")]
    pub selection_size: usize,
    /// Crossover method.
    #[serde(default)]
    pub crossover: CrossoverMethod,
    /// Probability of flipping each rule value (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            selection: SelectionMethod::default(),
            selection_size: default_selection_size(),
            crossover: CrossoverMethod::default(),
            mutation_rate: default_mutation_rate(),
        }
    }
}

fn default_selection_size() -> usize {
    4
}
fn default_mutation_rate() -> f64 {
    0.1
}

/// Evaluation settings for fitness computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Number of automaton steps per candidate.
    #[serde(default = "default_steps_per_eval")]
    pub steps: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            steps: default_steps_per_eval(),
        }
    }
}

fn default_steps_per_eval() -> usize {
    100
}

/// Parent selection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    /// Uniform without replacement, ignoring fitness.
    Random,
    /// Highest fitness first.
    Best,
    /// Fitness-proportionate without replacement.
    Weighted,
    /// Repeated pairwise contests.
    #[default]
    Tournament,
}

impl SelectionMethod {
    pub fn name(self) -> &'static str {
        match self {
            SelectionMethod::Random => "random",
            SelectionMethod::Best => "best",
            SelectionMethod::Weighted => "weighted",
            SelectionMethod::Tournament => "tournament",
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionMethod {
    type Err = MethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(SelectionMethod::Random),
            "best" => Ok(SelectionMethod::Best),
            "weighted" => Ok(SelectionMethod::Weighted),
            "tournament" => Ok(SelectionMethod::Tournament),
            other => Err(MethodParseError::Selection(other.to_string())),
        }
    }
}

/// Crossover method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverMethod {
    /// First half from one parent, second half from the other.
    #[default]
    Half,
    /// One random cut point.
    #[serde(alias = "1p")]
    OnePoint,
    /// Two random cut points; the middle segment comes from the second parent.
    #[serde(alias = "2p")]
    TwoPoint,
}

impl CrossoverMethod {
    pub fn name(self) -> &'static str {
        match self {
            CrossoverMethod::Half => "half",
            CrossoverMethod::OnePoint => "one_point",
            CrossoverMethod::TwoPoint => "two_point",
        }
    }
}

impl fmt::Display for CrossoverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CrossoverMethod {
    type Err = MethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "half" => Ok(CrossoverMethod::Half),
            "one_point" | "1p" => Ok(CrossoverMethod::OnePoint),
            "two_point" | "2p" => Ok(CrossoverMethod::TwoPoint),
            other => Err(MethodParseError::Crossover(other.to_string())),
        }
    }
}

/// Unknown method name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MethodParseError {
    #[error("Unknown selection method '{0}' (expected random, best, weighted or tournament)")]
    Selection(String),
    #[error("Unknown crossover method '{0}' (expected half, one_point/1p or two_point/2p)")]
    Crossover(String),
}

/// Settings for scoring imported rules on fresh random grids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralisationConfig {
    /// Random grids per rule.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
    #[serde(default = "default_generalisation_size")]
    pub rows: usize,
    #[serde(default = "default_generalisation_size")]
    pub cols: usize,
    /// Automaton steps per evaluation.
    #[serde(default = "default_steps_per_eval")]
    pub steps: usize,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for GeneralisationConfig {
    fn default() -> Self {
        Self {
            repetitions: default_repetitions(),
            rows: default_generalisation_size(),
            cols: default_generalisation_size(),
            steps: default_steps_per_eval(),
            random_seed: None,
        }
    }
}

fn default_repetitions() -> usize {
    100
}
fn default_generalisation_size() -> usize {
    100
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// A rule paired with its fitness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRule {
    pub rule: Rule,
    pub fitness: f64,
}

/// Per-generation progress event delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationEvent {
    /// Generation index (the final evaluation uses the configured generation count).
    pub generation: usize,
    /// Highest score in the population.
    pub max_fitness: f64,
    /// Mean score of the population.
    pub mean_fitness: f64,
}

/// Scores of one evaluated population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    /// Individual scores in population order.
    pub scores: Vec<f64>,
    pub max_fitness: f64,
    pub mean_fitness: f64,
}

impl GenerationRecord {
    /// Build a record, computing the aggregates.
    pub fn from_scores(generation: usize, scores: Vec<f64>) -> Self {
        let max_fitness = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean_fitness = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        Self {
            generation,
            scores,
            max_fitness,
            mean_fitness,
        }
    }

    /// Progress event for this record.
    pub fn event(&self) -> GenerationEvent {
        GenerationEvent {
            generation: self.generation,
            max_fitness: self.max_fitness,
            mean_fitness: self.mean_fitness,
        }
    }
}

/// Evolution history for analysis and export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionHistory {
    /// One record per evaluated population, final evaluation included.
    pub records: Vec<GenerationRecord>,
}

impl EvolutionHistory {
    /// Max score per record.
    pub fn max_fitness(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.max_fitness).collect()
    }

    /// Mean score per record.
    pub fn mean_fitness(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.mean_fitness).collect()
    }
}

/// Current phase of the driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Building the initial population.
    #[default]
    Initializing,
    /// Scoring candidates.
    Evaluating,
    /// Picking parents.
    Selecting,
    /// Creating offspring.
    Reproducing,
    /// Scoring the last population.
    FinalEvaluation,
    /// Evolution complete.
    Complete,
}

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations run.
    pub generations: usize,
    /// Total rule evaluations performed.
    pub total_evaluations: u64,
    /// Best score seen in any evaluation.
    pub best_fitness: f64,
    /// Mean score of the final population.
    pub final_mean_fitness: f64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
}

/// Final result of an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Best rules of the final population, highest score first.
    pub best: Vec<ScoredRule>,
    /// Full history for analysis.
    pub history: EvolutionHistory,
    /// Statistics from the run.
    pub stats: EvolutionStats,
}

// ============================================================================
// Validation
// ============================================================================

/// Evolution configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvolutionConfigError {
    #[error("Population size must be at least {minimum}, got {size}")]
    PopulationTooSmall { size: usize, minimum: usize },
    #[error("Selection size must be at least 2 to draw two distinct parents, got {0}")]
    SelectionTooSmall(usize),
    #[error("Selection size {selection} exceeds population size {population}")]
    SelectionExceedsPopulation { selection: usize, population: usize },
    #[error("Mutation rate must be within [0, 1], got {0}")]
    InvalidMutationRate(f64),
    #[error("Evaluation steps must be positive")]
    InvalidSteps,
    #[error("Generalisation needs at least one repetition")]
    NoRepetitions,
    #[error("Seed rule {index} uses {found} encoding, expected {expected}")]
    SeedEncoding {
        index: usize,
        expected: Encoding,
        found: Encoding,
    },
    #[error("{count} seed rules exceed population size {population}")]
    TooManySeedRules { count: usize, population: usize },
    #[error("Initial grid is invalid: {0}")]
    Grid(#[from] GridError),
}

impl GeneralisationConfig {
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        if self.repetitions == 0 {
            return Err(EvolutionConfigError::NoRepetitions);
        }
        if self.steps == 0 {
            return Err(EvolutionConfigError::InvalidSteps);
        }
        Grid::check_dimensions(self.rows, self.cols)?;
        Ok(())
    }
}

impl EvolutionConfig {
    /// Validate evolution configuration, including the grid seed.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        self.validate_search()?;
        self.grid.validate()?;
        Ok(())
    }

    /// Validate the search settings only, for runs on an explicit grid.
    pub fn validate_search(&self) -> Result<(), EvolutionConfigError> {
        let size = self.population.size;
        if size < FINAL_BEST_COUNT {
            return Err(EvolutionConfigError::PopulationTooSmall {
                size,
                minimum: FINAL_BEST_COUNT,
            });
        }

        let selection = self.genetic.selection_size;
        if selection < 2 {
            return Err(EvolutionConfigError::SelectionTooSmall(selection));
        }
        if selection > size {
            return Err(EvolutionConfigError::SelectionExceedsPopulation {
                selection,
                population: size,
            });
        }

        let rate = self.genetic.mutation_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(EvolutionConfigError::InvalidMutationRate(rate));
        }

        if self.evaluation.steps == 0 {
            return Err(EvolutionConfigError::InvalidSteps);
        }

        Ok(())
    }

    /// Check imported rules against this configuration.
    pub fn validate_seed_rules(&self, rules: &[Rule]) -> Result<(), EvolutionConfigError> {
        if rules.len() > self.population.size {
            return Err(EvolutionConfigError::TooManySeedRules {
                count: rules.len(),
                population: self.population.size,
            });
        }
        if let Some((index, rule)) = rules
            .iter()
            .enumerate()
            .find(|(_, r)| r.encoding() != self.encoding)
        {
            return Err(EvolutionConfigError::SeedEncoding {
                index,
                expected: self.encoding,
                found: rule.encoding(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population.size, 10);
        assert_eq!(config.genetic.selection_size, 4);
        assert_eq!(config.evaluation.steps, 100);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = EvolutionConfig::default();
        config.population.size = 2;
        config.genetic.selection_size = 2;
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::PopulationTooSmall { .. })
        ));

        let mut config = EvolutionConfig::default();
        config.genetic.selection_size = 11;
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::SelectionExceedsPopulation { .. })
        ));

        let mut config = EvolutionConfig::default();
        config.genetic.selection_size = 1;
        assert_eq!(
            config.validate(),
            Err(EvolutionConfigError::SelectionTooSmall(1))
        );

        let mut config = EvolutionConfig::default();
        config.genetic.mutation_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::InvalidMutationRate(_))
        ));

        let mut config = EvolutionConfig::default();
        config.genetic.mutation_rate = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = EvolutionConfig::default();
        config.grid = GridSeed::Random {
            rows: 1,
            cols: 1,
            seed: None,
        };
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::Grid(_))
        ));
    }

    #[test]
    fn test_seed_rule_validation() {
        let config = EvolutionConfig::default();
        assert!(config.validate_seed_rules(&[Rule::conway()]).is_ok());
        assert!(matches!(
            config.validate_seed_rules(&[Rule::identity(Encoding::Pattern)]),
            Err(EvolutionConfigError::SeedEncoding { index: 0, .. })
        ));
        let many = vec![Rule::conway(); 11];
        assert!(matches!(
            config.validate_seed_rules(&many),
            Err(EvolutionConfigError::TooManySeedRules { .. })
        ));
    }

    #[test]
    fn test_serialization() {
        let config = EvolutionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.population.size, config.population.size);
        assert_eq!(parsed.genetic.crossover, config.genetic.crossover);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "encoding": "pattern",
            "genetic": { "selection": "weighted", "crossover": "2p" }
        }"#;
        let config: EvolutionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.encoding, Encoding::Pattern);
        assert_eq!(config.genetic.selection, SelectionMethod::Weighted);
        assert_eq!(config.genetic.crossover, CrossoverMethod::TwoPoint);
        assert_eq!(config.genetic.selection_size, 4);
        assert_eq!(config.population.generations, 10);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("best".parse::<SelectionMethod>(), Ok(SelectionMethod::Best));
        assert_eq!("1p".parse::<CrossoverMethod>(), Ok(CrossoverMethod::OnePoint));
        assert_eq!(
            "two_point".parse::<CrossoverMethod>(),
            Ok(CrossoverMethod::TwoPoint)
        );
        assert!("roulette".parse::<SelectionMethod>().is_err());
    }

    #[test]
    fn test_generation_record_aggregates() {
        let record = GenerationRecord::from_scores(2, vec![10.0, 30.0, 20.0]);
        assert_eq!(record.max_fitness, 30.0);
        assert!((record.mean_fitness - 20.0).abs() < 1e-12);
        assert_eq!(
            record.event(),
            GenerationEvent {
                generation: 2,
                max_fitness: 30.0,
                mean_fitness: 20.0
            }
        );
    }

    #[test]
    fn test_generalisation_config_validation() {
        assert!(GeneralisationConfig::default().validate().is_ok());

        let config = GeneralisationConfig {
            repetitions: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(EvolutionConfigError::NoRepetitions));

        let config = GeneralisationConfig {
            rows: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::Grid(GridError::TooSmall { .. }))
        ));
    }
}
