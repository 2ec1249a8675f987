//! Genetic-algorithm driver for rule search.
//!
//! The driver owns the population and moves it through
//! `INIT -> (EVALUATE -> SELECT -> REPRODUCE) x generations -> FINAL_EVALUATE`.
//! Every evaluation runs on the same initial grid, which is never mutated.

use std::time::Instant;

use crate::compute::Grid;
use crate::schema::{
    Encoding, EvolutionConfig, EvolutionConfigError, EvolutionHistory, EvolutionPhase,
    EvolutionResult, EvolutionStats, FINAL_BEST_COUNT, GenerationEvent, GenerationRecord, Rule,
    ScoredRule,
};

use super::encode::RuleRng;
use super::fitness::FitnessEvaluator;
use super::selection::select_best;

/// Errors raised while running the genetic algorithm.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvolutionError {
    #[error("Cannot select {requested} individuals from a population of {available}")]
    SelectionTooLarge { requested: usize, available: usize },
    #[error("Tournament selection needs at least 2 individuals, got {0}")]
    TournamentTooSmall(usize),
    #[error("Reproduction needs at least 2 selected parents, got {0}")]
    NotEnoughParents(usize),
    #[error("Invalid selection weights: {0}")]
    InvalidWeights(String),
    #[error("Mutation rate must be within [0, 1], got {0}")]
    InvalidMutationRate(f64),
    #[error("Cannot cross a {first} rule with a {second} rule")]
    EncodingMismatch { first: Encoding, second: Encoding },
    #[error("Invalid configuration: {0}")]
    Config(#[from] EvolutionConfigError),
}

/// Receives per-generation progress events.
pub trait EvolutionObserver {
    fn on_generation(&mut self, event: &GenerationEvent);
}

impl<F> EvolutionObserver for F
where
    F: FnMut(&GenerationEvent),
{
    fn on_generation(&mut self, event: &GenerationEvent) {
        self(event)
    }
}

/// Evolution engine that runs the search.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    rng: RuleRng,
    evaluator: FitnessEvaluator,
    initial_grid: Grid,
    seed_rules: Vec<Rule>,
    population: Vec<Rule>,
    history: EvolutionHistory,
    generation: usize,
    phase: EvolutionPhase,
}

impl EvolutionEngine {
    /// Create a new evolution engine, building the initial grid from the config.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        config.validate()?;
        let grid = config
            .grid
            .generate()
            .map_err(EvolutionConfigError::from)?;
        Self::with_grid(config, grid)
    }

    /// Create a new evolution engine on an explicit initial grid.
    ///
    /// The grid setting of `config` is neither used nor validated.
    pub fn with_grid(config: EvolutionConfig, grid: Grid) -> Result<Self, EvolutionError> {
        config.validate_search()?;

        let rng = match config.random_seed {
            Some(seed) => RuleRng::new(seed),
            None => RuleRng::random(),
        };
        let evaluator = FitnessEvaluator::new(config.evaluation.steps);

        Ok(Self {
            config,
            rng,
            evaluator,
            initial_grid: grid,
            seed_rules: Vec::new(),
            population: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
            phase: EvolutionPhase::Initializing,
        })
    }

    /// Start the initial population from imported rules.
    ///
    /// The encoder fills the remaining slots up to the population size.
    pub fn with_seed_rules(mut self, rules: Vec<Rule>) -> Result<Self, EvolutionError> {
        self.config.validate_seed_rules(&rules)?;
        self.seed_rules = rules;
        Ok(self)
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// The shared grid every rule is evaluated on.
    pub fn initial_grid(&self) -> &Grid {
        &self.initial_grid
    }

    /// Current (unscored) population.
    pub fn population(&self) -> &[Rule] {
        &self.population
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    fn enter(&mut self, phase: EvolutionPhase) {
        log::debug!("generation {}: {:?}", self.generation, phase);
        self.phase = phase;
    }

    /// Initialize the population.
    pub fn initialize(&mut self) {
        self.enter(EvolutionPhase::Initializing);
        self.generation = 0;
        self.history = EvolutionHistory::default();

        let size = self.config.population.size;
        let encoding = self.config.encoding;

        self.population = self.seed_rules.iter().take(size).cloned().collect();
        while self.population.len() < size {
            let rule = self.rng.random_rule(encoding);
            self.population.push(rule);
        }
    }

    /// Score every individual on the shared initial grid.
    pub fn evaluate_population(&self) -> Vec<ScoredRule> {
        self.population
            .iter()
            .map(|rule| ScoredRule {
                rule: rule.clone(),
                fitness: self.evaluator.evaluate(rule, &self.initial_grid),
            })
            .collect()
    }

    /// Record scores in the history and notify the observer.
    fn record<O>(&mut self, scored: &[ScoredRule], observer: &mut O)
    where
        O: EvolutionObserver + ?Sized,
    {
        let record = GenerationRecord::from_scores(
            self.generation,
            scored.iter().map(|c| c.fitness).collect(),
        );
        let event = record.event();

        if record.scores.iter().all(|&s| s == record.max_fitness) {
            log::warn!(
                "generation {}: all {} scores equal {:.4}",
                self.generation,
                record.scores.len(),
                record.max_fitness
            );
        }

        self.history.records.push(record);
        observer.on_generation(&event);
    }

    /// Build the next population from the selected parents.
    ///
    /// Each child comes from two parents at distinct positions of `parents`,
    /// recombined and then mutated. Parents are never modified.
    pub fn reproduce(&mut self, parents: &[&Rule]) -> Result<Vec<Rule>, EvolutionError> {
        let genetic = &self.config.genetic;
        let mut next_gen = Vec::with_capacity(self.config.population.size);

        while next_gen.len() < self.config.population.size {
            let (parent1, parent2) = self
                .rng
                .pick_pair(parents)
                .ok_or(EvolutionError::NotEnoughParents(parents.len()))?;

            let child = self.rng.crossover(genetic.crossover, parent1, parent2)?;
            let child = self.rng.mutate(&child, genetic.mutation_rate)?;
            next_gen.push(child);
        }

        Ok(next_gen)
    }

    /// Run one evaluate/select/reproduce cycle.
    pub fn step_generation<O>(&mut self, observer: &mut O) -> Result<(), EvolutionError>
    where
        O: EvolutionObserver + ?Sized,
    {
        self.enter(EvolutionPhase::Evaluating);
        let scored = self.evaluate_population();
        self.record(&scored, observer);

        self.enter(EvolutionPhase::Selecting);
        let genetic = &self.config.genetic;
        let (method, count) = (genetic.selection, genetic.selection_size);
        let parents: Vec<&Rule> = self
            .rng
            .select(method, &scored, count)?
            .into_iter()
            .map(|c| &c.rule)
            .collect();

        self.enter(EvolutionPhase::Reproducing);
        self.population = self.reproduce(&parents)?;
        self.generation += 1;

        Ok(())
    }

    /// Run evolution, reporting every evaluated population to `observer`.
    pub fn run_with_observer<O>(&mut self, observer: &mut O) -> Result<EvolutionResult, EvolutionError>
    where
        O: EvolutionObserver + ?Sized,
    {
        let start_time = Instant::now();
        let generations = self.config.population.generations;

        log::info!(
            "evolving {} {} rules for {} generations ({} selection, {} crossover, mutation {})",
            self.config.population.size,
            self.config.encoding,
            generations,
            self.config.genetic.selection,
            self.config.genetic.crossover,
            self.config.genetic.mutation_rate
        );

        self.initialize();

        while self.generation < generations {
            self.step_generation(observer)?;
        }

        self.enter(EvolutionPhase::FinalEvaluation);
        let scored = self.evaluate_population();
        self.record(&scored, observer);

        let best: Vec<ScoredRule> = select_best(&scored, FINAL_BEST_COUNT)?
            .into_iter()
            .cloned()
            .collect();

        self.enter(EvolutionPhase::Complete);

        let elapsed = start_time.elapsed().as_secs_f64();
        let total_evaluations = (self.generation as u64 + 1) * self.config.population.size as u64;
        let best_fitness = self
            .history
            .records
            .iter()
            .map(|r| r.max_fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        let final_mean_fitness = self
            .history
            .records
            .last()
            .map_or(0.0, |r| r.mean_fitness);

        log::info!(
            "evolution finished in {:.2}s: best {:.4}, final mean {:.4}",
            elapsed,
            best_fitness,
            final_mean_fitness
        );

        Ok(EvolutionResult {
            best,
            history: self.history.clone(),
            stats: EvolutionStats {
                generations: self.generation,
                total_evaluations,
                best_fitness,
                final_mean_fitness,
                elapsed_seconds: elapsed,
            },
        })
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> Result<EvolutionResult, EvolutionError> {
        self.run_with_observer(&mut |_: &GenerationEvent| {})
    }
}
