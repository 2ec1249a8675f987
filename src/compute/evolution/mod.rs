//! Genetic-algorithm search for density-balancing transition rules.
//!
//! # Overview
//!
//! The search system consists of:
//!
//! - **Encoders** (`encode`): random total rules and the seeded generator
//! - **Fitness** (`fitness`): Gaussian score of the live proportion after `T` steps
//! - **Selection** (`selection`): random, best, weighted and tournament
//! - **Crossover** (`crossover`): half, one-point and two-point
//! - **Mutation** (`mutation`): per-key Bernoulli flip
//! - **Driver** (`search`): the evaluate/select/reproduce loop
//! - **Archive** (`archive`): rule import/export and CSV metrics
//! - **Generalisation** (`generalisation`): re-scoring rules on fresh grids
//!
//! # Example
//!
//! ```rust,no_run
//! use life_ga::schema::{EvolutionConfig, GenerationEvent};
//! use life_ga::compute::evolution::{EvolutionEngine, save_run};
//!
//! let config = EvolutionConfig::default();
//! let mut engine = EvolutionEngine::new(config.clone()).unwrap();
//!
//! let result = engine
//!     .run_with_observer(&mut |event: &GenerationEvent| {
//!         println!(
//!             "Generation {}: max {:.3}, mean {:.3}",
//!             event.generation, event.max_fitness, event.mean_fitness
//!         );
//!     })
//!     .unwrap();
//!
//! println!("Best rule fitness: {:.3}", result.best[0].fitness);
//! save_run("runs/density", &result, &config).unwrap();
//! ```

mod archive;
mod crossover;
mod encode;
mod fitness;
mod generalisation;
mod mutation;
mod search;
mod selection;

pub use archive::{
    ArchiveError, generalisation_to_csv, history_to_csv, load_rules, rules_from_json,
    rules_to_json, save_rules, save_run, write_generalisation_csv, write_history_csv,
};
pub use crossover::crossover_half;
pub use encode::RuleRng;
pub use fitness::{
    FitnessEvaluator, MAX_FITNESS, PROPORTION_SIGMA, TARGET_PROPORTION, density_score, fitness,
};
pub use generalisation::{GeneralisationReport, RuleGeneralisation, generalise};
pub use search::{EvolutionEngine, EvolutionError, EvolutionObserver};
pub use selection::{WEIGHT_EPSILON, select_best};
