//! Life GA - evolving cellular automaton rules toward a target density.
//!
//! This crate simulates two-dimensional binary cellular automata on a
//! toroidal grid and searches, with a genetic algorithm, for transition rules
//! that keep about half of the cells alive.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Rule encodings, configuration types and result records
//! - `compute`: Grid, transition engine and the evolutionary search
//!
//! # Example
//!
//! ```rust,no_run
//! use life_ga::{
//!     compute::{Grid, run, evolution::fitness},
//!     schema::Rule,
//! };
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(70);
//! let grid = Grid::random(100, 100, &mut rng).unwrap();
//!
//! // Run Conway's Game of Life for 100 steps and score the final density
//! let end = run(&grid, &Rule::conway(), 100);
//! println!("Live proportion {:.3}, fitness {:.2}", end.live_proportion(), fitness(&end));
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EvolutionEngine, EvolutionError, EvolutionObserver};
pub use compute::{Grid, GridError, run, step};
pub use schema::{Encoding, EvolutionConfig, Rule, RuleError};
