//! Compute module - automaton stepping and rule search.

mod grid;
mod transition;

pub mod evolution;

pub use grid::*;
pub use transition::*;
