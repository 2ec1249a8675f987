//! Schema module - Rule, seed and configuration types for rule search.

mod evolution;
mod rule;
mod seed;

pub use evolution::*;
pub use rule::*;
pub use seed::*;
