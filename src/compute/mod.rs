//! Compute module - the evolutionary engine.

pub mod evolution;

pub use evolution::{Archive, Evaluator, EvolutionEngine, EvolutionResult, GenomeRng};
