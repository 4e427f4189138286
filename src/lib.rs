//! Enemy Generator - MAP-Elites quality-diversity evolution of game enemies.
//!
//! Instead of converging to a single optimum, the generator keeps the best
//! enemy found for every combination of difficulty bucket and weapon type,
//! yielding a diverse spread of designs.
//!
//! # Architecture
//!
//! - `schema`: Configuration, search space, genomes and report types
//! - `compute`: The evolutionary engine (archive, selection, operators, loop)
//! - `enemy`: The reference enemy search space and difficulty evaluator
//!
//! # Example
//!
//! ```rust,no_run
//! use enemy_generator::{DifficultyEvaluator, EvolutionConfig, EvolutionEngine};
//!
//! let config = EvolutionConfig::default();
//! let evaluator = DifficultyEvaluator::new(&config.search_space).unwrap();
//!
//! let engine = EvolutionEngine::new(config, evaluator).unwrap();
//! let result = engine
//!     .run_with_callback(|progress| {
//!         println!("Generation {}: {} elites", progress.generation, progress.coverage);
//!     })
//!     .unwrap();
//!
//! println!("Elapsed: {:?}", result.elapsed);
//! ```

pub mod compute;
pub mod enemy;
pub mod schema;

// Re-export commonly used types
pub use compute::{Archive, Evaluator, EvolutionEngine, EvolutionResult};
pub use enemy::DifficultyEvaluator;
pub use schema::{EvolutionConfig, Genome, Individual, SearchSpace};
