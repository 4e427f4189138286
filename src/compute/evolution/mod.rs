//! MAP-Elites evolutionary search over a feature-indexed archive.
//!
//! # Overview
//!
//! The evolutionary search system consists of:
//!
//! - **Evaluator** (`fitness`): Pluggable classification and scoring
//! - **Archive** (`archive`): One elite per feature coordinate
//! - **Selection** (`selection`): Tournament selection over occupied cells
//! - **Genome Operations** (`genome`): Random generation, crossover, and mutation
//! - **Search Loop** (`search`): Initialization, generations, snapshots
//!
//! # Example
//!
//! ```rust,no_run
//! use enemy_generator::compute::evolution::run;
//! use enemy_generator::enemy::{DifficultyEvaluator, enemy_search_space};
//! use enemy_generator::schema::EvolutionConfig;
//!
//! let config = EvolutionConfig {
//!     seed: 42,
//!     generations: 100,
//!     ..Default::default()
//! };
//! let evaluator = DifficultyEvaluator::new(&enemy_search_space()).unwrap();
//!
//! let result = run(config, evaluator).unwrap();
//! println!("Cells filled: {}/{}", result.archive.len(), result.archive.capacity());
//! ```

mod archive;
mod fitness;
mod genome;
mod search;
mod selection;

pub use archive::{Archive, ArchiveError, Placement};
pub use fitness::Evaluator;
pub use genome::GenomeRng;
pub use search::{EvolutionEngine, EvolutionError, EvolutionResult, run};
pub use selection::{SelectionError, select};
