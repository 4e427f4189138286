//! Evolution configuration and population types for MAP-Elites enemy search.
//!
//! This module provides the serde-facing side of the engine: run parameters,
//! genomes, evaluated individuals, archive snapshots and the report written
//! once a run has finished.

use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Gene, SearchSpace, SearchSpaceError};

/// Top-level configuration for a MAP-Elites run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Random seed; identical seeds and configs reproduce identical runs.
    #[serde(default)]
    pub seed: u64,
    /// Number of generations after initialization.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Occupied cells required before the generations start.
    #[serde(default = "default_initial_population")]
    pub initial_population: usize,
    /// Per-gene mutation chance (0-100).
    #[serde(default = "default_mutation_chance")]
    pub mutation_chance: u32,
    /// Chance of applying crossover instead of mutation (0-100).
    #[serde(default = "default_crossover_chance")]
    pub crossover_chance: u32,
    /// Tournament size.
    #[serde(default = "default_competitors")]
    pub competitors: usize,
    /// Blend-alpha policy for crossover.
    #[serde(default)]
    pub blend_alpha: BlendAlpha,
    /// Upper bound on random genomes drawn while filling the initial archive.
    #[serde(default = "default_max_initial_attempts")]
    pub max_initial_attempts: usize,
    /// Gene domains.
    #[serde(default = "crate::enemy::enemy_search_space")]
    pub search_space: SearchSpace,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            generations: default_generations(),
            initial_population: default_initial_population(),
            mutation_chance: default_mutation_chance(),
            crossover_chance: default_crossover_chance(),
            competitors: default_competitors(),
            blend_alpha: BlendAlpha::default(),
            max_initial_attempts: default_max_initial_attempts(),
            search_space: crate::enemy::enemy_search_space(),
        }
    }
}

fn default_generations() -> usize {
    200
}
fn default_initial_population() -> usize {
    25
}
fn default_mutation_chance() -> u32 {
    30
}
fn default_crossover_chance() -> u32 {
    80
}
fn default_competitors() -> usize {
    3
}
fn default_max_initial_attempts() -> usize {
    100_000
}

/// Blend-alpha policy for bounded-blend crossover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "value")]
pub enum BlendAlpha {
    /// Draw alpha uniformly from `[0, 1]` once per crossover call.
    #[default]
    Resampled,
    /// Use a constant alpha.
    Fixed(f32),
}

/// Direction of the fitness comparison, fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Objective {
    /// Lower fitness is better (distance to a goal).
    #[default]
    Minimize,
    /// Higher fitness is better.
    Maximize,
}

impl Objective {
    /// Whether `candidate` strictly beats `incumbent`.
    pub fn is_better(self, candidate: f32, incumbent: f32) -> bool {
        match self {
            Objective::Minimize => candidate < incumbent,
            Objective::Maximize => candidate > incumbent,
        }
    }

    /// Order two fitness values so that the better one compares greater.
    pub fn compare(self, a: f32, b: f32) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            Objective::Minimize => ord.reverse(),
            Objective::Maximize => ord,
        }
    }
}

// ============================================================================
// Genome Representation
// ============================================================================

/// Ordered gene values aligned with a [`SearchSpace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    pub genes: Vec<Gene>,
}

impl Genome {
    /// Wrap gene values.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Gene at `index`.
    pub fn gene(&self, index: usize) -> Option<&Gene> {
        self.genes.get(index)
    }

    /// Numeric value of the gene at `index`.
    pub fn value(&self, index: usize) -> Option<f32> {
        self.genes.get(index).and_then(Gene::as_f32)
    }

    /// Category index of the gene at `index`.
    pub fn category(&self, index: usize) -> Option<usize> {
        self.genes.get(index).and_then(Gene::as_category)
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Check if the genome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether every gene lies inside its declared domain.
    pub fn is_within(&self, space: &SearchSpace) -> bool {
        self.genes.len() == space.len()
            && self
                .genes
                .iter()
                .zip(space.genes())
                .all(|(gene, spec)| spec.domain.contains(gene))
    }
}

/// Cell coordinate in the archive grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coordinate(pub Vec<usize>);

impl Coordinate {
    /// Build a coordinate from cell indices.
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    /// Cell indices, one per archive dimension.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((a, b): (usize, usize)) -> Self {
        Self(vec![a, b])
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, ")")
    }
}

/// An evaluated candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// The genome.
    pub genome: Genome,
    /// Fitness score, compared under the evaluator's [`Objective`].
    pub fitness: f32,
    /// Archive cell, or `None` when the evaluator could not classify it.
    pub coordinate: Option<Coordinate>,
    /// Generation created (0 for the initial population).
    pub generation: usize,
}

// ============================================================================
// Snapshots and Reports
// ============================================================================

/// Copy of every archive cell, empty ones included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveSnapshot {
    /// Cells per dimension.
    pub shape: Vec<usize>,
    /// Row-major cells.
    pub cells: Vec<Option<Individual>>,
}

impl ArchiveSnapshot {
    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Check if no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Occupant at a flat row-major offset.
    pub fn cell(&self, offset: usize) -> Option<&Individual> {
        self.cells.get(offset).and_then(Option::as_ref)
    }

    /// Occupied individuals in row-major order.
    pub fn elites(&self) -> impl Iterator<Item = &Individual> {
        self.cells.iter().flatten()
    }
}

/// Progress update emitted after initialization and every generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Generations completed so far.
    pub generation: usize,
    /// Total generations planned.
    pub total_generations: usize,
    /// Occupied cells.
    pub coverage: usize,
    /// Total cells.
    pub capacity: usize,
    /// Best elite fitness, if any cell is occupied.
    pub best_fitness: Option<f32>,
    /// Current phase.
    pub phase: EvolutionPhase,
}

/// Phase of the evolution state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Filling the archive with random genomes.
    #[default]
    Initializing,
    /// Running generations.
    Evolving,
    /// Final snapshot taken.
    Complete,
}

/// Counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations run.
    pub generations: usize,
    /// Individuals evaluated (initialization included).
    pub evaluations: u64,
    /// Generations that applied crossover.
    pub crossovers: usize,
    /// Generations that applied mutation.
    pub mutations: usize,
    /// Placements into empty cells.
    pub insertions: u64,
    /// Placements that replaced an elite.
    pub replacements: u64,
    /// Offspring that lost against the current elite.
    pub rejections: u64,
    /// Individuals dropped for lack of a coordinate.
    pub unclassified: u64,
}

/// Serializable record of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Parameters the run used.
    pub config: EvolutionConfig,
    /// Wall-clock duration in seconds.
    pub duration: f64,
    /// Archive after initialization.
    pub initial: ArchiveSnapshot,
    /// Archive at the midpoint generation.
    pub intermediate: ArchiveSnapshot,
    /// Archive after the last generation.
    pub solution: ArchiveSnapshot,
    /// Run counters.
    pub stats: EvolutionStats,
}

impl RunReport {
    /// Write the report as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    /// Load a report written by [`RunReport::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Evolution configuration validation errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EvolutionConfigError {
    #[error("Mutation chance must be within 0-100, got {0}")]
    InvalidMutationChance(u32),
    #[error("Crossover chance must be within 0-100, got {0}")]
    InvalidCrossoverChance(u32),
    #[error("Tournament needs more than one competitor, got {0}")]
    TooFewCompetitors(usize),
    #[error(
        "Initial population {population} is too small for a crossover tournament of {competitors}"
    )]
    PopulationTooSmall {
        population: usize,
        competitors: usize,
    },
    #[error("Blend alpha must be finite and non-negative, got {0}")]
    InvalidAlpha(f32),
    #[error("Search space validation failed: {0}")]
    SearchSpace(#[from] SearchSpaceError),
}

/// Parents drawn for one crossover.
pub const CROSSOVER_PARENTS: usize = 2;
/// Parents drawn for one mutation.
pub const MUTATION_PARENTS: usize = 1;

impl EvolutionConfig {
    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        self.search_space.validate()?;

        if self.mutation_chance > 100 {
            return Err(EvolutionConfigError::InvalidMutationChance(
                self.mutation_chance,
            ));
        }
        if self.crossover_chance > 100 {
            return Err(EvolutionConfigError::InvalidCrossoverChance(
                self.crossover_chance,
            ));
        }
        if self.competitors < 2 {
            return Err(EvolutionConfigError::TooFewCompetitors(self.competitors));
        }
        // The first crossover must find more elites than parents plus competitors.
        if self.initial_population <= CROSSOVER_PARENTS + self.competitors {
            return Err(EvolutionConfigError::PopulationTooSmall {
                population: self.initial_population,
                competitors: self.competitors,
            });
        }
        if let BlendAlpha::Fixed(alpha) = self.blend_alpha
            && (!alpha.is_finite() || alpha < 0.0)
        {
            return Err(EvolutionConfigError::InvalidAlpha(alpha));
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
    }

    #[test]
    fn test_chance_bounds() {
        let config = EvolutionConfig {
            mutation_chance: 101,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(EvolutionConfigError::InvalidMutationChance(101))
        );
    }

    #[test]
    fn test_population_must_fit_tournament() {
        let config = EvolutionConfig {
            initial_population: 5,
            competitors: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EvolutionConfigError::PopulationTooSmall { .. })
        ));
    }

    #[test]
    fn test_negative_alpha() {
        let config = EvolutionConfig {
            blend_alpha: BlendAlpha::Fixed(-0.5),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(EvolutionConfigError::InvalidAlpha(-0.5))
        );
    }

    #[test]
    fn test_objective_comparison() {
        assert!(Objective::Minimize.is_better(0.5, 1.0));
        assert!(!Objective::Minimize.is_better(1.0, 1.0));
        assert!(Objective::Maximize.is_better(1.0, 0.5));
        assert_eq!(Objective::Minimize.compare(0.1, 0.2), Ordering::Greater);
    }

    #[test]
    fn test_serialization() {
        let config = EvolutionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EvolutionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.initial_population, config.initial_population);
        assert_eq!(parsed.search_space, config.search_space);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: EvolutionConfig =
            serde_json::from_str(r#"{ "seed": 7, "generations": 10 }"#).unwrap();
        assert_eq!(parsed.seed, 7);
        assert_eq!(parsed.generations, 10);
        assert_eq!(parsed.competitors, 3);
        assert_eq!(parsed.blend_alpha, BlendAlpha::Resampled);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_report_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let snapshot = ArchiveSnapshot {
            shape: vec![1, 2],
            cells: vec![
                None,
                Some(Individual {
                    genome: Genome::new(vec![Gene::Integer(3), Gene::Category(1)]),
                    fitness: 0.25,
                    coordinate: Some(Coordinate::from((0, 1))),
                    generation: 4,
                }),
            ],
        };
        let report = RunReport {
            config: EvolutionConfig::default(),
            duration: 1.5,
            initial: snapshot.clone(),
            intermediate: snapshot.clone(),
            solution: snapshot,
            stats: EvolutionStats::default(),
        };

        report.save(&path).unwrap();
        let loaded = RunReport::load(&path).unwrap();
        assert_eq!(loaded.solution, report.solution);
        assert_eq!(loaded.solution.len(), 1);
        assert_eq!(loaded.duration, 1.5);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "not json").unwrap();

        let err = RunReport::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_coordinate_display() {
        assert_eq!(Coordinate::from((2, 4)).to_string(), "(2, 4)");
    }
}
