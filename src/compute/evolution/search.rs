//! MAP-Elites driver loop.

use std::time::{Duration, Instant};

use crate::schema::{
    ArchiveSnapshot, CROSSOVER_PARENTS, EvolutionConfig, EvolutionConfigError, EvolutionPhase,
    EvolutionProgress, EvolutionStats, Genome, MUTATION_PARENTS, RunReport,
};

use super::archive::{Archive, ArchiveError, Placement};
use super::fitness::Evaluator;
use super::genome::GenomeRng;
use super::selection::{SelectionError, select};

/// Errors that abort a run.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EvolutionError {
    #[error("Invalid evolution config: {0}")]
    Config(#[from] EvolutionConfigError),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Selection failed: {0}")]
    Selection(#[from] SelectionError),
    #[error("Initial population {population} exceeds archive capacity {capacity}")]
    ShapeTooSmall { population: usize, capacity: usize },
    #[error("Only {filled} of {population} initial cells filled after {attempts} random genomes")]
    InitializationExhausted {
        filled: usize,
        population: usize,
        attempts: usize,
    },
}

/// Final result of a run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// The archive after the last generation.
    pub archive: Archive,
    /// Archive after initialization.
    pub initial: ArchiveSnapshot,
    /// Archive after the generation indexed `generations / 2`.
    pub intermediate: ArchiveSnapshot,
    /// Archive after the last generation.
    pub solution: ArchiveSnapshot,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Run counters.
    pub stats: EvolutionStats,
}

impl EvolutionResult {
    /// Serializable report of this run.
    pub fn to_report(&self, config: &EvolutionConfig) -> RunReport {
        RunReport {
            config: config.clone(),
            duration: self.elapsed.as_secs_f64(),
            initial: self.initial.clone(),
            intermediate: self.intermediate.clone(),
            solution: self.solution.clone(),
            stats: self.stats.clone(),
        }
    }
}

/// Evolution engine that runs MAP-Elites.
///
/// The engine owns the archive and the random stream; nothing else advances
/// either, so a seed and a config fully determine the run.
pub struct EvolutionEngine<E> {
    config: EvolutionConfig,
    evaluator: E,
    rng: GenomeRng,
    archive: Archive,
    stats: EvolutionStats,
    generation: usize,
}

impl<E: Evaluator> EvolutionEngine<E> {
    /// Create a new evolution engine.
    pub fn new(config: EvolutionConfig, evaluator: E) -> Result<Self, EvolutionError> {
        config.validate()?;

        let archive = Archive::new(evaluator.shape(), evaluator.objective())?;
        if config.initial_population > archive.capacity() {
            return Err(EvolutionError::ShapeTooSmall {
                population: config.initial_population,
                capacity: archive.capacity(),
            });
        }

        Ok(Self {
            rng: GenomeRng::new(config.seed),
            config,
            evaluator,
            archive,
            stats: EvolutionStats::default(),
            generation: 0,
        })
    }

    /// Fill the archive with random genomes until it holds the initial population.
    fn initialize(&mut self) -> Result<(), EvolutionError> {
        let target = self.config.initial_population;
        let mut attempts = 0;

        while self.archive.len() < target {
            if attempts == self.config.max_initial_attempts {
                return Err(EvolutionError::InitializationExhausted {
                    filled: self.archive.len(),
                    population: target,
                    attempts,
                });
            }
            attempts += 1;

            let genome = self.rng.random_genome(&self.config.search_space);
            self.evaluate_and_place(genome, 0)?;
        }

        log::debug!(
            "Initial archive filled: {} elites after {} random genomes",
            self.archive.len(),
            attempts
        );
        Ok(())
    }

    /// Run a single generation step.
    fn step_generation(&mut self) -> Result<(), EvolutionError> {
        let generation = self.generation + 1;
        let competitors = self.config.competitors;

        if self.rng.chance(self.config.crossover_chance) {
            let parents = select(
                &self.archive,
                CROSSOVER_PARENTS,
                competitors,
                &mut self.rng,
            )?;
            let children = self.rng.crossover(
                &self.config.search_space,
                &parents[0].genome,
                &parents[1].genome,
                self.config.blend_alpha,
            );
            self.stats.crossovers += 1;
            for child in children {
                self.evaluate_and_place(child, generation)?;
            }
        } else {
            let parents = select(&self.archive, MUTATION_PARENTS, competitors, &mut self.rng)?;
            let child = self.rng.mutate(
                &self.config.search_space,
                &parents[0].genome,
                self.config.mutation_chance,
            );
            self.stats.mutations += 1;
            self.evaluate_and_place(child, generation)?;
        }

        self.generation = generation;
        self.stats.generations = generation;
        Ok(())
    }

    /// Evaluate a genome and offer it to the archive.
    fn evaluate_and_place(
        &mut self,
        genome: Genome,
        generation: usize,
    ) -> Result<Placement, EvolutionError> {
        let individual = self.evaluator.evaluate(genome, generation);
        self.stats.evaluations += 1;

        let placement = self.archive.place(individual)?;
        match placement {
            Placement::Inserted => self.stats.insertions += 1,
            Placement::Replaced => self.stats.replacements += 1,
            Placement::Rejected => self.stats.rejections += 1,
            Placement::Unclassified => self.stats.unclassified += 1,
        }
        log::trace!("generation {generation}: {placement:?}");
        Ok(placement)
    }

    /// Get current progress.
    pub fn progress(&self, phase: EvolutionPhase) -> EvolutionProgress {
        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.generations,
            coverage: self.archive.len(),
            capacity: self.archive.capacity(),
            best_fitness: self.archive.best().map(|c| c.fitness),
            phase,
        }
    }

    /// Run evolution with progress callback.
    ///
    /// The callback fires once after initialization and once per generation.
    pub fn run_with_callback<F>(mut self, callback: F) -> Result<EvolutionResult, EvolutionError>
    where
        F: Fn(&EvolutionProgress),
    {
        let start_time = Instant::now();

        self.initialize()?;
        let initial = self.archive.snapshot();
        callback(&self.progress(EvolutionPhase::Initializing));

        let midpoint = self.config.generations / 2;
        let mut intermediate = None;
        for g in 0..self.config.generations {
            self.step_generation()?;
            if g == midpoint {
                log::debug!(
                    "Intermediate snapshot at generation {}: {} elites",
                    g,
                    self.archive.len()
                );
                intermediate = Some(self.archive.snapshot());
            }
            callback(&self.progress(EvolutionPhase::Evolving));
        }

        let solution = self.archive.snapshot();
        let elapsed = start_time.elapsed();
        callback(&self.progress(EvolutionPhase::Complete));

        log::info!(
            "Evolution finished: {} generations, {}/{} cells filled, {:.3}s",
            self.generation,
            self.archive.len(),
            self.archive.capacity(),
            elapsed.as_secs_f64()
        );

        Ok(EvolutionResult {
            intermediate: intermediate.unwrap_or_else(|| initial.clone()),
            initial,
            solution,
            archive: self.archive,
            elapsed,
            stats: self.stats,
        })
    }

    /// Run evolution (blocking).
    pub fn run(self) -> Result<EvolutionResult, EvolutionError> {
        self.run_with_callback(|_| {})
    }
}

/// Run MAP-Elites with `config`, scoring through `evaluator`.
pub fn run<E: Evaluator>(
    config: EvolutionConfig,
    evaluator: E,
) -> Result<EvolutionResult, EvolutionError> {
    EvolutionEngine::new(config, evaluator)?.run()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::enemy::{DifficultyEvaluator, enemy_search_space};
    use crate::schema::{Coordinate, Objective};

    fn scenario_config() -> EvolutionConfig {
        EvolutionConfig {
            seed: 0,
            generations: 50,
            initial_population: 10,
            mutation_chance: 30,
            crossover_chance: 70,
            ..Default::default()
        }
    }

    fn evaluator() -> DifficultyEvaluator {
        DifficultyEvaluator::new(&enemy_search_space()).unwrap()
    }

    #[test]
    fn test_evolution_run() {
        let result = run(scenario_config(), evaluator()).unwrap();

        assert_eq!(result.archive.shape(), &[5, 6]);
        assert_eq!(result.initial.len(), 10);
        assert_eq!(result.stats.generations, 50);
        assert_eq!(result.stats.crossovers + result.stats.mutations, 50);
        assert_eq!(result.solution, result.archive.snapshot());
        assert!(result.solution.len() >= result.initial.len());
    }

    #[test]
    fn test_snapshots_never_regress() {
        let result = run(scenario_config(), evaluator()).unwrap();
        let checkpoints = [&result.initial, &result.intermediate, &result.solution];

        for pair in checkpoints.windows(2) {
            for (before, after) in pair[0].cells.iter().zip(&pair[1].cells) {
                if let Some(before) = before {
                    let after = after.as_ref().expect("occupied cells stay occupied");
                    assert!(after.fitness <= before.fitness);
                }
            }
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = run(scenario_config(), evaluator()).unwrap();
        let b = run(scenario_config(), evaluator()).unwrap();

        assert_eq!(
            serde_json::to_string(&a.solution).unwrap(),
            serde_json::to_string(&b.solution).unwrap()
        );
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_elites_match_their_cells() {
        let evaluator = evaluator();
        let result = run(scenario_config(), &evaluator).unwrap();

        for coordinate in result.archive.elite_coordinates() {
            let elite = result.archive.get(&coordinate).unwrap();
            assert_eq!(evaluator.classify(&elite.genome), Some(coordinate.clone()));
            assert_eq!(elite.coordinate, Some(coordinate));
            assert!(elite.genome.is_within(&enemy_search_space()));
        }
    }

    #[test]
    fn test_offspring_generation_numbers() {
        let result = run(scenario_config(), evaluator()).unwrap();
        assert!(result.initial.elites().all(|c| c.generation == 0));
        assert!(result.solution.elites().all(|c| c.generation <= 50));
    }

    #[test]
    fn test_zero_generations() {
        let config = EvolutionConfig {
            generations: 0,
            ..scenario_config()
        };
        let result = run(config, evaluator()).unwrap();
        assert_eq!(result.initial, result.intermediate);
        assert_eq!(result.initial, result.solution);
    }

    #[test]
    fn test_progress_callback() {
        let calls = Cell::new(0);
        let engine = EvolutionEngine::new(scenario_config(), evaluator()).unwrap();
        engine
            .run_with_callback(|progress| {
                calls.set(calls.get() + 1);
                assert!(progress.coverage >= 10);
            })
            .unwrap();
        // Initialization, 50 generations, completion.
        assert_eq!(calls.get(), 52);
    }

    /// Places every genome in one of two cells.
    struct TinyEvaluator;

    impl Evaluator for TinyEvaluator {
        fn shape(&self) -> Vec<usize> {
            vec![2]
        }

        fn classify(&self, genome: &Genome) -> Option<Coordinate> {
            genome.category(7).map(|w| Coordinate::new([w % 2]))
        }

        fn score(&self, _genome: &Genome) -> f32 {
            0.0
        }

        fn objective(&self) -> Objective {
            Objective::Maximize
        }
    }

    #[test]
    fn test_population_larger_than_archive() {
        let err = EvolutionEngine::new(scenario_config(), TinyEvaluator).err();
        assert_eq!(
            err,
            Some(EvolutionError::ShapeTooSmall {
                population: 10,
                capacity: 2,
            })
        );
    }

    #[test]
    fn test_initialization_exhausted() {
        let config = EvolutionConfig {
            max_initial_attempts: 3,
            ..scenario_config()
        };
        let err = run(config, evaluator()).unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::InitializationExhausted { attempts: 3, .. }
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EvolutionConfig {
            competitors: 1,
            ..scenario_config()
        };
        assert!(matches!(
            EvolutionEngine::new(config, evaluator()).err(),
            Some(EvolutionError::Config(_))
        ));
    }

    #[test]
    fn test_report_roundtrip() {
        let config = scenario_config();
        let result = run(config.clone(), evaluator()).unwrap();
        let report = result.to_report(&config);

        let json = serde_json::to_string(&report).unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.solution, result.solution);
        assert_eq!(parsed.stats, result.stats);
    }
}
