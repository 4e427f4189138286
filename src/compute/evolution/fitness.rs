//! Evaluator interface for evolutionary enemy search.
//!
//! The engine has no knowledge of what makes a genome good: it asks an
//! [`Evaluator`] where a genome belongs in the archive and how well it fills
//! that cell.

use crate::schema::{Coordinate, Genome, Individual, Objective};

/// Pluggable classification and scoring strategy.
pub trait Evaluator {
    /// Cells per archive dimension, derived from the discrete feature domains.
    fn shape(&self) -> Vec<usize>;

    /// Archive cell for `genome`, or `None` when it falls outside every bucket.
    fn classify(&self, genome: &Genome) -> Option<Coordinate>;

    /// Fitness of `genome`.
    fn score(&self, genome: &Genome) -> f32;

    /// Comparison rule applied to fitness values for the whole run.
    fn objective(&self) -> Objective {
        Objective::Minimize
    }

    /// Classify and score a genome into an individual.
    fn evaluate(&self, genome: Genome, generation: usize) -> Individual {
        let coordinate = self.classify(&genome);
        let fitness = self.score(&genome);
        Individual {
            genome,
            fitness,
            coordinate,
            generation,
        }
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn shape(&self) -> Vec<usize> {
        (**self).shape()
    }

    fn classify(&self, genome: &Genome) -> Option<Coordinate> {
        (**self).classify(genome)
    }

    fn score(&self, genome: &Genome) -> f32 {
        (**self).score(genome)
    }

    fn objective(&self) -> Objective {
        (**self).objective()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Gene;

    struct SumEvaluator;

    impl Evaluator for SumEvaluator {
        fn shape(&self) -> Vec<usize> {
            vec![4]
        }

        fn classify(&self, genome: &Genome) -> Option<Coordinate> {
            let sum = self.score(genome);
            (sum < 4.0).then(|| Coordinate::new([sum as usize]))
        }

        fn score(&self, genome: &Genome) -> f32 {
            genome.genes.iter().filter_map(Gene::as_f32).sum()
        }
    }

    #[test]
    fn test_evaluate_fills_individual() {
        let genome = Genome::new(vec![Gene::Integer(1), Gene::Real(1.5)]);
        let individual = SumEvaluator.evaluate(genome.clone(), 3);

        assert_eq!(individual.genome, genome);
        assert_eq!(individual.fitness, 2.5);
        assert_eq!(individual.coordinate, Some(Coordinate::new([2])));
        assert_eq!(individual.generation, 3);
    }

    #[test]
    fn test_unknown_classification() {
        let genome = Genome::new(vec![Gene::Integer(9)]);
        let individual = (&SumEvaluator).evaluate(genome, 0);
        assert!(individual.coordinate.is_none());
        assert_eq!(SumEvaluator.objective(), Objective::Minimize);
    }
}
