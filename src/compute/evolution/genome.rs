//! Genome manipulation utilities for evolutionary search.
//!
//! Provides random generation, bounded-blend crossover, and per-gene mutation.
//! Every draw goes through one seeded [`GenomeRng`], so a run is reproducible
//! from its seed.

use rand::prelude::*;

use crate::schema::{BlendAlpha, Gene, GeneDomain, GeneGroup, Genome, SearchSpace};

/// Random number generator wrapper for genome operations.
#[derive(Debug, Clone)]
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform index in `0..len`. `len` must be positive.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Uniform roll in `0..100`.
    pub fn percent(&mut self) -> u32 {
        self.rng.gen_range(0..100)
    }

    /// Whether an event with `chance` percent happens.
    pub fn chance(&mut self, chance: u32) -> bool {
        self.percent() < chance
    }

    /// Uniform sample from a gene domain.
    pub fn sample(&mut self, domain: &GeneDomain) -> Gene {
        match domain {
            GeneDomain::Integer { min, max } => Gene::Integer(self.rng.gen_range(*min..=*max)),
            GeneDomain::Real { min, max } => {
                Gene::Real(self.uniform(f64::from(*min), f64::from(*max)) as f32)
            }
            GeneDomain::Categorical { values } => Gene::Category(self.index(values.len())),
        }
    }

    /// Generate a random genome within the search space.
    pub fn random_genome(&mut self, space: &SearchSpace) -> Genome {
        Genome::new(
            space
                .genes()
                .iter()
                .map(|spec| self.sample(&spec.domain))
                .collect(),
        )
    }

    /// Uniform random in inclusive bounds.
    ///
    /// Drawn in `f64` so that any pair of `f32` bounds, widened by any finite
    /// alpha, has a representable width.
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.rng.gen_range(min..=max)
    }

    /// Resolve the blend alpha for one crossover call.
    fn alpha(&mut self, policy: BlendAlpha) -> f32 {
        match policy {
            BlendAlpha::Resampled => self.uniform(0.0, 1.0) as f32,
            BlendAlpha::Fixed(alpha) => alpha,
        }
    }

    /// Perform a two-stage BLX-alpha crossover.
    ///
    /// The first stage swaps the equipment group: the first child keeps the
    /// body of `parent1` and the equipment of `parent2`, the second child the
    /// inverse. The second stage blends every numeric gene, except genes whose
    /// categorical dependency differs between the parents; those stay with
    /// their group's source parent.
    pub fn crossover(
        &mut self,
        space: &SearchSpace,
        parent1: &Genome,
        parent2: &Genome,
        alpha: BlendAlpha,
    ) -> [Genome; 2] {
        let alpha = self.alpha(alpha);

        let mut first = Vec::with_capacity(space.len());
        let mut second = Vec::with_capacity(space.len());
        for (spec, (g1, g2)) in space
            .genes()
            .iter()
            .zip(parent1.genes.iter().zip(&parent2.genes))
        {
            match spec.group {
                GeneGroup::Body => {
                    first.push(*g1);
                    second.push(*g2);
                }
                GeneGroup::Equipment => {
                    first.push(*g2);
                    second.push(*g1);
                }
            }
        }

        for (index, spec) in space.genes().iter().enumerate() {
            if let Some(dependency) = space.dependency_of(index)
                && parent1.category(dependency) != parent2.category(dependency)
            {
                continue;
            }
            // Categorical genes carry no numeric value and are never blended.
            let (Some(v1), Some(v2)) = (parent1.value(index), parent2.value(index)) else {
                continue;
            };
            let (c1, c2) = self.blend(v1, v2, alpha);
            if let (Some(a), Some(b)) = (spec.domain.clamp(c1), spec.domain.clamp(c2)) {
                first[index] = a;
                second[index] = b;
            }
        }

        [Genome::new(first), Genome::new(second)]
    }

    /// Sample two values independently from `[min - alpha, max + alpha]`.
    ///
    /// Values beyond the `f32` range saturate to infinity and are clamped by
    /// the caller.
    fn blend(&mut self, v1: f32, v2: f32, alpha: f32) -> (f32, f32) {
        let alpha = f64::from(alpha);
        let lo = f64::from(v1.min(v2)) - alpha;
        let hi = f64::from(v1.max(v2)) + alpha;
        (self.uniform(lo, hi) as f32, self.uniform(lo, hi) as f32)
    }

    /// Reproduce a new genome by mutating a parent.
    ///
    /// Every gene is rolled independently; a gene whose roll falls below
    /// `chance` is replaced with a fresh sample from its domain.
    pub fn mutate(&mut self, space: &SearchSpace, parent: &Genome, chance: u32) -> Genome {
        let mut genome = parent.clone();
        for (gene, spec) in genome.genes.iter_mut().zip(space.genes()) {
            if self.chance(chance) {
                *gene = self.sample(&spec.domain);
            }
        }
        genome
    }
}
