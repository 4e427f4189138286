//! Difficulty-based evaluator for the enemy search space.

use serde::{Deserialize, Serialize};

use crate::compute::evolution::Evaluator;
use crate::schema::{Coordinate, GeneDomain, Genome, Objective, SearchSpace};

use super::{MovementType, WeaponType, genes};

/// Default difficulty buckets, one archive row each.
pub const DIFFICULTY_BUCKETS: [(f32, f32); 5] = [
    (8.0, 12.0),
    (12.0, 16.0),
    (16.0, 20.0),
    (20.0, 24.0),
    (24.0, 28.0),
];

/// A decoded enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub health: i64,
    pub strength: i64,
    pub attack_speed: f32,
    pub movement_type: MovementType,
    pub movement_speed: f32,
    pub active_time: f32,
    pub rest_time: f32,
    pub weapon_type: WeaponType,
    pub projectile_speed: f32,
}

impl Enemy {
    /// Overall difficulty: `(health + strength + movement) * gameplay`.
    pub fn difficulty(&self) -> f32 {
        (self.health_factor() + self.strength_factor() + self.movement_factor())
            * self.gameplay_factor()
    }

    fn health_factor(&self) -> f32 {
        self.health as f32 * 2.0
    }

    fn movement_factor(&self) -> f32 {
        // Active and rest times shape how the enemy moves, not how it fights.
        self.movement_speed + self.active_time / 3.0 + 1.0 / self.rest_time
    }

    fn strength_factor(&self) -> f32 {
        let weapon = self.weapon_type;
        let mut factor = self.strength as f32 * weapon.multiplier();
        if weapon.is_melee() {
            factor *= self.movement_speed;
        }
        if weapon.is_ranged() {
            factor *= self.attack_speed * self.projectile_speed * 0.5;
        }
        if weapon == WeaponType::CureSpell {
            factor *= self.attack_speed;
        }
        factor
    }

    /// Gameplay weights chosen empirically on the game prototype.
    fn gameplay_factor(&self) -> f32 {
        let weapon = self.weapon_type;
        let movement = self.movement_type;
        let mut factor = 1.0;

        // Melee enemies are only a threat when they chase the player.
        if weapon.is_melee() && movement != MovementType::Follow {
            factor = 0.0;
        }
        if weapon.is_ranged() {
            factor *= match movement {
                MovementType::None => 0.5,
                MovementType::Flee1D => 1.25,
                MovementType::Flee => 1.5,
                // Shooters outrunning their own projectiles lose their edge.
                MovementType::Follow => 0.5 / self.movement_speed,
                _ => 1.0,
            };
        }
        if weapon == WeaponType::CureSpell {
            if movement.is_evasive() {
                factor *= 1.15;
            }
            factor *= self.movement_speed * 1.15;
        }
        factor
    }
}

/// Gene positions resolved once against a search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EnemyLayout {
    health: usize,
    strength: usize,
    attack_speed: usize,
    movement_type: usize,
    movement_speed: usize,
    active_time: usize,
    rest_time: usize,
    weapon_type: usize,
    projectile_speed: usize,
}

impl EnemyLayout {
    fn resolve(space: &SearchSpace) -> Result<Self, EvaluatorError> {
        let movements: Vec<&str> = MovementType::ALL.iter().map(|m| m.name()).collect();
        let weapons: Vec<&str> = WeaponType::ALL.iter().map(|w| w.name()).collect();

        Ok(Self {
            health: numeric(space, genes::HEALTH)?,
            strength: numeric(space, genes::STRENGTH)?,
            attack_speed: numeric(space, genes::ATTACK_SPEED)?,
            movement_type: categorical(space, genes::MOVEMENT_TYPE, &movements)?,
            movement_speed: numeric(space, genes::MOVEMENT_SPEED)?,
            active_time: numeric(space, genes::ACTIVE_TIME)?,
            rest_time: positive(space, genes::REST_TIME)?,
            weapon_type: categorical(space, genes::WEAPON_TYPE, &weapons)?,
            projectile_speed: numeric(space, genes::PROJECTILE_SPEED)?,
        })
    }

    fn decode(&self, genome: &Genome) -> Option<Enemy> {
        let integer = |index| genome.value(index).map(|v| v.round() as i64);

        Some(Enemy {
            health: integer(self.health)?,
            strength: integer(self.strength)?,
            attack_speed: genome.value(self.attack_speed)?,
            movement_type: *MovementType::ALL.get(genome.category(self.movement_type)?)?,
            movement_speed: genome.value(self.movement_speed)?,
            active_time: genome.value(self.active_time)?,
            rest_time: genome.value(self.rest_time)?,
            weapon_type: *WeaponType::ALL.get(genome.category(self.weapon_type)?)?,
            projectile_speed: genome.value(self.projectile_speed)?,
        })
    }
}

fn find(space: &SearchSpace, name: &str) -> Result<usize, EvaluatorError> {
    space
        .index_of(name)
        .ok_or_else(|| EvaluatorError::MissingGene(name.to_string()))
}

fn numeric(space: &SearchSpace, name: &str) -> Result<usize, EvaluatorError> {
    let index = find(space, name)?;
    if space.genes()[index].domain.is_numeric() {
        Ok(index)
    } else {
        Err(EvaluatorError::MismatchedDomain(name.to_string()))
    }
}

/// Numeric gene whose lower bound keeps `1 / value` finite.
fn positive(space: &SearchSpace, name: &str) -> Result<usize, EvaluatorError> {
    let index = numeric(space, name)?;
    let min = match space.genes()[index].domain {
        GeneDomain::Integer { min, .. } => min as f32,
        GeneDomain::Real { min, .. } => min,
        GeneDomain::Categorical { .. } => 0.0,
    };
    if min > 0.0 {
        Ok(index)
    } else {
        Err(EvaluatorError::MismatchedDomain(name.to_string()))
    }
}

fn categorical(
    space: &SearchSpace,
    name: &str,
    expected: &[&str],
) -> Result<usize, EvaluatorError> {
    let index = find(space, name)?;
    match &space.genes()[index].domain {
        GeneDomain::Categorical { values }
            if values.len() == expected.len()
                && values.iter().zip(expected).all(|(v, e)| v.as_str() == *e) =>
        {
            Ok(index)
        }
        _ => Err(EvaluatorError::MismatchedDomain(name.to_string())),
    }
}

/// Evaluator construction errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EvaluatorError {
    #[error("Search space has no gene named {0}")]
    MissingGene(String),
    #[error("Gene {0} does not have the domain the difficulty formula expects")]
    MismatchedDomain(String),
    #[error("Difficulty buckets must be non-empty, finite and non-overlapping")]
    InvalidBuckets,
}

/// Scores enemies by how close their difficulty sits to their bucket's centre.
///
/// Classification maps an enemy to `(difficulty bucket, weapon type)`; enemies
/// whose difficulty falls outside every bucket are unclassified. Lower fitness
/// is better.
#[derive(Debug, Clone)]
pub struct DifficultyEvaluator {
    layout: EnemyLayout,
    buckets: Vec<(f32, f32)>,
}

impl DifficultyEvaluator {
    /// Create an evaluator for `space` with the default buckets.
    pub fn new(space: &SearchSpace) -> Result<Self, EvaluatorError> {
        Ok(Self {
            layout: EnemyLayout::resolve(space)?,
            buckets: DIFFICULTY_BUCKETS.to_vec(),
        })
    }

    /// Replace the difficulty buckets (half-open `[min, max)` ranges, ascending).
    pub fn with_buckets(mut self, buckets: Vec<(f32, f32)>) -> Result<Self, EvaluatorError> {
        let well_formed = !buckets.is_empty()
            && buckets
                .iter()
                .all(|(min, max)| min.is_finite() && max.is_finite() && min < max)
            && buckets.windows(2).all(|w| w[0].1 <= w[1].0);
        if !well_formed {
            return Err(EvaluatorError::InvalidBuckets);
        }
        self.buckets = buckets;
        Ok(self)
    }

    /// Difficulty buckets.
    pub fn buckets(&self) -> &[(f32, f32)] {
        &self.buckets
    }

    /// Decode a genome into an enemy.
    pub fn decode(&self, genome: &Genome) -> Option<Enemy> {
        self.layout.decode(genome)
    }

    /// Bucket index containing `difficulty`.
    pub fn bucket(&self, difficulty: f32) -> Option<usize> {
        self.buckets
            .iter()
            .position(|(min, max)| difficulty >= *min && difficulty < *max)
    }

    /// Distance from `difficulty` to the closest bucket centre.
    fn distance_to_goal(&self, difficulty: f32) -> f32 {
        let goal = |(min, max): &(f32, f32)| (min + max) / 2.0;
        match self.bucket(difficulty) {
            Some(index) => (goal(&self.buckets[index]) - difficulty).abs(),
            None => self
                .buckets
                .iter()
                .map(|b| (goal(b) - difficulty).abs())
                .fold(f32::INFINITY, f32::min),
        }
    }
}

impl Evaluator for DifficultyEvaluator {
    fn shape(&self) -> Vec<usize> {
        vec![self.buckets.len(), WeaponType::ALL.len()]
    }

    fn classify(&self, genome: &Genome) -> Option<Coordinate> {
        let enemy = self.decode(genome)?;
        let bucket = self.bucket(enemy.difficulty())?;
        let weapon = genome.category(self.layout.weapon_type)?;
        Some(Coordinate::from((bucket, weapon)))
    }

    fn score(&self, genome: &Genome) -> f32 {
        self.decode(genome)
            .map(|enemy| self.distance_to_goal(enemy.difficulty()))
            .unwrap_or(f32::INFINITY)
    }

    fn objective(&self) -> Objective {
        Objective::Minimize
    }
}
