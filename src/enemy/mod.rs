//! Enemy domain: the reference search space and evaluator.
//!
//! Enemies are made of a body (health, strength, attack speed, movement) and
//! a weapon (weapon type and projectile speed). The archive is indexed by
//! difficulty bucket x weapon type, and fitness is the distance between an
//! enemy's difficulty and the centre of its bucket.
//!
//! The difficulty formula was tuned for one game prototype and may not suit
//! other games; swap in another [`Evaluator`](crate::compute::evolution::Evaluator)
//! for those.

mod difficulty;

pub use difficulty::*;

use serde::{Deserialize, Serialize};

use crate::schema::{GeneGroup, GeneSpec, SearchSpace};

/// Movement patterns an enemy can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    /// Stays still.
    None,
    /// Random 2D movement.
    Random,
    /// Follows the player.
    Follow,
    /// Flees from the player.
    Flee,
    /// Random horizontal or vertical movement.
    Random1D,
    /// Follows the player horizontally or vertically.
    Follow1D,
    /// Flees from the player horizontally or vertically.
    Flee1D,
}

impl MovementType {
    /// All movement types, in gene-index order.
    pub const ALL: [MovementType; 7] = [
        MovementType::None,
        MovementType::Random,
        MovementType::Follow,
        MovementType::Flee,
        MovementType::Random1D,
        MovementType::Follow1D,
        MovementType::Flee1D,
    ];

    /// Stable name used in the search space.
    pub fn name(self) -> &'static str {
        match self {
            MovementType::None => "None",
            MovementType::Random => "Random",
            MovementType::Follow => "Follow",
            MovementType::Flee => "Flee",
            MovementType::Random1D => "Random1D",
            MovementType::Follow1D => "Follow1D",
            MovementType::Flee1D => "Flee1D",
        }
    }

    /// Movements that keep a healer away from the player.
    pub fn is_evasive(self) -> bool {
        matches!(
            self,
            MovementType::Random
                | MovementType::Flee
                | MovementType::Random1D
                | MovementType::Flee1D
        )
    }
}

/// Weapons an enemy can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    /// Melee, bare hands.
    Barehand,
    /// Melee, short sword.
    Sword,
    /// Ranged, shoots arrows.
    Bow,
    /// Ranged, throws bombs.
    BombThrower,
    /// Defensive shield.
    Shield,
    /// Heals itself.
    CureSpell,
}

impl WeaponType {
    /// All weapon types, in gene-index order.
    pub const ALL: [WeaponType; 6] = [
        WeaponType::Barehand,
        WeaponType::Sword,
        WeaponType::Bow,
        WeaponType::BombThrower,
        WeaponType::Shield,
        WeaponType::CureSpell,
    ];

    /// Stable name used in the search space.
    pub fn name(self) -> &'static str {
        match self {
            WeaponType::Barehand => "Barehand",
            WeaponType::Sword => "Sword",
            WeaponType::Bow => "Bow",
            WeaponType::BombThrower => "BombThrower",
            WeaponType::Shield => "Shield",
            WeaponType::CureSpell => "CureSpell",
        }
    }

    /// Weapons that hit by touching the player.
    pub fn is_melee(self) -> bool {
        matches!(self, WeaponType::Barehand | WeaponType::Sword)
    }

    /// Weapons that shoot projectiles.
    pub fn is_ranged(self) -> bool {
        matches!(self, WeaponType::Bow | WeaponType::BombThrower)
    }

    /// Strength multiplier.
    pub fn multiplier(self) -> f32 {
        match self {
            WeaponType::Barehand => 1.00,
            WeaponType::Sword => 1.15,
            WeaponType::Bow => 1.35,
            WeaponType::BombThrower => 1.25,
            WeaponType::Shield => 1.15,
            WeaponType::CureSpell => 1.35,
        }
    }
}

/// Gene names of the enemy search space.
pub mod genes {
    pub const HEALTH: &str = "health";
    pub const STRENGTH: &str = "strength";
    pub const ATTACK_SPEED: &str = "attack_speed";
    pub const MOVEMENT_TYPE: &str = "movement_type";
    pub const MOVEMENT_SPEED: &str = "movement_speed";
    pub const ACTIVE_TIME: &str = "active_time";
    pub const REST_TIME: &str = "rest_time";
    pub const WEAPON_TYPE: &str = "weapon_type";
    pub const PROJECTILE_SPEED: &str = "projectile_speed";
}

/// The enemy search space: seven body genes and two weapon genes.
pub fn enemy_search_space() -> SearchSpace {
    let movements: Vec<&str> = MovementType::ALL.iter().map(|m| m.name()).collect();
    let weapons: Vec<&str> = WeaponType::ALL.iter().map(|w| w.name()).collect();

    let genes = vec![
        GeneSpec::integer(genes::HEALTH, 1, 5),
        GeneSpec::integer(genes::STRENGTH, 1, 5),
        GeneSpec::real(genes::ATTACK_SPEED, 0.75, 4.0),
        GeneSpec::categorical(genes::MOVEMENT_TYPE, &movements),
        GeneSpec::real(genes::MOVEMENT_SPEED, 0.8, 3.2),
        GeneSpec::real(genes::ACTIVE_TIME, 1.5, 10.0),
        GeneSpec::real(genes::REST_TIME, 0.3, 1.5),
        GeneSpec::categorical(genes::WEAPON_TYPE, &weapons).in_group(GeneGroup::Equipment),
        GeneSpec::real(genes::PROJECTILE_SPEED, 1.0, 4.0)
            .in_group(GeneGroup::Equipment)
            .depends_on(genes::WEAPON_TYPE),
    ];

    // The table above is static and satisfies every search space rule.
    SearchSpace::new(genes).unwrap_or_else(|e| unreachable!("invalid enemy search space: {e}"))
}
