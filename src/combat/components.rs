//! Combat-related components and events.

use bevy::prelude::*;

use crate::combo::SpecialMove;

/// Component for entities that can take damage.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            maximum: max,
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    pub fn restore(&mut self) {
        self.current = self.maximum;
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// Melee weapon stats.
#[derive(Component, Debug, Clone)]
pub struct Weapon {
    pub base_damage: f32,
    /// Attack range in units
    pub reach: f32,
    /// Attack cooldown in seconds
    pub attack_cooldown: f32,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            base_damage: 5.0,
            reach: 2.0,
            attack_cooldown: 0.5,
        }
    }
}

impl Weapon {
    /// Damage multiplier applied by a special move.
    pub fn special_multiplier(special: SpecialMove) -> f32 {
        match special {
            SpecialMove::Uppercut => 2.0,
            SpecialMove::Whirlwind => 1.5,
            SpecialMove::DashStrike => 1.75,
            SpecialMove::GroundPound => 2.5,
        }
    }
}

/// Combat state for a character.
#[derive(Component, Debug, Default)]
pub struct CombatState {
    /// Is currently in attack animation
    pub is_attacking: bool,
    /// Cooldown timer after attack
    pub attack_cooldown: f32,
}

impl CombatState {
    pub fn can_attack(&self) -> bool {
        !self.is_attacking && self.attack_cooldown <= 0.0
    }
}

/// Marker component for entities that have died (prevents multiple death events).
#[derive(Component, Debug)]
pub struct Dead;

/// Event for dealing damage to an entity.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    pub target: Entity,
    pub source: Entity,
    pub amount: f32,
}

/// Event sent when an entity dies.
#[derive(Event, Debug, Clone, Copy)]
pub struct DeathEvent {
    pub entity: Entity,
    pub killed_by: Option<Entity>,
}
