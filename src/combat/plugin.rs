//! Combat plugin - melee attacks, specials, and damage.

use bevy::prelude::*;

use super::systems;

/// Combat plugin - turns attack actions into damage.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        systems::setup_combat_systems(app);
    }
}
