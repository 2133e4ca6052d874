//! Brawler AI - autonomous fighters and combo input for a Bevy arena brawler.
//!
//! # Architecture
//!
//! The crate is organized into plugins, each handling one concern:
//!
//! - **Core**: Agent tuning, data loading, global events
//! - **Arena**: Teams, pickups, waypoints, checkpoint capture
//! - **Combat**: Attacks, cooldowns, damage
//! - **Combo**: Key-sequence detection for special moves
//! - **Agents**: Target scanning, validation, steering, action dispatch
//!
//! Add [`BrawlerAiPlugin`] to an app, give characters a [`arena::Team`] and
//! [`agents::AiControlled`], and they will find targets on their own.

pub mod agents;
pub mod arena;
pub mod combat;
pub mod combo;
pub mod core;

use bevy::prelude::*;

/// Main plugin that adds all sub-plugins.
pub struct BrawlerAiPlugin;

impl Plugin for BrawlerAiPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            .add_plugins(arena::ArenaPlugin)
            .add_plugins(combat::CombatPlugin)
            .add_plugins(combo::ComboPlugin)
            .add_plugins(agents::AgentPlugin)

            // Actions are consumed in the frame they are decided
            .configure_sets(
                Update,
                (
                    (combo::ComboSet, agents::AgentSet::Think),
                    (combat::CombatSet::Action, arena::ArenaSet),
                )
                    .chain(),
            );
    }
}
