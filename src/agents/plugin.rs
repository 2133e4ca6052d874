//! Agent plugin - registers brain lifecycle and per-frame thinking.

use bevy::prelude::*;

use super::components::ReservationRequest;
use super::systems::{self, AgentSet};
use crate::core::AgentTuning;

/// Agent plugin - drives every `AiControlled` character.
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app
            .add_event::<ReservationRequest>()

            .configure_sets(
                Update,
                (AgentSet::Lifecycle, AgentSet::Think, AgentSet::Apply).chain(),
            )

            .add_systems(
                Update,
                (
                    systems::activate_agents,
                    systems::sync_agent_teams,
                    systems::apply_agent_tuning.run_if(resource_changed::<AgentTuning>),
                    systems::handle_section_changes,
                    systems::handle_respawns,
                )
                    .chain()
                    .in_set(AgentSet::Lifecycle),
            )
            .add_systems(Update, systems::agent_think.in_set(AgentSet::Think))
            .add_systems(
                Update,
                (systems::apply_reservations, systems::move_agents).in_set(AgentSet::Apply),
            );
    }
}
