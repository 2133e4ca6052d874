//! Core plugin that sets up configuration and global events.

use bevy::prelude::*;

use super::config::{load_agent_tuning, AgentTuning};
use super::events::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Agent tuning (loaded from `assets/data/agents.ron` at startup)
/// - Global events (ActionEvent, SectionChangedEvent, etc.)
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<AgentTuning>()

            // Register global events
            .add_event::<ActionEvent>()
            .add_event::<SectionChangedEvent>()
            .add_event::<RespawnEvent>()
            .add_event::<ItemPickupEvent>()
            .add_event::<CheckpointCapturedEvent>()

            .add_systems(Startup, load_agent_tuning);
    }
}
