//! Arena plugin - pickups, route progress and checkpoint ownership.

use bevy::prelude::*;

use super::systems;

/// Systems that apply actor actions to arena objects.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArenaSet;

/// Arena plugin - applies actor actions to arena objects.
pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                systems::handle_pickups,
                systems::use_held_items,
                systems::track_route_progress,
                systems::capture_checkpoints,
            )
                .chain()
                .in_set(ArenaSet),
        );
    }
}
