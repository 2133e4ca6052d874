//! Combo plugin - registers combo data and detection systems.

use bevy::prelude::*;

use super::data::{load_combo_book, ComboBook, KeyBindings};
use super::systems::{self, SyntheticKeyPress};

/// Systems that turn key presses into special moves.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComboSet;

/// Combo plugin - recognizes special-move key sequences.
pub struct ComboPlugin;

impl Plugin for ComboPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<ComboBook>()
            .init_resource::<KeyBindings>()
            .add_event::<SyntheticKeyPress>()
            .add_systems(Startup, load_combo_book)
            .add_systems(
                Update,
                (
                    systems::equip_combo_detectors,
                    systems::feed_keyboard_combos,
                    systems::feed_synthetic_combos,
                )
                    .chain()
                    .in_set(ComboSet),
            );
    }
}
