//! Arena module - teams, items, and map objectives.

mod components;
mod plugin;
mod systems;

pub use components::*;
pub use plugin::{ArenaPlugin, ArenaSet};
