//! Combo module - key-sequence detection for special moves.

mod data;
mod machine;
mod plugin;
mod systems;

pub use data::{ComboBook, ComboDefinition, ComboKey, KeyBindings, SpecialMove, COMBO_BOOK_PATH};
pub use machine::{ComboError, ComboStateMachine, DEFAULT_COMBO_TIMEOUT};
pub use plugin::{ComboPlugin, ComboSet};
pub use systems::{ComboFighter, ComboInput, HumanControlled, SyntheticKeyPress};
