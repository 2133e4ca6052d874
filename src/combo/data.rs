//! Combo definitions loaded from RON files.

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;

use super::machine::{ComboStateMachine, DEFAULT_COMBO_TIMEOUT};
use crate::core::{load_ron, DataLoadError};

/// Default location of the combo book.
pub const COMBO_BOOK_PATH: &str = "assets/data/combos.ron";

/// Abstract input consumed by the combo detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum ComboKey {
    Up,
    Down,
    Left,
    Right,
    Attack,
    Block,
    Jump,
}

/// Special attack triggered by a completed combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum SpecialMove {
    Uppercut,
    Whirlwind,
    DashStrike,
    GroundPound,
}

/// One registered key sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct ComboDefinition {
    pub name: String,
    pub keys: Vec<ComboKey>,
    pub special: SpecialMove,
}

fn default_timeout() -> f32 {
    DEFAULT_COMBO_TIMEOUT
}

/// All combos available to fighters.
#[derive(Resource, Debug, Clone, Deserialize)]
pub struct ComboBook {
    #[serde(default = "default_timeout")]
    pub timeout: f32,
    pub combos: Vec<ComboDefinition>,
}

impl Default for ComboBook {
    fn default() -> Self {
        use ComboKey::*;

        let combo = |name: &str, keys: &[ComboKey], special| ComboDefinition {
            name: name.to_string(),
            keys: keys.to_vec(),
            special,
        };

        Self {
            timeout: DEFAULT_COMBO_TIMEOUT,
            combos: vec![
                combo("uppercut", &[Down, Up, Attack], SpecialMove::Uppercut),
                combo("whirlwind", &[Attack, Attack, Left], SpecialMove::Whirlwind),
                combo("dash strike", &[Attack, Attack, Right], SpecialMove::DashStrike),
                combo("ground pound", &[Jump, Down, Attack], SpecialMove::GroundPound),
            ],
        }
    }
}

impl ComboBook {
    /// Build a fresh detector with every key and combo in the book registered.
    pub fn build_machine(&self) -> Result<ComboStateMachine<ComboKey, SpecialMove>, DataLoadError> {
        let mut machine = ComboStateMachine::new(self.timeout);

        for definition in &self.combos {
            for &key in &definition.keys {
                machine.register_key(key).map_err(|source| DataLoadError::Combo {
                    name: definition.name.clone(),
                    source,
                })?;
            }
        }

        machine.initialize();

        for definition in &self.combos {
            machine
                .register_combo(&definition.keys, definition.special)
                .map_err(|source| DataLoadError::Combo {
                    name: definition.name.clone(),
                    source,
                })?;
        }

        Ok(machine)
    }
}

/// Keyboard layout used by human fighters.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub keys: HashMap<KeyCode, ComboKey>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = HashMap::from([
            (KeyCode::KeyW, ComboKey::Up),
            (KeyCode::KeyS, ComboKey::Down),
            (KeyCode::KeyA, ComboKey::Left),
            (KeyCode::KeyD, ComboKey::Right),
            (KeyCode::KeyJ, ComboKey::Attack),
            (KeyCode::KeyK, ComboKey::Block),
            (KeyCode::Space, ComboKey::Jump),
        ]);
        Self { keys }
    }
}

impl KeyBindings {
    pub fn get(&self, key: KeyCode) -> Option<ComboKey> {
        self.keys.get(&key).copied()
    }
}

/// Load the combo book at startup, keeping the built-in book on failure.
pub fn load_combo_book(mut book: ResMut<ComboBook>) {
    match load_ron::<ComboBook>(COMBO_BOOK_PATH) {
        Ok(loaded) => match loaded.build_machine() {
            Ok(_) => {
                info!("Loaded {} combos from {}", loaded.combos.len(), COMBO_BOOK_PATH);
                *book = loaded;
            }
            Err(e) => {
                error!("Rejected combo book {}: {}", COMBO_BOOK_PATH, e);
            }
        },
        Err(DataLoadError::FileNotFound(path)) => {
            warn!("Combo book not found at {}, using built-in combos", path);
        }
        Err(e) => {
            error!("Failed to load combo book: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combo::ComboError;

    #[test]
    fn default_book_builds() {
        let machine = ComboBook::default().build_machine().unwrap();
        // Down, Up, Attack, Left, Right, Jump
        assert_eq!(machine.key_count(), 6);
    }

    #[test]
    fn whirlwind_and_dash_strike_share_prefix() {
        let mut machine = ComboBook::default().build_machine().unwrap();

        machine.feed(ComboKey::Attack, 0.0);
        machine.feed(ComboKey::Attack, 0.1);
        assert_eq!(machine.feed(ComboKey::Right, 0.2), Some(&SpecialMove::DashStrike));

        machine.feed(ComboKey::Attack, 1.0);
        machine.feed(ComboKey::Attack, 1.1);
        assert_eq!(machine.feed(ComboKey::Left, 1.2), Some(&SpecialMove::Whirlwind));
    }

    #[test]
    fn empty_combo_is_reported_by_name() {
        let book = ComboBook {
            timeout: 0.5,
            combos: vec![ComboDefinition {
                name: "nothing".to_string(),
                keys: vec![],
                special: SpecialMove::Uppercut,
            }],
        };

        match book.build_machine() {
            Err(DataLoadError::Combo { name, source }) => {
                assert_eq!(name, "nothing");
                assert_eq!(source, ComboError::EmptySequence);
            }
            other => panic!("expected combo error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn book_parses_from_ron() {
        let book: ComboBook = ron::from_str(
            r#"(
                combos: [
                    (name: "uppercut", keys: [Down, Up, Attack], special: Uppercut),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(book.timeout, DEFAULT_COMBO_TIMEOUT);
        assert_eq!(book.combos[0].special, SpecialMove::Uppercut);
    }

    #[test]
    fn shipped_combo_book_is_valid() {
        let book: ComboBook =
            load_ron(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/data/combos.ron")).unwrap();
        assert!(book.build_machine().is_ok());
    }
}
