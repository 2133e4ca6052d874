//! Combo detection systems for human and synthesized input.

use bevy::prelude::*;

use super::data::{ComboBook, ComboKey, KeyBindings, SpecialMove};
use super::machine::ComboStateMachine;
use crate::core::{ActionEvent, ActorAction};

/// Marker for characters that can perform combos.
#[derive(Component, Debug, Default)]
pub struct ComboFighter;

/// Marker for characters driven by the local keyboard.
#[derive(Component, Debug, Default)]
pub struct HumanControlled;

/// Per-fighter combo detector.
#[derive(Component, Debug, Clone)]
pub struct ComboInput {
    pub machine: ComboStateMachine<ComboKey, SpecialMove>,
}

/// Key press synthesized by AI or scripted input.
#[derive(Event, Debug, Clone, Copy)]
pub struct SyntheticKeyPress {
    pub actor: Entity,
    pub key: ComboKey,
}

/// Give every new fighter its own detector built from the combo book.
pub fn equip_combo_detectors(
    mut commands: Commands,
    book: Res<ComboBook>,
    query: Query<Entity, (With<ComboFighter>, Without<ComboInput>)>,
) {
    if query.is_empty() {
        return;
    }

    let machine = match book.build_machine() {
        Ok(machine) => machine,
        Err(e) => {
            error!("Cannot build combo detector: {}", e);
            return;
        }
    };

    for entity in query.iter() {
        commands.entity(entity).insert(ComboInput {
            machine: machine.clone(),
        });
    }
}

/// Combo keys bound to `just_pressed`.
///
/// Keys pressed on the same frame come out in [`ComboKey`] declaration order.
fn ordered_presses<'a>(
    just_pressed: impl Iterator<Item = &'a KeyCode>,
    bindings: &KeyBindings,
) -> Vec<ComboKey> {
    let mut pressed: Vec<ComboKey> = just_pressed.filter_map(|&key| bindings.get(key)).collect();
    pressed.sort_unstable();
    pressed
}

/// Feed keys pressed this frame into the detectors of keyboard-driven fighters.
pub fn feed_keyboard_combos(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    bindings: Res<KeyBindings>,
    time: Res<Time>,
    mut query: Query<(Entity, &mut ComboInput), With<HumanControlled>>,
    mut actions: EventWriter<ActionEvent>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };

    let now = time.elapsed_secs();
    let pressed = ordered_presses(keyboard.get_just_pressed(), &bindings);

    if pressed.is_empty() {
        return;
    }

    for (entity, mut input) in query.iter_mut() {
        for &key in &pressed {
            if let Some(&special) = input.machine.feed(key, now) {
                info!("{:?} performed {:?}", entity, special);
                actions.send(ActionEvent {
                    actor: entity,
                    action: ActorAction::Special(special),
                });
            }
        }
    }
}

/// Feed synthesized key presses into the addressed fighter's detector.
pub fn feed_synthetic_combos(
    time: Res<Time>,
    mut presses: EventReader<SyntheticKeyPress>,
    mut query: Query<&mut ComboInput>,
    mut actions: EventWriter<ActionEvent>,
) {
    let now = time.elapsed_secs();

    for press in presses.read() {
        let Ok(mut input) = query.get_mut(press.actor) else {
            continue;
        };

        if let Some(&special) = input.machine.feed(press.key, now) {
            debug!("{:?} performed {:?} from synthesized input", press.actor, special);
            actions.send(ActionEvent {
                actor: press.actor,
                action: ActorAction::Special(special),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_frame_presses_have_a_fixed_order() {
        let bindings = KeyBindings::default();
        let forward = [KeyCode::KeyJ, KeyCode::KeyS, KeyCode::Escape, KeyCode::KeyW];
        let backward = [KeyCode::KeyW, KeyCode::Escape, KeyCode::KeyS, KeyCode::KeyJ];

        let expected = vec![ComboKey::Up, ComboKey::Down, ComboKey::Attack];
        assert_eq!(ordered_presses(forward.iter(), &bindings), expected);
        assert_eq!(ordered_presses(backward.iter(), &bindings), expected);
    }
}
