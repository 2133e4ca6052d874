//! Deterministic key-combo automaton.
//!
//! Combos are registered as key sequences and compiled into a trie-shaped
//! transition table: one row per state, one column per registered key slot.
//! State 0 is the start state and a 0 entry means "no transition".

use std::collections::HashMap;
use std::hash::Hash;

use bevy::log::debug;
use thiserror::Error;

/// Default window between presses before a combo is dropped, in seconds.
pub const DEFAULT_COMBO_TIMEOUT: f32 = 0.5;

const START: usize = 0;

/// Misuse of the combo builder API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComboError {
    #[error("keys cannot be registered after the machine is initialized")]
    AlreadyInitialized,
    #[error("combos cannot be registered before the machine is initialized")]
    NotInitialized,
    #[error("combo uses a key that was never registered")]
    UnregisteredKey,
    #[error("combo has no keys")]
    EmptySequence,
}

/// Recognizes registered key sequences from a timed stream of key presses.
///
/// `K` is the input code, `C` the value reported when a combo completes.
#[derive(Debug, Clone)]
pub struct ComboStateMachine<K, C> {
    slots: HashMap<K, usize>,
    transitions: Vec<Vec<usize>>,
    callbacks: Vec<Option<C>>,
    current: usize,
    last_press: Option<f32>,
    timeout: f32,
    detected: Option<C>,
    initialized: bool,
}

impl<K, C> Default for ComboStateMachine<K, C>
where
    K: Eq + Hash + Copy,
    C: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_COMBO_TIMEOUT)
    }
}

impl<K, C> ComboStateMachine<K, C>
where
    K: Eq + Hash + Copy,
    C: Clone,
{
    pub fn new(timeout: f32) -> Self {
        Self {
            slots: HashMap::new(),
            transitions: Vec::new(),
            callbacks: Vec::new(),
            current: START,
            last_press: None,
            timeout,
            detected: None,
            initialized: false,
        }
    }

    /// Assign the next free slot to `key`, returning its slot index.
    ///
    /// Registering a key twice returns the existing slot.
    pub fn register_key(&mut self, key: K) -> Result<usize, ComboError> {
        if let Some(&slot) = self.slots.get(&key) {
            return Ok(slot);
        }
        if self.initialized {
            return Err(ComboError::AlreadyInitialized);
        }

        let slot = self.slots.len();
        self.slots.insert(key, slot);
        Ok(slot)
    }

    /// Allocate the start state. Call once, after every key is registered.
    pub fn initialize(&mut self) {
        self.transitions = vec![vec![START; self.slots.len()]];
        self.callbacks = vec![None];
        self.current = START;
        self.last_press = None;
        self.detected = None;
        self.initialized = true;
    }

    /// Add `sequence` to the automaton and attach `callback` to its final state.
    ///
    /// Sequences sharing a prefix share the states for that prefix. A second
    /// callback on the same final state replaces the first.
    pub fn register_combo(&mut self, sequence: &[K], callback: C) -> Result<usize, ComboError> {
        if !self.initialized {
            return Err(ComboError::NotInitialized);
        }
        if sequence.is_empty() {
            return Err(ComboError::EmptySequence);
        }

        let slots = sequence
            .iter()
            .map(|key| self.slots.get(key).copied().ok_or(ComboError::UnregisteredKey))
            .collect::<Result<Vec<_>, _>>()?;

        let mut state = START;
        for slot in slots {
            let next = self.transitions[state][slot];
            state = if next == START {
                let created = self.transitions.len();
                self.transitions.push(vec![START; self.slots.len()]);
                self.callbacks.push(None);
                self.transitions[state][slot] = created;
                created
            } else {
                next
            };
        }

        self.callbacks[state] = Some(callback);
        Ok(state)
    }

    /// Feed one key press at time `now` (seconds).
    ///
    /// Returns the callback of a combo completed by this press. Unregistered
    /// keys are ignored.
    pub fn feed(&mut self, key: K, now: f32) -> Option<&C> {
        self.detected = None;

        let Some(&slot) = self.slots.get(&key) else {
            return None;
        };
        if !self.initialized {
            return None;
        }

        if let Some(last) = self.last_press {
            if now - last >= self.timeout {
                self.current = START;
            }
        }
        self.last_press = Some(now);

        self.current = self.transitions[self.current][slot];

        if let Some(callback) = &self.callbacks[self.current] {
            self.detected = Some(callback.clone());
            debug!("Combo completed at state {}", self.current);

            // Stay put while a longer combo can still continue from here.
            if self.is_dead_end(self.current) {
                self.current = START;
            }
        }

        self.detected.as_ref()
    }

    /// Callback detected by the most recent `feed`, if any.
    pub fn detected(&self) -> Option<&C> {
        self.detected.as_ref()
    }

    /// Take the detected callback, clearing it.
    pub fn consume(&mut self) -> Option<C> {
        self.detected.take()
    }

    pub fn current_state(&self) -> usize {
        self.current
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn key_count(&self) -> usize {
        self.slots.len()
    }

    pub fn timeout(&self) -> f32 {
        self.timeout
    }

    /// Drop any partial combo.
    pub fn reset(&mut self) {
        self.current = START;
        self.last_press = None;
        self.detected = None;
    }

    fn is_dead_end(&self, state: usize) -> bool {
        self.transitions[state].iter().all(|&next| next == START)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
        C,
        D,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Move {
        Jab,
        Uppercut,
        Sweep,
        Flurry,
    }

    fn machine() -> ComboStateMachine<Key, Move> {
        let mut machine = ComboStateMachine::new(0.5);
        for key in [Key::A, Key::B, Key::C] {
            machine.register_key(key).unwrap();
        }
        machine.initialize();
        machine
    }

    fn feed_all(
        machine: &mut ComboStateMachine<Key, Move>,
        presses: &[(Key, f32)],
    ) -> Vec<Option<Move>> {
        presses
            .iter()
            .map(|&(key, at)| machine.feed(key, at).copied())
            .collect()
    }

    #[test]
    fn register_key_is_idempotent() {
        let mut machine: ComboStateMachine<Key, Move> = ComboStateMachine::default();
        assert_eq!(machine.register_key(Key::A), Ok(0));
        assert_eq!(machine.register_key(Key::B), Ok(1));
        assert_eq!(machine.register_key(Key::A), Ok(0));
        assert_eq!(machine.key_count(), 2);
    }

    #[test]
    fn new_keys_rejected_after_initialize() {
        let mut machine = machine();
        assert_eq!(machine.register_key(Key::D), Err(ComboError::AlreadyInitialized));
        assert_eq!(machine.register_key(Key::A), Ok(0));
    }

    #[test]
    fn combo_before_initialize_is_rejected() {
        let mut machine: ComboStateMachine<Key, Move> = ComboStateMachine::default();
        machine.register_key(Key::A).unwrap();
        assert_eq!(machine.register_combo(&[Key::A], Move::Jab), Err(ComboError::NotInitialized));
    }

    #[test]
    fn combo_with_unknown_key_is_rejected() {
        let mut machine = machine();
        assert_eq!(
            machine.register_combo(&[Key::A, Key::D], Move::Jab),
            Err(ComboError::UnregisteredKey)
        );
        assert_eq!(machine.state_count(), 1);
    }

    #[test]
    fn shared_prefix_reuses_states() {
        let mut machine = machine();
        machine.register_combo(&[Key::A, Key::A, Key::B], Move::Uppercut).unwrap();
        machine.register_combo(&[Key::A, Key::A, Key::C], Move::Sweep).unwrap();

        // start + A + AA + AAB + AAC
        assert_eq!(machine.state_count(), 5);
    }

    #[test]
    fn completes_within_timeout() {
        let mut machine = machine();
        machine.register_combo(&[Key::A, Key::B, Key::C], Move::Uppercut).unwrap();

        let detected = feed_all(&mut machine, &[(Key::A, 0.0), (Key::B, 0.3), (Key::C, 0.6)]);
        assert_eq!(detected, vec![None, None, Some(Move::Uppercut)]);
        assert_eq!(machine.current_state(), 0);
    }

    #[test]
    fn gap_at_or_over_timeout_drops_combo() {
        let mut machine = machine();
        machine.register_combo(&[Key::A, Key::B, Key::C], Move::Uppercut).unwrap();

        let detected = feed_all(&mut machine, &[(Key::A, 0.0), (Key::B, 0.25), (Key::C, 0.75)]);
        assert_eq!(detected, vec![None, None, None]);

        let detected = feed_all(&mut machine, &[(Key::A, 5.0), (Key::B, 5.2), (Key::C, 5.9)]);
        assert_eq!(detected, vec![None, None, None]);
    }

    #[test]
    fn prefix_sharing_combos_fire_independently() {
        let mut machine = machine();
        machine.register_combo(&[Key::A, Key::A, Key::B], Move::Uppercut).unwrap();
        machine.register_combo(&[Key::A, Key::A, Key::C], Move::Sweep).unwrap();

        let first = feed_all(&mut machine, &[(Key::A, 0.0), (Key::A, 0.1), (Key::B, 0.2)]);
        assert_eq!(first.last(), Some(&Some(Move::Uppercut)));

        let second = feed_all(&mut machine, &[(Key::A, 1.0), (Key::A, 1.1), (Key::C, 1.2)]);
        assert_eq!(second, vec![None, None, Some(Move::Sweep)]);
    }

    #[test]
    fn accepting_prefix_stays_open_for_longer_combo() {
        let mut machine = machine();
        machine.register_combo(&[Key::A, Key::A], Move::Jab).unwrap();
        machine.register_combo(&[Key::A, Key::A, Key::B], Move::Flurry).unwrap();

        let detected = feed_all(&mut machine, &[(Key::A, 0.0), (Key::A, 0.1), (Key::B, 0.2)]);
        assert_eq!(detected, vec![None, Some(Move::Jab), Some(Move::Flurry)]);
    }

    #[test]
    fn dead_end_accepting_state_returns_to_start() {
        let mut machine = machine();
        machine.register_combo(&[Key::A, Key::B], Move::Jab).unwrap();

        feed_all(&mut machine, &[(Key::A, 0.0), (Key::B, 0.1)]);
        assert_eq!(machine.current_state(), 0);

        // A fresh A-B right away completes again without a timeout.
        let detected = feed_all(&mut machine, &[(Key::A, 0.2), (Key::B, 0.3)]);
        assert_eq!(detected, vec![None, Some(Move::Jab)]);
    }

    #[test]
    fn unregistered_key_is_ignored() {
        let mut machine = machine();
        machine.register_combo(&[Key::A, Key::B], Move::Jab).unwrap();

        machine.feed(Key::A, 0.0);
        assert_eq!(machine.feed(Key::D, 0.1), None);
        assert_eq!(machine.feed(Key::B, 0.2), Some(&Move::Jab));
    }

    #[test]
    fn detection_lasts_one_feed() {
        let mut machine = machine();
        machine.register_combo(&[Key::A], Move::Jab).unwrap();

        machine.feed(Key::A, 0.0);
        assert_eq!(machine.detected(), Some(&Move::Jab));

        machine.feed(Key::B, 0.1);
        assert_eq!(machine.detected(), None);

        machine.feed(Key::A, 0.2);
        assert_eq!(machine.consume(), Some(Move::Jab));
        assert_eq!(machine.detected(), None);
    }

    #[test]
    fn same_input_yields_same_result() {
        let presses = [
            (Key::A, 0.0),
            (Key::B, 0.2),
            (Key::A, 0.4),
            (Key::A, 0.5),
            (Key::C, 0.7),
        ];

        let run = || {
            let mut machine = machine();
            machine.register_combo(&[Key::A, Key::A, Key::C], Move::Sweep).unwrap();
            machine.register_combo(&[Key::A, Key::B], Move::Jab).unwrap();
            feed_all(&mut machine, &presses)
        };

        let first = run();
        assert_eq!(first, run());
        assert_eq!(first, vec![None, Some(Move::Jab), None, None, Some(Move::Sweep)]);
    }
}
