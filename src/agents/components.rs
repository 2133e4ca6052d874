//! Agent components and events.

use bevy::prelude::*;

use super::brain::{Agent, MovementIntent, Reservation};

/// Marks a character for autonomous control.
///
/// A brain is attached on the next frame. Characters without a [`Team`]
/// get an inert brain that wakes up once a `Team` is inserted.
///
/// [`Team`]: crate::arena::Team
#[derive(Component, Debug, Default)]
pub struct AiControlled;

/// Decision state of an autonomous character.
#[derive(Component, Debug, Clone)]
pub struct AgentBrain(pub Agent);

/// Movement decided this frame, applied by the controller system.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AgentMotion {
    pub intent: Option<MovementIntent>,
}

/// Item reservation change requested by an agent.
#[derive(Event, Debug, Clone, Copy)]
pub struct ReservationRequest {
    pub agent: Entity,
    pub change: Reservation,
}
