//! Global events used for cross-system communication.
//!
//! Agent brains and the combo detector both publish through [`ActionEvent`],
//! so combat and arena systems have a single dispatch point to listen to.

use bevy::prelude::*;

use crate::arena::SectionId;
use crate::combo::SpecialMove;

/// A discrete action chosen by an actor this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorAction {
    /// Pick up the item the actor arrived at.
    PickUp(Entity),
    /// Face and attack a hostile character.
    Attack(Entity),
    /// Move on to the waypoint with this index in the current section.
    AdvanceWaypoint(u32),
    /// Hold a checkpoint's capture zone for one more frame.
    Capture(Entity),
    /// Use the currently held item.
    UseItem,
    /// A recognized key combo.
    Special(SpecialMove),
}

/// Sent whenever an actor commits to an action.
#[derive(Event, Debug, Clone, Copy)]
pub struct ActionEvent {
    /// Entity performing the action
    pub actor: Entity,
    pub action: ActorAction,
}

/// Sent when a character moves into a different level section.
///
/// Agents discard their distance target and waypoint progress on receipt.
#[derive(Event, Debug, Clone, Copy)]
pub struct SectionChangedEvent {
    pub entity: Entity,
    pub section: SectionId,
}

/// Sent when a character respawns.
#[derive(Event, Debug, Clone, Copy)]
pub struct RespawnEvent {
    pub entity: Entity,
}

/// Sent when an item is picked up.
#[derive(Event, Debug, Clone, Copy)]
pub struct ItemPickupEvent {
    /// The item entity being picked up
    pub item: Entity,
    /// The character picking it up
    pub picker: Entity,
}

/// Sent when a checkpoint changes owner.
#[derive(Event, Debug, Clone, Copy)]
pub struct CheckpointCapturedEvent {
    pub checkpoint: Entity,
    pub team: crate::arena::TeamId,
}
