//! Agents module - autonomous target selection, steering, and actions.
//!
//! The decision logic ([`Agent`]) works against the [`WorldContext`] trait
//! and never touches the ECS directly; the systems here build an
//! [`ArenaView`] each frame and apply what the brains decide.

mod brain;
mod components;
mod dispatch;
mod holder;
mod plugin;
mod scanner;
mod systems;
mod target;
mod validation;
mod view;
mod world;

#[cfg(test)]
mod testing;

pub use brain::{Agent, AgentFrame, MovementIntent, Reservation};
pub use components::{AgentBrain, AgentMotion, AiControlled, ReservationRequest};
pub use dispatch::{ActionDispatcher, Dispatch, DispatchContext};
pub use holder::DistanceHolder;
pub use plugin::AgentPlugin;
pub use scanner::{ScanState, ScanTier, TargetScanner};
pub use systems::AgentSet;
pub use target::{HeldTarget, TargetBody, TargetInfo, TargetKind, Tier};
pub use validation::{LossReason, TargetStatus, TargetValidator};
pub use view::{ArenaQueries, ArenaView};
pub use world::{steer_straight, AgentBody, PathStep, WorldContext};
