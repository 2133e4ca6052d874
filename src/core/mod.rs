//! Core module - configuration, errors, and global events.
//!
//! This module provides the foundation that all other systems build upon.

mod config;
mod error;
mod events;
mod plugin;

pub use config::{load_ron, AgentTuning, AGENT_TUNING_PATH};
pub use error::DataLoadError;
pub use events::*;
pub use plugin::CorePlugin;
