//! Agent tuning loaded from RON files.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::error::DataLoadError;
use crate::arena::{GameMode, TeamId};

/// Default location of the agent tuning file.
pub const AGENT_TUNING_PATH: &str = "assets/data/agents.ron";

/// Tuning constants for the agent decision core.
///
/// Distances are in world units, durations in seconds.
#[derive(Resource, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AgentTuning {
    /// Radius of the near-tier overlap query.
    pub near_scan_radius: f32,
    /// Sleep between failed near scans.
    pub near_retry_interval: f32,
    /// Sleep between failed distance scans.
    pub distance_retry_interval: f32,
    /// Near targets farther than this are dropped.
    pub inactive_range: f32,
    /// Character targets pursued longer than this are abandoned.
    pub max_follow_time: f32,
    /// Stand-off distance for character targets.
    pub melee_range: f32,
    /// Stand-off distance for checkpoints.
    pub checkpoint_buffer: f32,
    /// Stand-off distance for waypoints and anything else.
    pub generic_buffer: f32,
    /// Slack added to every stand-off distance when checking arrival.
    pub arrival_tolerance: f32,
    /// Maximum lateral jitter applied to randomized steering proxies.
    pub jitter_radius: f32,
    /// Horizontal movement speed.
    pub move_speed: f32,
    /// Downward acceleration while airborne.
    pub gravity: f32,
    /// Vertical velocity applied while grounded, keeps the controller snapped.
    pub ground_stick_velocity: f32,
    /// Seconds a team must hold a checkpoint to capture it.
    pub capture_time: f32,
    pub game_mode: GameMode,
    /// Allows the mob team to pick up items.
    pub special_mode: bool,
    /// The neutral mob team.
    pub mob_team: TeamId,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            near_scan_radius: 10.0,
            near_retry_interval: 0.5,
            distance_retry_interval: 2.0,
            inactive_range: 15.0,
            max_follow_time: 10.0,
            melee_range: 1.5,
            checkpoint_buffer: 1.0,
            generic_buffer: 0.5,
            arrival_tolerance: 0.3,
            jitter_radius: 1.0,
            move_speed: 4.0,
            gravity: 15.0,
            ground_stick_velocity: -1.0,
            capture_time: 3.0,
            game_mode: GameMode::Waypoints,
            special_mode: false,
            mob_team: TeamId::MOBS,
        }
    }
}

impl AgentTuning {
    /// Reject values the planner cannot work with.
    pub fn validate(&self) -> Result<(), DataLoadError> {
        let non_negative = [
            ("near_scan_radius", self.near_scan_radius),
            ("near_retry_interval", self.near_retry_interval),
            ("distance_retry_interval", self.distance_retry_interval),
            ("inactive_range", self.inactive_range),
            ("max_follow_time", self.max_follow_time),
            ("melee_range", self.melee_range),
            ("checkpoint_buffer", self.checkpoint_buffer),
            ("generic_buffer", self.generic_buffer),
            ("arrival_tolerance", self.arrival_tolerance),
            ("jitter_radius", self.jitter_radius),
            ("move_speed", self.move_speed),
            ("gravity", self.gravity),
            ("capture_time", self.capture_time),
        ];

        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(DataLoadError::InvalidValue { field, value });
            }
        }

        if !self.ground_stick_velocity.is_finite() {
            return Err(DataLoadError::InvalidValue {
                field: "ground_stick_velocity",
                value: self.ground_stick_velocity,
            });
        }

        Ok(())
    }

    /// Load and validate tuning from a RON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let tuning: Self = load_ron(path)?;
        tuning.validate()?;
        Ok(tuning)
    }
}

/// Read and parse a RON data file.
pub fn load_ron<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, DataLoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    if !path.exists() {
        return Err(DataLoadError::FileNotFound(display));
    }

    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: display.clone(),
        details: e.to_string(),
    })?;

    ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
        path: display,
        details: e.to_string(),
    })
}

/// Load agent tuning at startup, falling back to defaults.
pub fn load_agent_tuning(mut tuning: ResMut<AgentTuning>) {
    match AgentTuning::from_file(AGENT_TUNING_PATH) {
        Ok(loaded) => {
            info!("Loaded agent tuning from {}", AGENT_TUNING_PATH);
            *tuning = loaded;
        }
        Err(DataLoadError::FileNotFound(path)) => {
            warn!("Agent tuning not found at {}, using defaults", path);
        }
        Err(e) => {
            error!("Failed to load agent tuning: {}", e);
        }
    }
}
