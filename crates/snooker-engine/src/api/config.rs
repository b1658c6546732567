use serde::{Deserialize, Serialize};

use crate::ai::planner::Difficulty;
use crate::core::physics::PhysicsParams;
use crate::core::table::TableConfig;

/// Who controls a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    /// Local input.
    Human,
    /// Computer opponent.
    Ai(Difficulty),
    /// Intents arrive over the network.
    Remote,
}

/// This session's place in a networked game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NetRole {
    /// No peer: everything is simulated here.
    #[default]
    Local,
    /// Authority: runs physics and rules, sends snapshots.
    Host,
    /// Replica: applies snapshots, forwards intents.
    Client,
}

/// Configuration for a session, provided by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Longest frame delta fed into the accumulator (default: 0.25).
    pub max_frame_dt: f32,
    /// A shot still moving after this long is forced to rest (default: 30).
    pub max_shot_seconds: f32,
    /// Minimum time between periodic snapshots while balls move (default: 0.1).
    pub snapshot_interval: f32,
    /// Minimum time between ball-hit sounds (default: 0.05).
    pub collision_sound_interval: f32,
    /// Collisions softer than this make no sound.
    pub min_collision_sound_impact: f32,
    /// AI waits this long at rest before acting (default: 0.6).
    pub ai_think_seconds: f32,
    /// Maximum sound events kept per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum game events kept per frame (default: 32).
    pub max_events: usize,
    pub table: TableConfig,
    pub physics: PhysicsParams,
    pub players: [PlayerKind; 2],
    /// Player names used as stats keys.
    pub names: [String; 2],
    pub role: NetRole,
    /// Seed for the AI's random number generator.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_frame_dt: 0.25,
            max_shot_seconds: 30.0,
            snapshot_interval: 0.1,
            collision_sound_interval: 0.05,
            min_collision_sound_impact: 0.5,
            ai_think_seconds: 0.6,
            max_sounds: 32,
            max_events: 32,
            table: TableConfig::default(),
            physics: PhysicsParams::default(),
            players: [PlayerKind::Human, PlayerKind::Ai(Difficulty::Medium)],
            names: ["Player 1".to_string(), "Player 2".to_string()],
            role: NetRole::Local,
            seed: 42,
        }
    }
}

impl SessionConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
