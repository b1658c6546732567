//! Per-player cumulative statistics and the store they persist through.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SnookerError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub shots_played: u32,
    pub balls_potted: u32,
    pub highest_break: u32,
    pub frames_won: u32,
}

impl PlayerStats {
    /// Raise the highest break if `total` beats it. Returns whether it did.
    pub fn record_break(&mut self, total: u32) -> bool {
        if total > self.highest_break {
            self.highest_break = total;
            true
        } else {
            false
        }
    }
}

/// Storage medium for player statistics. The session reads stats when it
/// starts and writes after every change.
pub trait StatsStore {
    fn load(&self, player: &str) -> Result<PlayerStats, SnookerError>;
    fn save(&mut self, player: &str, stats: &PlayerStats) -> Result<(), SnookerError>;
}

/// In-memory store that can round-trip through JSON, for hosts that persist
/// a string (browser local storage, a file) themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonStatsStore {
    players: HashMap<String, PlayerStats>,
}

impl JsonStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SnookerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SnookerError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl StatsStore for JsonStatsStore {
    fn load(&self, player: &str) -> Result<PlayerStats, SnookerError> {
        Ok(self.players.get(player).cloned().unwrap_or_default())
    }

    fn save(&mut self, player: &str, stats: &PlayerStats) -> Result<(), SnookerError> {
        self.players.insert(player.to_string(), stats.clone());
        Ok(())
    }
}
