//! Wire messages between the authority (host) and a replica (client).
//!
//! Replication is snapshot based: the host owns the simulation and sends full
//! state; the client only forwards intents. Transport is out of scope; this
//! module only encodes, decodes and orders messages.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::Side;
use crate::core::ball::Ball;
use crate::core::physics::Spin;
use crate::error::SnookerError;
use crate::input::queue::Intent;
use crate::rules::frame::Frame;

/// Full replicated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonic sequence number assigned by the host.
    pub seq: u64,
    pub balls: Vec<Ball>,
    pub frame: Frame,
    pub spin: Spin,
    pub aim: Option<Vec2>,
    pub moving: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NetMessage {
    /// Host → client state.
    Snapshot(Snapshot),
    /// Client → host input, tagged with the side the sender plays.
    Intent { from: Side, intent: Intent },
    /// Transport-level status surfaced to the UI.
    ConnectionStatus { connected: bool, message: String },
}

impl NetMessage {
    pub fn to_json(&self) -> Result<String, SnookerError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnookerError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Last-write-wins filter for incoming snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotGate {
    last_applied: Option<u64>,
}

impl SnapshotGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `seq` if it is newer than anything applied so far.
    pub fn accept(&mut self, seq: u64) -> bool {
        match self.last_applied {
            Some(last) if seq <= last => false,
            _ => {
                self.last_applied = Some(seq);
                true
            }
        }
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }
}
