pub mod ai;
pub mod api;
pub mod bridge;
pub mod core;
pub mod error;
pub mod input;
pub mod rules;

pub use glam::Vec2;

// Re-export key types at crate root for convenience
pub use ai::{Difficulty, ShotKind, ShotPlan};
pub use api::config::{NetRole, PlayerKind, SessionConfig};
pub use api::session::SnookerSession;
pub use api::stats::{JsonStatsStore, PlayerStats, StatsStore};
pub use api::types::{BallId, GameEvent, Side, SoundEvent};
pub use bridge::net::{NetMessage, Snapshot, SnapshotGate};
pub use bridge::protocol::ProtocolLayout;
pub use crate::core::ball::{Ball, BallKind};
pub use crate::core::physics::{PhysicsEvent, PhysicsParams, Spin};
pub use crate::core::table::TableConfig;
pub use crate::core::time::FixedTimestep;
pub use crate::core::trajectory::Trajectory;
pub use error::{Result, SnookerError};
pub use input::queue::{Intent, IntentQueue};
pub use rules::foul::Foul;
pub use rules::frame::{FoulDecision, Frame, PendingDecision, ShotOutcome};
pub use rules::target::{OnBall, TargetState};
