//! Per-shot record built from physics events and handed to the rule engine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::BallId;
use crate::core::ball::{Ball, BallKind};
use crate::core::physics::PhysicsEvent;

/// Slack on top of two radii within which balls count as touching.
pub const TOUCH_TOLERANCE: f32 = 0.5;
/// Minimum alignment of the aim with the touching ball's direction for a push.
pub const PUSH_ALIGNMENT: f32 = 0.05;

/// What happened during one shot. Created when the cue ball is struck,
/// filled from the physics event queue, consumed once at rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnStatus {
    /// Kind of the first ball the cue ball touched.
    pub first_contact: Option<BallKind>,
    /// Every ball that dropped, in pot order.
    pub potted: Vec<(BallId, BallKind)>,
    /// Kind of the ball the cue ball was pushed into, if this was a push shot.
    pub push_shot: Option<BallKind>,
}

impl TurnStatus {
    pub fn new(push_shot: Option<BallKind>) -> Self {
        Self {
            push_shot,
            ..Self::default()
        }
    }

    /// Fold one physics event into the record.
    pub fn record(&mut self, event: &PhysicsEvent) {
        match *event {
            PhysicsEvent::Collision { a_kind, b_kind, .. } if self.first_contact.is_none() => {
                if a_kind == BallKind::Cue {
                    self.first_contact = Some(b_kind);
                } else if b_kind == BallKind::Cue {
                    self.first_contact = Some(a_kind);
                }
            }
            PhysicsEvent::Pot { ball, kind, .. } => {
                if !self.potted.iter().any(|(id, _)| *id == ball) {
                    self.potted.push((ball, kind));
                }
            }
            _ => {}
        }
    }

    pub fn cue_potted(&self) -> bool {
        self.potted.iter().any(|(_, k)| *k == BallKind::Cue)
    }

    /// Object balls potted (cue ball excluded).
    pub fn object_pots(&self) -> impl Iterator<Item = BallKind> + '_ {
        self.potted
            .iter()
            .map(|(_, k)| *k)
            .filter(|k| *k != BallKind::Cue)
    }
}

/// Detect a push shot at strike time: the cue ball is already touching a ball
/// and is driven toward it. Returns the touching ball's kind.
pub fn detect_push(cue: &Ball, balls: &[Ball], aim: Vec2) -> Option<BallKind> {
    let aim = aim.normalize_or_zero();
    balls
        .iter()
        .filter(|b| b.in_play() && b.id != cue.id)
        .filter(|b| b.pos.distance(cue.pos) <= b.radius + cue.radius + TOUCH_TOLERANCE)
        .find(|b| aim.dot((b.pos - cue.pos).normalize_or_zero()) > PUSH_ALIGNMENT)
        .map(|b| b.kind)
}
