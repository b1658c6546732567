use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::ball::BallKind;
use crate::rules::frame::FoulDecision;

/// Player intents the session understands. Produced by the local input
/// layer, by the AI, or decoded from a remote peer's messages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Intent {
    /// Aim line moved (drives the trajectory guide).
    Aim { direction: Vec2 },
    /// Spin chosen for the next strike; components are clamped to [-1, 1].
    Spin { side: f32, top: f32 },
    /// Strike the cue ball. `power` is 0..=100.
    Shoot { direction: Vec2, power: f32 },
    /// Place the cue ball while it is in hand.
    PlaceCue { position: Vec2 },
    /// Nominate the colour after a red or free ball.
    Nominate { kind: BallKind },
    /// Answer an opponent's foul.
    Decide { decision: FoulDecision },
}

impl Intent {
    /// Whether this intent only changes presentation state (aim, spin).
    pub fn is_cosmetic(&self) -> bool {
        matches!(self, Intent::Aim { .. } | Intent::Spin { .. })
    }
}

/// A queue of intents.
/// The host pushes intents; the session drains them each tick.
#[derive(Debug, Clone)]
pub struct IntentQueue {
    intents: Vec<Intent>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self {
            intents: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Drain all pending intents. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }
}

impl Default for IntentQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = IntentQueue::new();
        q.push(Intent::Aim { direction: Vec2::X });
        q.push(Intent::Shoot {
            direction: Vec2::X,
            power: 40.0,
        });
        assert_eq!(q.len(), 2);
        let intents = q.drain();
        assert_eq!(intents.len(), 2);
        assert_eq!(intents.iter().filter(|i| i.is_cosmetic()).count(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn intents_serialize_with_type_tag() {
        let intent = Intent::Nominate {
            kind: BallKind::Pink,
        };
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains("\"type\":\"Nominate\""), "{}", json);
        let back: Intent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, intent);
    }
}
