use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Stable identifier for a ball. Never reused within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// One of the two players in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Index into per-side arrays (scores, players, stats).
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }
}

/// A sound event emitted by the game logic.
/// The numeric value maps to a sound registered on the host side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

impl SoundEvent {
    pub const POT: SoundEvent = SoundEvent(1);
    pub const BALL_HIT: SoundEvent = SoundEvent(2);
    pub const CUSHION: SoundEvent = SoundEvent(3);
    pub const FOUL: SoundEvent = SoundEvent(4);
    pub const CUE_STRIKE: SoundEvent = SoundEvent(5);
}

/// A game event handed to the UI layer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    /// a = side index, b = points, c = break total.
    pub const SCORE: f32 = 1.0;
    /// a = offending side index, b = penalty, c = foul code.
    pub const FOUL: f32 = 2.0;
    /// a = winner index (-1 on a tie), b = side one score, c = side two score.
    pub const FRAME_OVER: f32 = 3.0;
    /// a = new striker index.
    pub const TURN: f32 = 4.0;

    pub fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_alternates() {
        assert_eq!(Side::One.other(), Side::Two);
        assert_eq!(Side::Two.other().index(), 0);
    }

    #[test]
    fn game_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<GameEvent>(), GameEvent::FLOATS * 4);
        let ev = GameEvent::new(GameEvent::SCORE, 0.0, 1.0, 1.0);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&ev));
        assert_eq!(floats, &[1.0, 0.0, 1.0, 1.0]);
    }
}
