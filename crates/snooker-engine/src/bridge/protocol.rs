/// Flat f32 frame buffer handed to the browser renderer each frame.
/// Must stay in sync with the host-side reader.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [Balls: max_balls × 4 floats]        x, y, kind value, potted
/// [Trajectory: 6 floats]               start xy, end xy, ghost xy
/// [Sounds: max_sounds × 1 float]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header; the reader computes offsets from them.

use crate::api::types::{GameEvent, SoundEvent};
use crate::core::ball::Ball;
use crate::core::trajectory::Trajectory;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_FRAME_COUNTER: usize = 0;
pub const HEADER_PROTOCOL_VERSION: usize = 1;
pub const HEADER_MAX_BALLS: usize = 2;
pub const HEADER_BALL_COUNT: usize = 3;
pub const HEADER_MAX_SOUNDS: usize = 4;
pub const HEADER_SOUND_COUNT: usize = 5;
pub const HEADER_MAX_EVENTS: usize = 6;
pub const HEADER_EVENT_COUNT: usize = 7;
pub const HEADER_FLAGS: usize = 8;
pub const HEADER_STRIKER: usize = 9;
pub const HEADER_SCORE_ONE: usize = 10;
pub const HEADER_SCORE_TWO: usize = 11;
pub const HEADER_BREAK: usize = 12;
pub const HEADER_TARGET: usize = 13;
pub const HEADER_TABLE_WIDTH: usize = 14;
pub const HEADER_TABLE_HEIGHT: usize = 15;

/// Bits packed into `HEADER_FLAGS`.
pub const FLAG_MOVING: u32 = 1;
pub const FLAG_BALL_IN_HAND: u32 = 1 << 1;
pub const FLAG_NOMINATION_PENDING: u32 = 1 << 2;
pub const FLAG_FOUL_DECISION_PENDING: u32 = 1 << 3;
pub const FLAG_FREE_BALL_OFFERED: u32 = 1 << 4;
pub const FLAG_FRAME_OVER: u32 = 1 << 5;
pub const FLAG_HAS_TRAJECTORY: u32 = 1 << 6;
pub const FLAG_HAS_GHOST: u32 = 1 << 7;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per ball: x, y, kind value, potted (wire format, fixed).
pub const BALL_FLOATS: usize = 4;

/// Floats in the trajectory section.
pub const TRAJECTORY_FLOATS: usize = 6;

/// Floats per game event: kind, a, b, c (wire format, fixed).
pub const EVENT_FLOATS: usize = GameEvent::FLOATS;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_balls: usize,
    pub max_sounds: usize,
    pub max_events: usize,

    pub ball_data_floats: usize,
    pub sound_data_floats: usize,
    pub event_data_floats: usize,

    pub ball_data_offset: usize,
    pub trajectory_offset: usize,
    pub sound_data_offset: usize,
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_balls: usize, max_sounds: usize, max_events: usize) -> Self {
        let ball_data_floats = max_balls * BALL_FLOATS;
        let sound_data_floats = max_sounds;
        let event_data_floats = max_events * EVENT_FLOATS;

        let ball_data_offset = HEADER_FLOATS;
        let trajectory_offset = ball_data_offset + ball_data_floats;
        let sound_data_offset = trajectory_offset + TRAJECTORY_FLOATS;
        let event_data_offset = sound_data_offset + sound_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_balls,
            max_sounds,
            max_events,
            ball_data_floats,
            sound_data_floats,
            event_data_floats,
            ball_data_offset,
            trajectory_offset,
            sound_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Allocate a zeroed buffer with the capacities already in the header.
    pub fn allocate(&self) -> Vec<f32> {
        let mut buf = vec![0.0; self.buffer_total_floats];
        buf[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        buf[HEADER_MAX_BALLS] = self.max_balls as f32;
        buf[HEADER_MAX_SOUNDS] = self.max_sounds as f32;
        buf[HEADER_MAX_EVENTS] = self.max_events as f32;
        buf
    }

    /// Write ball records. Returns how many were written (capped at capacity).
    pub fn write_balls(&self, buf: &mut [f32], balls: &[Ball]) -> usize {
        let count = balls.len().min(self.max_balls);
        for (i, ball) in balls.iter().take(count).enumerate() {
            let at = self.ball_data_offset + i * BALL_FLOATS;
            buf[at] = ball.pos.x;
            buf[at + 1] = ball.pos.y;
            buf[at + 2] = ball.kind.value() as f32;
            buf[at + 3] = if ball.potted { 1.0 } else { 0.0 };
        }
        buf[HEADER_BALL_COUNT] = count as f32;
        count
    }

    /// Write the aiming guide. Returns the flag bits describing what was written.
    pub fn write_trajectory(&self, buf: &mut [f32], trajectory: Option<&Trajectory>) -> u32 {
        let at = self.trajectory_offset;
        buf[at..at + TRAJECTORY_FLOATS].fill(0.0);
        let Some(t) = trajectory else {
            return 0;
        };
        let start = t.points.first().copied().unwrap_or_default();
        let end = t.end();
        buf[at] = start.x;
        buf[at + 1] = start.y;
        buf[at + 2] = end.x;
        buf[at + 3] = end.y;
        match t.ghost {
            Some(ghost) => {
                buf[at + 4] = ghost.x;
                buf[at + 5] = ghost.y;
                FLAG_HAS_TRAJECTORY | FLAG_HAS_GHOST
            }
            None => FLAG_HAS_TRAJECTORY,
        }
    }

    /// Write queued sounds; anything past capacity is dropped.
    pub fn write_sounds(&self, buf: &mut [f32], sounds: &[SoundEvent]) -> usize {
        let count = sounds.len().min(self.max_sounds);
        for (i, sound) in sounds.iter().take(count).enumerate() {
            buf[self.sound_data_offset + i] = sound.0 as f32;
        }
        buf[HEADER_SOUND_COUNT] = count as f32;
        count
    }

    /// Write queued game events; anything past capacity is dropped.
    pub fn write_events(&self, buf: &mut [f32], events: &[GameEvent]) -> usize {
        let count = events.len().min(self.max_events);
        let floats: &[f32] = bytemuck::cast_slice(&events[..count]);
        let at = self.event_data_offset;
        buf[at..at + floats.len()].copy_from_slice(floats);
        buf[HEADER_EVENT_COUNT] = count as f32;
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BallId;
    use crate::core::ball::BallKind;
    use glam::Vec2;

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(22, 16, 8);
        assert_eq!(layout.ball_data_offset, HEADER_FLOATS);
        assert_eq!(layout.trajectory_offset, HEADER_FLOATS + 22 * BALL_FLOATS);
        assert_eq!(layout.sound_data_offset, layout.trajectory_offset + TRAJECTORY_FLOATS);
        assert_eq!(layout.event_data_offset, layout.sound_data_offset + 16);
        assert_eq!(layout.buffer_total_floats, layout.event_data_offset + 8 * EVENT_FLOATS);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn header_carries_capacities() {
        let layout = ProtocolLayout::new(22, 16, 8);
        let buf = layout.allocate();
        assert_eq!(buf[HEADER_MAX_BALLS], 22.0);
        assert_eq!(buf[HEADER_MAX_SOUNDS], 16.0);
        assert_eq!(buf[HEADER_MAX_EVENTS], 8.0);
        assert_eq!(buf[HEADER_PROTOCOL_VERSION], PROTOCOL_VERSION);
    }

    #[test]
    fn balls_sounds_and_events_are_written_in_place() {
        let layout = ProtocolLayout::new(2, 1, 1);
        let mut buf = layout.allocate();
        let mut black = Ball::new(BallId(6), BallKind::Black, Vec2::new(800.0, 230.0), 8.0);
        black.potted = true;
        let balls = vec![
            Ball::new(BallId(0), BallKind::Cue, Vec2::new(150.0, 230.0), 8.0),
            black,
            Ball::new(BallId(7), BallKind::Red, Vec2::ZERO, 8.0),
        ];
        assert_eq!(layout.write_balls(&mut buf, &balls), 2);
        let second = layout.ball_data_offset + BALL_FLOATS;
        assert_eq!(&buf[second..second + 4], &[800.0, 230.0, 7.0, 1.0]);

        assert_eq!(layout.write_sounds(&mut buf, &[SoundEvent::POT, SoundEvent::FOUL]), 1);
        assert_eq!(buf[layout.sound_data_offset], SoundEvent::POT.0 as f32);

        let ev = GameEvent::new(GameEvent::FOUL, 1.0, 4.0, 3.0);
        assert_eq!(layout.write_events(&mut buf, &[ev]), 1);
        let at = layout.event_data_offset;
        assert_eq!(&buf[at..at + 4], &[GameEvent::FOUL, 1.0, 4.0, 3.0]);
    }

    #[test]
    fn trajectory_flags_reflect_ghost() {
        let layout = ProtocolLayout::new(1, 1, 1);
        let mut buf = layout.allocate();
        assert_eq!(layout.write_trajectory(&mut buf, None), 0);
        let t = Trajectory {
            points: vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)],
            ghost: Some(Vec2::new(3.0, 4.0)),
            hit: Some(BallId(7)),
            object_direction: Some(Vec2::X),
        };
        let flags = layout.write_trajectory(&mut buf, Some(&t));
        assert_eq!(flags, FLAG_HAS_TRAJECTORY | FLAG_HAS_GHOST);
        let at = layout.trajectory_offset;
        assert_eq!(&buf[at..at + 6], &[1.0, 2.0, 3.0, 4.0, 3.0, 4.0]);
    }
}
