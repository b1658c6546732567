//! Ball data: kinds, point values and the opening layout.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::BallId;
use crate::core::table::TableConfig;

/// Ball kind: the cue ball, a red, or one of the six colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallKind {
    Cue,
    Red,
    Yellow,
    Green,
    Brown,
    Blue,
    Pink,
    Black,
}

impl BallKind {
    /// Colours in ascending value order (clearance order).
    pub const COLOURS: [BallKind; 6] = [
        BallKind::Yellow,
        BallKind::Green,
        BallKind::Brown,
        BallKind::Blue,
        BallKind::Pink,
        BallKind::Black,
    ];

    /// Order in which spots are tried when a colour's own spot is taken.
    pub const RESPAWN_PRIORITY: [BallKind; 6] = [
        BallKind::Black,
        BallKind::Pink,
        BallKind::Blue,
        BallKind::Brown,
        BallKind::Green,
        BallKind::Yellow,
    ];

    pub fn value(self) -> u32 {
        match self {
            BallKind::Cue => 0,
            BallKind::Red => 1,
            BallKind::Yellow => 2,
            BallKind::Green => 3,
            BallKind::Brown => 4,
            BallKind::Blue => 5,
            BallKind::Pink => 6,
            BallKind::Black => 7,
        }
    }

    pub fn is_colour(self) -> bool {
        !matches!(self, BallKind::Cue | BallKind::Red)
    }

    /// The colour after this one in clearance order.
    pub fn next_colour(self) -> Option<BallKind> {
        let idx = Self::COLOURS.iter().position(|&c| c == self)?;
        Self::COLOURS.get(idx + 1).copied()
    }

    /// Inverse of [`BallKind::value`]; values double as wire codes.
    pub fn from_value(value: u32) -> Option<BallKind> {
        match value {
            0 => Some(BallKind::Cue),
            1 => Some(BallKind::Red),
            2 => Some(BallKind::Yellow),
            3 => Some(BallKind::Green),
            4 => Some(BallKind::Brown),
            5 => Some(BallKind::Blue),
            6 => Some(BallKind::Pink),
            7 => Some(BallKind::Black),
            _ => None,
        }
    }
}

/// A single ball on the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    pub kind: BallKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub potted: bool,
}

impl Ball {
    pub const MASS: f32 = 1.0;

    pub fn new(id: BallId, kind: BallKind, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            radius,
            potted: false,
        }
    }

    pub fn value(&self) -> u32 {
        self.kind.value()
    }

    pub fn is_cue(&self) -> bool {
        self.kind == BallKind::Cue
    }

    /// On the table (not potted).
    pub fn in_play(&self) -> bool {
        !self.potted
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Balls in a full frame: cue, six colours, fifteen reds.
pub const BALL_COUNT: usize = 22;

/// Build the opening layout: cue ball in the D, colours on their spots,
/// 15 reds racked in a triangle behind the pink.
pub fn initial_layout(table: &TableConfig) -> Vec<Ball> {
    let r = table.ball_radius;
    let mut balls = Vec::with_capacity(BALL_COUNT);
    let mut next = 0u32;
    let mut push = |balls: &mut Vec<Ball>, kind: BallKind, pos: Vec2| {
        balls.push(Ball::new(BallId(next), kind, pos, r));
        next += 1;
    };

    push(&mut balls, BallKind::Cue, table.default_cue_position());
    for kind in BallKind::COLOURS {
        push(&mut balls, kind, table.spot(kind));
    }
    for pos in rack_positions(table) {
        push(&mut balls, BallKind::Red, pos);
    }
    balls
}

/// Red triangle positions. Apex sits just behind the pink spot, rows open
/// toward the black, with a small gap so no two reds start in contact.
pub fn rack_positions(table: &TableConfig) -> Vec<Vec2> {
    let r = table.ball_radius;
    let gap = 0.2;
    let apex = table.spot(BallKind::Pink) + Vec2::new(2.0 * r + 1.0, 0.0);
    let row_dx = 3.0_f32.sqrt() * (r + gap);
    let mut positions = Vec::with_capacity(15);
    for row in 0..5 {
        let x = apex.x + row as f32 * row_dx;
        for i in 0..=row {
            let y = apex.y + (i as f32 - row as f32 / 2.0) * 2.0 * (r + gap);
            positions.push(Vec2::new(x, y));
        }
    }
    positions
}
