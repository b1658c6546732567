//! Table geometry: playable area, pockets, colour spots and the D.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::ball::BallKind;

/// Fraction of the bed length from the baulk cushion to the baulk line.
const BAULK_FRACTION: f32 = 0.2;
/// D radius as a fraction of the bed width.
const D_FRACTION: f32 = 0.1667;
/// Pink and black spots as fractions of the bed length.
const PINK_FRACTION: f32 = 0.75;
const BLACK_FRACTION: f32 = 0.909;
/// Corner pockets sit this many ball radii inside the bed corner.
const CORNER_POCKET_INSET: f32 = 0.75;
/// Middle pockets sit this far behind the cushion line.
const MIDDLE_POCKET_SETBACK: f32 = 2.0;

/// Table dimensions. Immutable for the duration of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub width: f32,
    pub height: f32,
    pub pocket_radius: f32,
    pub cushion_width: f32,
    pub ball_radius: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 460.0,
            pocket_radius: 18.0,
            cushion_width: 20.0,
            ball_radius: 8.0,
        }
    }
}

impl TableConfig {
    /// Min/max corners of the region a ball centre may occupy
    /// (table inset by cushion width plus ball radius).
    pub fn playable_bounds(&self) -> (Vec2, Vec2) {
        let inset = self.cushion_width + self.ball_radius;
        (
            Vec2::new(inset, inset),
            Vec2::new(self.width - inset, self.height - inset),
        )
    }

    /// Length of the cloth between the end cushions.
    pub fn bed_length(&self) -> f32 {
        self.width - 2.0 * self.cushion_width
    }

    /// Width of the cloth between the side cushions.
    pub fn bed_width(&self) -> f32 {
        self.height - 2.0 * self.cushion_width
    }

    pub fn center_y(&self) -> f32 {
        self.height / 2.0
    }

    /// Six pocket centres: four corners, then the two middle pockets.
    pub fn pockets(&self) -> [Vec2; 6] {
        let c = self.cushion_width;
        let inset = c + self.ball_radius * CORNER_POCKET_INSET;
        let (w, h) = (self.width, self.height);
        [
            Vec2::new(inset, inset),
            Vec2::new(w - inset, inset),
            Vec2::new(inset, h - inset),
            Vec2::new(w - inset, h - inset),
            Vec2::new(w / 2.0, c - MIDDLE_POCKET_SETBACK),
            Vec2::new(w / 2.0, h - c + MIDDLE_POCKET_SETBACK),
        ]
    }

    pub fn baulk_x(&self) -> f32 {
        self.cushion_width + self.bed_length() * BAULK_FRACTION
    }

    pub fn d_radius(&self) -> f32 {
        self.bed_width() * D_FRACTION
    }

    /// Designated spot for a colour. Cue and red have no spot; they map to
    /// the D centre and the pink spot respectively.
    pub fn spot(&self, kind: BallKind) -> Vec2 {
        let cy = self.center_y();
        let bx = self.baulk_x();
        let c = self.cushion_width;
        let len = self.bed_length();
        match kind {
            BallKind::Yellow => Vec2::new(bx, cy + self.d_radius()),
            BallKind::Green => Vec2::new(bx, cy - self.d_radius()),
            BallKind::Brown | BallKind::Cue => Vec2::new(bx, cy),
            BallKind::Blue => Vec2::new(self.width / 2.0, cy),
            BallKind::Pink | BallKind::Red => Vec2::new(c + len * PINK_FRACTION, cy),
            BallKind::Black => Vec2::new(c + len * BLACK_FRACTION, cy),
        }
    }

    /// Parking spot along the top cushion in baulk used when every
    /// designated spot is occupied.
    pub fn overflow_spot(&self) -> Vec2 {
        let (min, _) = self.playable_bounds();
        Vec2::new(self.cushion_width + self.bed_length() * 0.35, min.y + 1.0)
    }

    /// Where the cue ball starts a frame and where ball-in-hand places it by default.
    pub fn default_cue_position(&self) -> Vec2 {
        let brown = self.spot(BallKind::Brown);
        Vec2::new(brown.x - self.d_radius() * 0.6, brown.y)
    }

    /// Whether a point lies inside the D (behind the baulk line, within the semicircle).
    pub fn in_d(&self, point: Vec2) -> bool {
        let brown = self.spot(BallKind::Brown);
        let (min, _) = self.playable_bounds();
        point.x <= brown.x && point.x >= min.x && point.distance(brown) <= self.d_radius()
    }

    /// Whether a point is inside the outer table outline at all.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }

    pub fn diagonal(&self) -> f32 {
        Vec2::new(self.width, self.height).length()
    }
}
