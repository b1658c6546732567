//! Returning balls to the table: colours to spots, the cue ball to the D.

use glam::Vec2;

use crate::api::types::BallId;
use crate::core::ball::{Ball, BallKind};
use crate::core::table::TableConfig;
use crate::error::SnookerError;

/// Whether a ball of radius `radius` at `pos` would clear every other ball on the table.
pub fn is_free(balls: &[Ball], pos: Vec2, radius: f32, exclude: BallId) -> bool {
    balls
        .iter()
        .filter(|b| b.in_play() && b.id != exclude)
        .all(|b| b.pos.distance(pos) >= b.radius + radius)
}

/// Where a colour goes back: its own spot, else the first free spot from
/// black downward, else the overflow spot.
pub fn respawn_position(balls: &[Ball], table: &TableConfig, ball: &Ball) -> Vec2 {
    let own = table.spot(ball.kind);
    if is_free(balls, own, ball.radius, ball.id) {
        return own;
    }
    BallKind::RESPAWN_PRIORITY
        .into_iter()
        .map(|kind| table.spot(kind))
        .find(|spot| is_free(balls, *spot, ball.radius, ball.id))
        .unwrap_or_else(|| table.overflow_spot())
}

/// Put a potted colour back on the table. Reds and the cue ball are left alone.
pub fn respawn_colour(balls: &mut [Ball], table: &TableConfig, id: BallId) {
    let Some(idx) = balls.iter().position(|b| b.id == id) else {
        return;
    };
    if !balls[idx].kind.is_colour() {
        return;
    }
    let pos = respawn_position(balls, table, &balls[idx]);
    let ball = &mut balls[idx];
    log::debug!("Respawning {:?} at {:?}", ball.kind, pos);
    ball.pos = pos;
    ball.vel = Vec2::ZERO;
    ball.potted = false;
}

/// Put the cue ball back at the default spot in the D, sliding along the
/// baulk line when something is sitting there.
pub fn respawn_cue(balls: &mut [Ball], table: &TableConfig) {
    let Some(idx) = balls.iter().position(Ball::is_cue) else {
        return;
    };
    let start = table.default_cue_position();
    let radius = balls[idx].radius;
    let id = balls[idx].id;
    let step = radius * 2.5;
    let pos = (0..8)
        .flat_map(|i| [start + Vec2::new(0.0, step * i as f32), start - Vec2::new(0.0, step * i as f32)])
        .find(|p| table.in_d(*p) && is_free(balls, *p, radius, id))
        .unwrap_or(start);
    let cue = &mut balls[idx];
    cue.pos = pos;
    cue.vel = Vec2::ZERO;
    cue.potted = false;
}

/// Validate a ball-in-hand placement: inside the D and clear of every ball.
pub fn validate_cue_placement(
    balls: &[Ball],
    table: &TableConfig,
    pos: Vec2,
) -> Result<(), SnookerError> {
    if !table.in_d(pos) {
        return Err(SnookerError::OutsideD);
    }
    let cue = balls.iter().find(|b| b.is_cue());
    let (id, radius) = cue.map_or((BallId(u32::MAX), table.ball_radius), |c| (c.id, c.radius));
    if !is_free(balls, pos, radius, id) {
        return Err(SnookerError::Overlapping);
    }
    Ok(())
}
