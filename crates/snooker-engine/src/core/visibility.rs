//! Line-of-sight tests and the snookered check.

use glam::Vec2;

use crate::api::types::BallId;
use crate::core::ball::Ball;
use crate::core::math::project_onto_segment;
use crate::rules::target::OnBall;

/// Obstruction distance as a multiple of the ball radius. Slightly under two
/// radii so a ball that would only be grazed does not count.
pub const OBSTRUCTION_FACTOR: f32 = 1.95;

/// Whether any ball not rejected by `skip` sits on the segment `from..to`
/// closer than `clearance` to the line.
pub fn path_blocked<F>(from: Vec2, to: Vec2, balls: &[Ball], clearance: f32, skip: F) -> bool
where
    F: Fn(&Ball) -> bool,
{
    balls.iter().filter(|b| b.in_play() && !skip(*b)).any(|b| {
        let (t, dist) = project_onto_segment(from, to, b.pos);
        t > 0.0 && t < 1.0 && dist < clearance
    })
}

/// Clear straight line from the cue ball to `target`, ignoring the cue ball
/// itself, the target and every ball `ignore` accepts.
pub fn line_of_sight<F>(cue: &Ball, target: &Ball, balls: &[Ball], ignore: F) -> bool
where
    F: Fn(&Ball) -> bool,
{
    let clearance = cue.radius * OBSTRUCTION_FACTOR;
    !path_blocked(cue.pos, target.pos, balls, clearance, |b| {
        b.id == cue.id || b.id == target.id || b.is_cue() || ignore(b)
    })
}

/// Whether every legal ball is hidden from the cue ball.
///
/// Other legal balls never obstruct, since hitting one of them is legal too.
/// An empty legal set (or a missing cue ball) is never snookered.
pub fn is_snookered(balls: &[Ball], on: &OnBall) -> bool {
    let Some(cue) = balls.iter().find(|b| b.is_cue() && b.in_play()) else {
        return false;
    };
    let mut legal = on.legal_balls(balls).peekable();
    if legal.peek().is_none() {
        return false;
    }
    legal.all(|target| !line_of_sight(cue, target, balls, |b| on.accepts(b.kind)))
}

/// Ids of legal balls the cue ball can see directly.
pub fn visible_targets(balls: &[Ball], on: &OnBall) -> Vec<BallId> {
    let Some(cue) = balls.iter().find(|b| b.is_cue() && b.in_play()) else {
        return Vec::new();
    };
    on.legal_balls(balls)
        .filter(|t| line_of_sight(cue, t, balls, |b| on.accepts(b.kind)))
        .map(|t| t.id)
        .collect()
}
