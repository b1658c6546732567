//! Aiming guide: ray cast from the cue ball to the first wall or ball contact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::BallId;
use crate::core::ball::Ball;
use crate::core::math::ray_circle;
use crate::core::table::TableConfig;

/// Result of a trajectory prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Polyline of the cue-ball path; always at least start and end.
    pub points: Vec<Vec2>,
    /// Cue-ball centre at the moment of contact, when a ball is hit first.
    pub ghost: Option<Vec2>,
    /// The ball hit first, if any.
    pub hit: Option<BallId>,
    /// Direction the object ball will travel (ghost → object centre).
    pub object_direction: Option<Vec2>,
}

impl Trajectory {
    pub fn end(&self) -> Vec2 {
        self.points.last().copied().unwrap_or(Vec2::ZERO)
    }
}

/// Cast a ray from `start` along `direction` and stop at the nearest of the
/// playable-area boundary or the first ball contact.
///
/// Ball contact is found against circles of twice the ball radius, so the
/// returned end point is the ghost-ball position rather than the surface hit.
/// Cue balls and potted balls are ignored.
pub fn predict(start: Vec2, direction: Vec2, balls: &[Ball], table: &TableConfig) -> Trajectory {
    let dir = direction.normalize_or_zero();
    if dir == Vec2::ZERO {
        return Trajectory {
            points: vec![start, start],
            ghost: None,
            hit: None,
            object_direction: None,
        };
    }

    let t_wall = wall_distance(start, dir, table);

    let contact = balls
        .iter()
        .filter(|b| !b.potted && !b.is_cue())
        .filter_map(|b| ray_circle(start, dir, b.pos, b.radius + table.ball_radius).map(|t| (t, b)))
        .min_by(|(a, _), (b, _)| a.total_cmp(b));

    match contact {
        Some((t, ball)) if t < t_wall => {
            let ghost = start + dir * t;
            Trajectory {
                points: vec![start, ghost],
                ghost: Some(ghost),
                hit: Some(ball.id),
                object_direction: Some((ball.pos - ghost).normalize_or_zero()),
            }
        }
        _ => Trajectory {
            points: vec![start, start + dir * t_wall],
            ghost: None,
            hit: None,
            object_direction: None,
        },
    }
}

/// Parametric distance along a unit ray to the playable rectangle edge.
fn wall_distance(start: Vec2, dir: Vec2, table: &TableConfig) -> f32 {
    let (min, max) = table.playable_bounds();
    let axis = |p: f32, d: f32, lo: f32, hi: f32| -> f32 {
        if d > 0.0 {
            ((hi - p) / d).max(0.0)
        } else if d < 0.0 {
            ((lo - p) / d).max(0.0)
        } else {
            f32::INFINITY
        }
    };
    axis(start.x, dir.x, min.x, max.x).min(axis(start.y, dir.y, min.y, max.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ball::BallKind;

    fn table() -> TableConfig {
        TableConfig::default()
    }

    fn ball(id: u32, kind: BallKind, pos: Vec2) -> Ball {
        Ball::new(BallId(id), kind, pos, table().ball_radius)
    }

    #[test]
    fn open_table_ends_at_wall() {
        let t = table();
        let (_, max) = t.playable_bounds();
        let traj = predict(Vec2::new(200.0, 230.0), Vec2::X, &[], &t);
        assert_eq!(traj.points.len(), 2);
        assert!((traj.end().x - max.x).abs() < 1e-3);
        assert!(traj.ghost.is_none() && traj.hit.is_none());
    }

    #[test]
    fn ball_ahead_yields_ghost_point() {
        let t = table();
        let balls = vec![
            ball(0, BallKind::Cue, Vec2::new(200.0, 230.0)),
            ball(1, BallKind::Red, Vec2::new(400.0, 230.0)),
        ];
        let traj = predict(balls[0].pos, Vec2::X, &balls, &t);
        let ghost = traj.ghost.expect("ghost point");
        assert!((ghost.x - (400.0 - 2.0 * t.ball_radius)).abs() < 1e-3);
        assert_eq!(traj.hit, Some(BallId(1)));
        assert_eq!(traj.end(), ghost);
        assert!((traj.object_direction.unwrap() - Vec2::X).length() < 1e-4);
    }

    #[test]
    fn nearest_ball_wins() {
        let t = table();
        let balls = vec![
            ball(1, BallKind::Red, Vec2::new(500.0, 230.0)),
            ball(2, BallKind::Blue, Vec2::new(300.0, 234.0)),
        ];
        let traj = predict(Vec2::new(200.0, 230.0), Vec2::X, &balls, &t);
        assert_eq!(traj.hit, Some(BallId(2)));
    }

    #[test]
    fn potted_and_cue_balls_are_transparent() {
        let t = table();
        let mut red = ball(1, BallKind::Red, Vec2::new(400.0, 230.0));
        red.potted = true;
        let cue = ball(0, BallKind::Cue, Vec2::new(300.0, 230.0));
        let traj = predict(Vec2::new(200.0, 230.0), Vec2::X, &[red, cue], &t);
        assert!(traj.ghost.is_none());
    }

    #[test]
    fn zero_direction_returns_degenerate_path() {
        let t = table();
        let traj = predict(Vec2::new(200.0, 230.0), Vec2::ZERO, &[], &t);
        assert_eq!(traj.points, vec![Vec2::new(200.0, 230.0); 2]);
    }

    #[test]
    fn ball_behind_wall_is_not_hit() {
        let t = table();
        let (_, max) = t.playable_bounds();
        let balls = vec![ball(1, BallKind::Red, Vec2::new(max.x + 40.0, 230.0))];
        let traj = predict(Vec2::new(200.0, 230.0), Vec2::X, &balls, &t);
        assert!(traj.hit.is_none());
    }
}
