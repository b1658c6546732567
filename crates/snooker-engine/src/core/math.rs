//! 2D vector helpers on top of `glam::Vec2`.
//!
//! glam already provides add/sub/scale/dot/length/normalize/distance; this
//! module adds the handful of geometric queries the simulator needs.

use glam::Vec2;

/// Left-hand perpendicular (rotated +90°).
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Rotate `v` by `angle` radians.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Unsigned angle between two vectors in radians, 0 when either is zero.
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let (a, b) = (a.normalize_or_zero(), b.normalize_or_zero());
    if a == Vec2::ZERO || b == Vec2::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Projection of `point` onto the segment `a..b`.
/// Returns the unclamped parameter `t` (0 at `a`, 1 at `b`) and the
/// perpendicular distance from `point` to the infinite line.
pub fn project_onto_segment(a: Vec2, b: Vec2, point: Vec2) -> (f32, f32) {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq < 1e-8 {
        return (0.0, a.distance(point));
    }
    let t = (point - a).dot(line) / len_sq;
    let closest = a + line * t;
    (t, closest.distance(point))
}

/// First non-negative parameter `t` at which the ray `origin + t * dir`
/// touches a circle, or `None`. `dir` must be normalized.
pub fn ray_circle(origin: Vec2, dir: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    if t >= 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Kinetic energy of a unit-mass body.
#[inline]
pub fn kinetic_energy(velocity: Vec2) -> f32 {
    0.5 * velocity.length_squared()
}
