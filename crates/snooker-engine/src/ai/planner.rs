//! Computer opponent: ghost-ball pot selection, safety fallback and
//! difficulty-scaled error. Every function here is pure given its `Rng`.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::BallId;
use crate::core::ball::{Ball, BallKind};
use crate::core::math::{angle_between, perp, rotate};
use crate::core::rng::Rng;
use crate::core::table::TableConfig;
use crate::core::trajectory::predict;
use crate::core::visibility::{path_blocked, visible_targets, OBSTRUCTION_FACTOR};
use crate::rules::frame::{FoulDecision, PendingDecision};
use crate::rules::respawn::validate_cue_placement;
use crate::rules::target::{OnBall, TargetState};

/// Cut angles beyond this are treated as unmakeable.
const MAX_CUT_DEGREES: f32 = 80.0;
const ANGLE_WEIGHT: f32 = 0.7;
const PROXIMITY_WEIGHT: f32 = 0.3;
const POT_BASE_POWER: f32 = 30.0;
const HARD_POWER_MARGIN: f32 = 8.0;
const FALLBACK_POWER: f32 = 20.0;
const MIN_POWER: f32 = 5.0;
const MAX_POWER: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Minimum confidence for attempting a pot.
    pub fn pot_threshold(self) -> f32 {
        match self {
            Difficulty::Easy => 0.3,
            Difficulty::Medium => 0.45,
            Difficulty::Hard => 0.6,
        }
    }

    /// Maximum aim rotation in radians.
    pub fn aim_error(self) -> f32 {
        match self {
            Difficulty::Easy => 0.08,
            Difficulty::Medium => 0.04,
            Difficulty::Hard => 0.01,
        }
    }

    /// Maximum relative power error.
    pub fn power_error(self) -> f32 {
        match self {
            Difficulty::Easy => 0.15,
            Difficulty::Medium => 0.08,
            Difficulty::Hard => 0.03,
        }
    }

    /// Safety aim offset from the target centre, in ball radii.
    fn safety_offset(self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.4,
            Difficulty::Hard => 1.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    Pot { pocket: usize },
    Safety,
    /// Nothing legal to aim at.
    Random,
}

/// A strike chosen by the planner, consumed exactly like a human shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotPlan {
    pub direction: Vec2,
    pub power: f32,
    pub target: Option<BallId>,
    pub kind: ShotKind,
}

/// One (object ball, pocket) pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotCandidate {
    pub target: BallId,
    pub pocket: usize,
    pub ghost: Vec2,
    pub cut_angle: f32,
    pub confidence: f32,
}

/// Every makeable pot from the cue ball's position.
///
/// A pairing is dropped when the cut is too thin, when the cue ball would
/// meet another ball before the target, or when a ball sits on the object
/// ball's line to the pocket.
pub fn pot_candidates(balls: &[Ball], table: &TableConfig, on: &OnBall) -> Vec<PotCandidate> {
    let Some(cue) = balls.iter().find(|b| b.is_cue() && b.in_play()) else {
        return Vec::new();
    };
    let max_cut = MAX_CUT_DEGREES.to_radians();
    let diagonal = table.diagonal();
    let clearance = table.ball_radius * OBSTRUCTION_FACTOR;

    let mut out = Vec::new();
    for target in legal_set(balls, on) {
        for (pocket, pocket_pos) in table.pockets().into_iter().enumerate() {
            let to_pocket = (pocket_pos - target.pos).normalize_or_zero();
            if to_pocket == Vec2::ZERO {
                continue;
            }
            let ghost = target.pos - to_pocket * (target.radius + cue.radius);
            let cut_angle = angle_between(target.pos - cue.pos, to_pocket);
            if cut_angle > max_cut {
                continue;
            }

            let aim = ghost - cue.pos;
            if predict(cue.pos, aim, balls, table).hit != Some(target.id) {
                continue;
            }
            if path_blocked(target.pos, pocket_pos, balls, clearance, |b| {
                b.id == target.id || b.is_cue()
            }) {
                continue;
            }

            let angle_quality = 1.0 - cut_angle / max_cut;
            let proximity = (1.0 - aim.length() / diagonal).clamp(0.0, 1.0);
            out.push(PotCandidate {
                target: target.id,
                pocket,
                ghost,
                cut_angle,
                confidence: ANGLE_WEIGHT * angle_quality + PROXIMITY_WEIGHT * proximity,
            });
        }
    }
    out
}

/// Highest-confidence pot, if any.
pub fn best_pot(balls: &[Ball], table: &TableConfig, on: &OnBall) -> Option<PotCandidate> {
    pot_candidates(balls, table, on)
        .into_iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
}

/// Choose a strike: a pot when one clears the difficulty threshold,
/// a thin safety off the farthest legal ball otherwise.
pub fn plan_shot(
    balls: &[Ball],
    table: &TableConfig,
    on: &OnBall,
    difficulty: Difficulty,
    rng: &mut Rng,
) -> ShotPlan {
    let Some(cue) = balls.iter().find(|b| b.is_cue() && b.in_play()) else {
        return random_shot(rng);
    };

    let plan = match best_pot(balls, table, on) {
        Some(best) if best.confidence >= difficulty.pot_threshold() => {
            let aim = best.ghost - cue.pos;
            let mut power = POT_BASE_POWER + aim.length() / 8.0;
            if difficulty == Difficulty::Hard {
                power += HARD_POWER_MARGIN;
            }
            log::debug!(
                "AI pot: {:?} into pocket {} (confidence {:.2})",
                best.target,
                best.pocket,
                best.confidence
            );
            ShotPlan {
                direction: aim.normalize_or_zero(),
                power,
                target: Some(best.target),
                kind: ShotKind::Pot { pocket: best.pocket },
            }
        }
        _ => safety_shot(cue, balls, on, difficulty, rng),
    };

    apply_error(plan, difficulty, rng)
}

/// Colour to nominate after a red: the best-looking pot, weighted toward value.
pub fn choose_colour(balls: &[Ball], table: &TableConfig) -> Option<BallKind> {
    let on_table = |kind: BallKind| balls.iter().any(|b| b.in_play() && b.kind == kind);
    let score = |kind: BallKind| {
        let on = OnBall {
            target: TargetState::AnyColour,
            nominated: Some(kind),
            free_ball: false,
        };
        best_pot(balls, table, &on).map(|c| c.confidence + kind.value() as f32 * 0.02)
    };
    BallKind::COLOURS
        .into_iter()
        .filter(|k| on_table(*k))
        .filter_map(|k| score(k).map(|s| (k, s)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(k, _)| k)
        .or_else(|| BallKind::COLOURS.into_iter().rev().find(|k| on_table(*k)))
}

/// Answer to an opponent's foul: take a free ball when offered, play on when
/// a good pot is available, otherwise put the offender back in.
pub fn choose_foul_decision(
    balls: &[Ball],
    table: &TableConfig,
    pending: &PendingDecision,
    target: TargetState,
    difficulty: Difficulty,
) -> FoulDecision {
    if pending.free_ball_offered {
        return FoulDecision::FreeBall;
    }
    let on = OnBall::new(target);
    match best_pot(balls, table, &on) {
        Some(best) if best.confidence >= difficulty.pot_threshold() => FoulDecision::PlayOn,
        _ if !visible_targets(balls, &on).is_empty() => FoulDecision::PlayOn,
        _ => FoulDecision::Replay,
    }
}

/// Ball-in-hand placement inside the D with the best pot on.
pub fn choose_placement(balls: &[Ball], table: &TableConfig, on: &OnBall) -> Vec2 {
    let brown = table.spot(BallKind::Brown);
    let radius = table.d_radius();
    let mut candidates = vec![table.default_cue_position()];
    for ring in [0.35_f32, 0.65, 0.9] {
        for step in 0..9 {
            // Sweep the half-disc behind the baulk line.
            let angle = (step as f32 / 8.0 - 0.5) * std::f32::consts::PI;
            candidates.push(brown + Vec2::new(-angle.cos(), angle.sin()) * radius * ring);
        }
    }

    let mut trial = balls.to_vec();
    let Some(cue_idx) = trial.iter().position(Ball::is_cue) else {
        return table.default_cue_position();
    };
    trial[cue_idx].potted = false;
    trial[cue_idx].vel = Vec2::ZERO;

    let mut best: Option<(Vec2, f32)> = None;
    for pos in candidates {
        if validate_cue_placement(balls, table, pos).is_err() {
            continue;
        }
        trial[cue_idx].pos = pos;
        let pot = best_pot(&trial, table, on).map_or(0.0, |c| c.confidence);
        let view = visible_targets(&trial, on).len() as f32 * 0.01;
        let score = pot + view;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((pos, score));
        }
    }
    best.map_or_else(|| table.default_cue_position(), |(p, _)| p)
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Legal balls on the table, or every object ball when none are legal.
fn legal_set<'a>(balls: &'a [Ball], on: &'a OnBall) -> Vec<&'a Ball> {
    let legal: Vec<&Ball> = on.legal_balls(balls).collect();
    if !legal.is_empty() {
        return legal;
    }
    balls.iter().filter(|b| b.in_play() && !b.is_cue()).collect()
}

fn safety_shot(
    cue: &Ball,
    balls: &[Ball],
    on: &OnBall,
    difficulty: Difficulty,
    rng: &mut Rng,
) -> ShotPlan {
    let farthest = legal_set(balls, on)
        .into_iter()
        .max_by(|a, b| a.pos.distance(cue.pos).total_cmp(&b.pos.distance(cue.pos)));
    let Some(target) = farthest else {
        return random_shot(rng);
    };

    let line = (target.pos - cue.pos).normalize_or_zero();
    let offset = perp(line) * target.radius * difficulty.safety_offset();
    let direction = (target.pos + offset - cue.pos).normalize_or_zero();
    let power = match difficulty {
        Difficulty::Hard => 35.0,
        _ => rng.range(25.0, 50.0),
    };
    log::debug!("AI safety off {:?}", target.id);
    ShotPlan {
        direction,
        power,
        target: Some(target.id),
        kind: ShotKind::Safety,
    }
}

fn random_shot(rng: &mut Rng) -> ShotPlan {
    ShotPlan {
        direction: rotate(Vec2::X, rng.range(0.0, TAU)),
        power: FALLBACK_POWER,
        target: None,
        kind: ShotKind::Random,
    }
}

fn apply_error(plan: ShotPlan, difficulty: Difficulty, rng: &mut Rng) -> ShotPlan {
    let direction = rotate(plan.direction, rng.spread(difficulty.aim_error())).normalize_or_zero();
    let power = plan.power * (1.0 + rng.spread(difficulty.power_error()));
    ShotPlan {
        direction,
        power: power.clamp(MIN_POWER, MAX_POWER),
        ..plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ball::initial_layout;

    fn ball(id: u32, kind: BallKind, x: f32, y: f32) -> Ball {
        Ball::new(BallId(id), kind, Vec2::new(x, y), 8.0)
    }

    fn red_on() -> OnBall {
        OnBall::new(TargetState::Red)
    }

    #[test]
    fn straight_pot_is_found_with_high_confidence() {
        let table = TableConfig::default();
        let pocket = table.pockets()[3];
        // Red on the line from cue to the bottom-right corner.
        let cue = Vec2::new(500.0, 230.0);
        let red = cue + (pocket - cue).normalize() * 150.0;
        let balls = vec![ball(0, BallKind::Cue, cue.x, cue.y), ball(7, BallKind::Red, red.x, red.y)];
        let best = best_pot(&balls, &table, &red_on()).unwrap();
        assert_eq!(best.target, BallId(7));
        assert_eq!(best.pocket, 3);
        assert!(best.cut_angle < 0.01);
        assert!(best.confidence > 0.9, "confidence {}", best.confidence);
    }

    #[test]
    fn ghost_sits_one_diameter_behind_target() {
        let table = TableConfig::default();
        let balls = vec![ball(0, BallKind::Cue, 400.0, 230.0), ball(7, BallKind::Red, 600.0, 230.0)];
        for c in pot_candidates(&balls, &table, &red_on()) {
            assert!((c.ghost.distance(Vec2::new(600.0, 230.0)) - 16.0).abs() < 1e-3);
            assert!(c.cut_angle <= MAX_CUT_DEGREES.to_radians());
        }
    }

    #[test]
    fn blocked_cue_path_is_rejected() {
        let table = TableConfig::default();
        let pocket = table.pockets()[3];
        let cue = Vec2::new(500.0, 230.0);
        let dir = (pocket - cue).normalize();
        let red = cue + dir * 150.0;
        let blocker = cue + dir * 60.0;
        let balls = vec![
            ball(0, BallKind::Cue, cue.x, cue.y),
            ball(7, BallKind::Red, red.x, red.y),
            ball(1, BallKind::Blue, blocker.x, blocker.y),
        ];
        assert!(pot_candidates(&balls, &table, &red_on())
            .iter()
            .all(|c| c.pocket != 3));
    }

    #[test]
    fn blocked_pocket_path_is_rejected() {
        let table = TableConfig::default();
        let pocket = table.pockets()[3];
        let cue = Vec2::new(500.0, 230.0);
        let dir = (pocket - cue).normalize();
        let red = cue + dir * 150.0;
        let blocker = red + dir * 60.0;
        let balls = vec![
            ball(0, BallKind::Cue, cue.x, cue.y),
            ball(7, BallKind::Red, red.x, red.y),
            ball(1, BallKind::Black, blocker.x, blocker.y),
        ];
        assert!(pot_candidates(&balls, &table, &red_on())
            .iter()
            .all(|c| c.pocket != 3));
    }

    #[test]
    fn hard_ai_aims_at_the_ghost_ball() {
        let table = TableConfig::default();
        let pocket = table.pockets()[3];
        let cue = Vec2::new(500.0, 230.0);
        let red = cue + (pocket - cue).normalize() * 150.0;
        let balls = vec![ball(0, BallKind::Cue, cue.x, cue.y), ball(7, BallKind::Red, red.x, red.y)];
        let mut rng = Rng::new(1);
        let plan = plan_shot(&balls, &table, &red_on(), Difficulty::Hard, &mut rng);
        assert_eq!(plan.kind, ShotKind::Pot { pocket: 3 });
        let ideal = (pocket - cue).normalize();
        assert!(angle_between(plan.direction, ideal) <= 0.011);
        let expected = POT_BASE_POWER + 134.0 / 8.0 + HARD_POWER_MARGIN;
        assert!((plan.power - expected).abs() < expected * 0.04, "power {}", plan.power);
    }

    #[test]
    fn snookered_ai_plays_safety_off_farthest_legal_ball() {
        let table = TableConfig::default();
        let balls = vec![
            ball(0, BallKind::Cue, 150.0, 230.0),
            ball(1, BallKind::Brown, 192.0, 230.0),
            ball(7, BallKind::Red, 700.0, 230.0),
            ball(8, BallKind::Red, 400.0, 234.0),
        ];
        let mut rng = Rng::new(9);
        let plan = plan_shot(&balls, &table, &red_on(), Difficulty::Medium, &mut rng);
        assert_eq!(plan.kind, ShotKind::Safety);
        assert_eq!(plan.target, Some(BallId(7)));
        assert!((MIN_POWER..=MAX_POWER).contains(&plan.power));
    }

    #[test]
    fn no_object_balls_falls_back_to_random_low_power() {
        let table = TableConfig::default();
        let balls = vec![ball(0, BallKind::Cue, 150.0, 230.0)];
        let mut rng = Rng::new(3);
        let plan = plan_shot(&balls, &table, &red_on(), Difficulty::Easy, &mut rng);
        assert_eq!(plan.kind, ShotKind::Random);
        assert!(plan.power <= FALLBACK_POWER * 1.16 && plan.power >= MIN_POWER);
        assert!((plan.direction.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn empty_legal_set_targets_any_object_ball() {
        let table = TableConfig::default();
        let balls = vec![ball(0, BallKind::Cue, 150.0, 230.0), ball(3, BallKind::Pink, 665.0, 230.0)];
        let mut rng = Rng::new(5);
        let plan = plan_shot(&balls, &table, &red_on(), Difficulty::Hard, &mut rng);
        assert_eq!(plan.target, Some(BallId(3)));
    }

    #[test]
    fn planning_is_reproducible_from_seed() {
        let table = TableConfig::default();
        let balls = initial_layout(&table);
        let a = plan_shot(&balls, &table, &red_on(), Difficulty::Easy, &mut Rng::new(77));
        let b = plan_shot(&balls, &table, &red_on(), Difficulty::Easy, &mut Rng::new(77));
        assert_eq!(a, b);
    }

    #[test]
    fn power_always_clamped() {
        let table = TableConfig::default();
        let balls = initial_layout(&table);
        let mut rng = Rng::new(11);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for _ in 0..20 {
                let plan = plan_shot(&balls, &table, &red_on(), difficulty, &mut rng);
                assert!((MIN_POWER..=MAX_POWER).contains(&plan.power));
            }
        }
    }

    #[test]
    fn colour_choice_prefers_a_makeable_colour() {
        let table = TableConfig::default();
        let pocket = table.pockets()[3];
        let cue = Vec2::new(500.0, 230.0);
        let blue = cue + (pocket - cue).normalize() * 150.0;
        let balls = vec![
            ball(0, BallKind::Cue, cue.x, cue.y),
            ball(1, BallKind::Blue, blue.x, blue.y),
            // Black hidden behind the blue from the cue ball's view.
            ball(2, BallKind::Black, blue.x + (blue.x - cue.x), blue.y + (blue.y - cue.y)),
        ];
        assert_eq!(choose_colour(&balls, &table), Some(BallKind::Blue));
    }

    #[test]
    fn free_ball_is_always_taken_when_offered() {
        let table = TableConfig::default();
        let balls = initial_layout(&table);
        let pending = PendingDecision {
            offender: crate::api::types::Side::One,
            free_ball_offered: true,
        };
        assert_eq!(
            choose_foul_decision(&balls, &table, &pending, TargetState::Red, Difficulty::Easy),
            FoulDecision::FreeBall
        );
    }

    #[test]
    fn placement_is_legal() {
        let table = TableConfig::default();
        let mut balls = initial_layout(&table);
        balls[0].potted = true;
        let pos = choose_placement(&balls, &table, &red_on());
        assert!(validate_cue_placement(&balls, &table, pos).is_ok());
    }
}
