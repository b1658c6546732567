//! Which ball is "on": the target state and the legal set derived from it.

use serde::{Deserialize, Serialize};

use crate::core::ball::{Ball, BallKind};

/// The legal object ball(s) for the next shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    /// Any red.
    Red,
    /// Any colour (after a red has been potted).
    AnyColour,
    /// One specific colour (clearance).
    Colour(BallKind),
}

impl TargetState {
    /// Whether `kind` may be struck first / potted under this target alone.
    pub fn accepts(self, kind: BallKind) -> bool {
        match self {
            TargetState::Red => kind == BallKind::Red,
            TargetState::AnyColour => kind.is_colour(),
            TargetState::Colour(c) => kind == c,
        }
    }

    /// Target for a striker coming to the table: red while reds remain,
    /// otherwise the lowest-valued colour still on the table.
    pub fn fresh(balls: &[Ball]) -> Option<TargetState> {
        if reds_remaining(balls) > 0 {
            return Some(TargetState::Red);
        }
        lowest_colour_on_table(balls).map(TargetState::Colour)
    }
}

/// Full legality context for a shot: target plus nomination and free ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnBall {
    pub target: TargetState,
    pub nominated: Option<BallKind>,
    pub free_ball: bool,
}

impl OnBall {
    pub fn new(target: TargetState) -> Self {
        Self {
            target,
            nominated: None,
            free_ball: false,
        }
    }

    pub fn accepts(&self, kind: BallKind) -> bool {
        if kind == BallKind::Cue {
            return false;
        }
        if self.free_ball {
            return true;
        }
        match (self.target, self.nominated) {
            (TargetState::AnyColour, Some(nominated)) => kind == nominated,
            (target, _) => target.accepts(kind),
        }
    }

    /// Non-potted balls that are currently legal.
    pub fn legal_balls<'a>(&'a self, balls: &'a [Ball]) -> impl Iterator<Item = &'a Ball> + 'a {
        balls.iter().filter(move |b| b.in_play() && self.accepts(b.kind))
    }

    /// Value of the ball on, used as a penalty floor candidate.
    pub fn value(&self) -> u32 {
        match (self.target, self.nominated) {
            (TargetState::Red, _) => BallKind::Red.value(),
            (TargetState::Colour(c), _) => c.value(),
            (TargetState::AnyColour, Some(n)) => n.value(),
            (TargetState::AnyColour, None) => 0,
        }
    }

    /// Whether a single pot is all this shot allows (one colour on).
    pub fn single_pot(&self) -> bool {
        !matches!(self.target, TargetState::Red) && !self.free_ball
    }
}

pub fn reds_remaining(balls: &[Ball]) -> usize {
    balls
        .iter()
        .filter(|b| b.in_play() && b.kind == BallKind::Red)
        .count()
}

pub fn lowest_colour_on_table(balls: &[Ball]) -> Option<BallKind> {
    BallKind::COLOURS
        .into_iter()
        .find(|&c| balls.iter().any(|b| b.in_play() && b.kind == c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BallId;
    use crate::core::ball::initial_layout;
    use crate::core::table::TableConfig;
    use glam::Vec2;

    #[test]
    fn target_acceptance() {
        assert!(TargetState::Red.accepts(BallKind::Red));
        assert!(!TargetState::Red.accepts(BallKind::Black));
        assert!(TargetState::AnyColour.accepts(BallKind::Yellow));
        assert!(!TargetState::AnyColour.accepts(BallKind::Red));
        assert!(!TargetState::AnyColour.accepts(BallKind::Cue));
        assert!(TargetState::Colour(BallKind::Blue).accepts(BallKind::Blue));
        assert!(!TargetState::Colour(BallKind::Blue).accepts(BallKind::Pink));
    }

    #[test]
    fn nomination_narrows_colour_phase() {
        let on = OnBall {
            target: TargetState::AnyColour,
            nominated: Some(BallKind::Blue),
            free_ball: false,
        };
        assert!(on.accepts(BallKind::Blue));
        assert!(!on.accepts(BallKind::Black));
        assert_eq!(on.value(), 5);
    }

    #[test]
    fn free_ball_accepts_everything_but_cue() {
        let on = OnBall {
            target: TargetState::Red,
            nominated: None,
            free_ball: true,
        };
        assert!(on.accepts(BallKind::Black));
        assert!(on.accepts(BallKind::Red));
        assert!(!on.accepts(BallKind::Cue));
    }

    #[test]
    fn fresh_target_follows_table_contents() {
        let table = TableConfig::default();
        let mut balls = initial_layout(&table);
        assert_eq!(TargetState::fresh(&balls), Some(TargetState::Red));

        for b in balls.iter_mut().filter(|b| b.kind == BallKind::Red || b.kind == BallKind::Yellow) {
            b.potted = true;
        }
        assert_eq!(TargetState::fresh(&balls), Some(TargetState::Colour(BallKind::Green)));

        for b in balls.iter_mut().filter(|b| b.kind != BallKind::Cue) {
            b.potted = true;
        }
        assert_eq!(TargetState::fresh(&balls), None);
    }

    #[test]
    fn legal_balls_skips_potted() {
        let mut balls = vec![
            Ball::new(BallId(1), BallKind::Red, Vec2::new(400.0, 200.0), 8.0),
            Ball::new(BallId(2), BallKind::Red, Vec2::new(400.0, 260.0), 8.0),
        ];
        balls[0].potted = true;
        let on = OnBall::new(TargetState::Red);
        let ids: Vec<BallId> = on.legal_balls(&balls).map(|b| b.id).collect();
        assert_eq!(ids, vec![BallId(2)]);
    }
}
