//! Foul classification and penalty values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::ball::BallKind;
use crate::rules::shot::TurnStatus;
use crate::rules::target::OnBall;

pub const MIN_PENALTY: u32 = 4;

/// A foul, ordered by precedence. Only the first matching one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Foul {
    PushShot,
    CuePotted,
    MissedAll,
    WrongBallFirst,
    PottedWrongBall,
}

impl Foul {
    pub fn message(self) -> &'static str {
        match self {
            Foul::PushShot => "Push Shot",
            Foul::CuePotted => "Cue ball potted",
            Foul::MissedAll => "Missed all balls",
            Foul::WrongBallFirst => "Wrong ball hit first",
            Foul::PottedWrongBall => "Potted wrong ball",
        }
    }

    /// Small integer for the UI event bridge.
    pub fn code(self) -> u32 {
        match self {
            Foul::PushShot => 1,
            Foul::CuePotted => 2,
            Foul::MissedAll => 3,
            Foul::WrongBallFirst => 4,
            Foul::PottedWrongBall => 5,
        }
    }
}

impl fmt::Display for Foul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Classify the shot. `None` means a fair shot.
pub fn detect(status: &TurnStatus, on: &OnBall) -> Option<Foul> {
    if status.push_shot.is_some() {
        return Some(Foul::PushShot);
    }
    if status.cue_potted() {
        return Some(Foul::CuePotted);
    }
    let Some(first) = status.first_contact else {
        return Some(Foul::MissedAll);
    };
    if !on.accepts(first) {
        return Some(Foul::WrongBallFirst);
    }
    let mut pots = status.object_pots();
    let pot_count = status.object_pots().count();
    if pots.any(|k| !on.accepts(k)) || (on.single_pot() && pot_count > 1) {
        return Some(Foul::PottedWrongBall);
    }
    None
}

/// Penalty for a foul: the highest of 4, the ball on, an illegally struck
/// first ball, any potted ball and the touching ball of a push shot.
pub fn penalty(status: &TurnStatus, on: &OnBall) -> u32 {
    let first = status
        .first_contact
        .filter(|k| !on.accepts(*k))
        .map_or(0, BallKind::value);
    let potted = status.object_pots().map(BallKind::value).max().unwrap_or(0);
    let touching = status.push_shot.map_or(0, BallKind::value);
    [MIN_PENALTY, on.value(), first, potted, touching]
        .into_iter()
        .max()
        .unwrap_or(MIN_PENALTY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BallId;
    use crate::rules::target::TargetState;

    fn status(first: Option<BallKind>, potted: &[BallKind]) -> TurnStatus {
        let mut s = TurnStatus::new(None);
        s.first_contact = first;
        s.potted = potted
            .iter()
            .enumerate()
            .map(|(i, k)| (BallId(i as u32 + 1), *k))
            .collect();
        s
    }

    fn red_on() -> OnBall {
        OnBall::new(TargetState::Red)
    }

    #[test]
    fn fair_red_pot() {
        let s = status(Some(BallKind::Red), &[BallKind::Red, BallKind::Red]);
        assert_eq!(detect(&s, &red_on()), None);
    }

    #[test]
    fn missing_everything_costs_four() {
        let s = status(None, &[]);
        assert_eq!(detect(&s, &red_on()), Some(Foul::MissedAll));
        assert_eq!(penalty(&s, &red_on()), 4);
        assert_eq!(Foul::MissedAll.to_string(), "Missed all balls");
    }

    #[test]
    fn wrong_ball_first_uses_its_value() {
        let s = status(Some(BallKind::Black), &[]);
        assert_eq!(detect(&s, &red_on()), Some(Foul::WrongBallFirst));
        assert_eq!(penalty(&s, &red_on()), 7);
    }

    #[test]
    fn cue_potted_beats_wrong_ball() {
        let s = status(Some(BallKind::Blue), &[BallKind::Cue]);
        assert_eq!(detect(&s, &red_on()), Some(Foul::CuePotted));
        assert_eq!(penalty(&s, &red_on()), 5);
    }

    #[test]
    fn push_shot_has_highest_precedence() {
        let mut s = status(None, &[BallKind::Cue]);
        s.push_shot = Some(BallKind::Pink);
        assert_eq!(detect(&s, &red_on()), Some(Foul::PushShot));
        assert_eq!(penalty(&s, &red_on()), 6);
    }

    #[test]
    fn potting_a_colour_on_a_red_is_a_foul() {
        let s = status(Some(BallKind::Red), &[BallKind::Red, BallKind::Green]);
        assert_eq!(detect(&s, &red_on()), Some(Foul::PottedWrongBall));
        assert_eq!(penalty(&s, &red_on()), 4);
    }

    #[test]
    fn two_colours_on_a_single_colour_shot_is_a_foul() {
        let on = OnBall::new(TargetState::AnyColour);
        let s = status(Some(BallKind::Blue), &[BallKind::Blue, BallKind::Black]);
        assert_eq!(detect(&s, &on), Some(Foul::PottedWrongBall));
        assert_eq!(penalty(&s, &on), 7);
    }

    #[test]
    fn clearance_penalty_uses_ball_on() {
        let on = OnBall::new(TargetState::Colour(BallKind::Pink));
        let s = status(None, &[]);
        assert_eq!(penalty(&s, &on), 6);
    }

    #[test]
    fn free_ball_makes_any_first_contact_legal() {
        let on = OnBall {
            target: TargetState::Red,
            nominated: None,
            free_ball: true,
        };
        let s = status(Some(BallKind::Black), &[BallKind::Black]);
        assert_eq!(detect(&s, &on), None);
    }
}
