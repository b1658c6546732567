//! Frame state machine: scores, break, striker, target and the pending
//! choices (colour nomination, foul decision) between shots.

use serde::{Deserialize, Serialize};

use crate::api::types::{BallId, Side};
use crate::core::ball::{Ball, BallKind};
use crate::core::table::TableConfig;
use crate::core::visibility::is_snookered;
use crate::error::SnookerError;
use crate::rules::foul::{self, Foul};
use crate::rules::respawn::{respawn_colour, respawn_cue};
use crate::rules::shot::TurnStatus;
use crate::rules::target::{OnBall, TargetState};

/// Non-offender's options after a foul.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoulDecision {
    /// Take the table as it lies.
    PlayOn,
    /// Make the offender play again.
    Replay,
    /// Nominate any ball as the ball on. Only when snookered.
    FreeBall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub offender: Side,
    pub free_ball_offered: bool,
}

/// What a resolved shot did, for scoring feedback, sound and stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotOutcome {
    /// Who played the shot.
    pub striker: Side,
    pub foul: Option<Foul>,
    /// Points awarded to the opponent (0 without a foul).
    pub penalty: u32,
    /// Points scored by the striker.
    pub points: u32,
    /// Object balls that dropped, legal or not.
    pub potted: Vec<BallKind>,
    pub turn_switched: bool,
    /// Break total after the shot (0 when the visit ended).
    pub break_total: u32,
    pub frame_over: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub scores: [u32; 2],
    pub break_score: u32,
    pub striker: Side,
    pub target: TargetState,
    pub nominated: Option<BallKind>,
    pub nomination_pending: bool,
    pub free_ball: bool,
    pub foul_decision: Option<PendingDecision>,
    pub ball_in_hand: bool,
    /// Whether the current striker was left snookered by the last foul.
    pub snookered: bool,
    pub last_foul: Option<Foul>,
    pub over: bool,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(Side::One)
    }
}

impl Frame {
    /// Fresh frame: reds on, cue ball in hand for the opening break.
    pub fn new(breaker: Side) -> Self {
        Self {
            scores: [0, 0],
            break_score: 0,
            striker: breaker,
            target: TargetState::Red,
            nominated: None,
            nomination_pending: false,
            free_ball: false,
            foul_decision: None,
            ball_in_hand: true,
            snookered: false,
            last_foul: None,
            over: false,
        }
    }

    pub fn on_ball(&self) -> OnBall {
        OnBall {
            target: self.target,
            nominated: self.nominated,
            free_ball: self.free_ball,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    /// Higher score wins; level scores give no winner.
    pub fn leader(&self) -> Option<Side> {
        match self.scores[0].cmp(&self.scores[1]) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Frame winner, once the frame is over.
    pub fn winner(&self) -> Option<Side> {
        if self.over {
            self.leader()
        } else {
            None
        }
    }

    /// Whether the striker may play now (ball motion is checked by the caller).
    pub fn can_shoot(&self) -> Result<(), SnookerError> {
        if self.over {
            return Err(SnookerError::FrameOver);
        }
        if self.nomination_pending {
            return Err(SnookerError::NominationPending);
        }
        if self.foul_decision.is_some() {
            return Err(SnookerError::FoulDecisionPending);
        }
        Ok(())
    }

    /// Striker names the colour they are on after potting a red.
    pub fn nominate_colour(&mut self, kind: BallKind, balls: &[Ball]) -> Result<(), SnookerError> {
        if !self.nomination_pending {
            return Err(SnookerError::NoNominationPending);
        }
        if !kind.is_colour() {
            return Err(SnookerError::NotAColour(kind));
        }
        if !balls.iter().any(|b| b.in_play() && b.kind == kind) {
            return Err(SnookerError::ColourNotOnTable(kind));
        }
        log::debug!("{:?} nominates {:?}", self.striker, kind);
        self.nominated = Some(kind);
        self.nomination_pending = false;
        Ok(())
    }

    /// Non-offender's answer to a foul.
    pub fn decide_foul(&mut self, decision: FoulDecision) -> Result<(), SnookerError> {
        let pending = self.foul_decision.ok_or(SnookerError::NoFoulDecisionPending)?;
        match decision {
            FoulDecision::PlayOn => {}
            FoulDecision::Replay => {
                self.striker = pending.offender;
            }
            FoulDecision::FreeBall => {
                if !pending.free_ball_offered {
                    return Err(SnookerError::FreeBallNotOffered);
                }
                self.free_ball = true;
            }
        }
        log::info!("Foul decision: {:?}, {:?} to play", decision, self.striker);
        self.foul_decision = None;
        Ok(())
    }

    /// Resolve a finished shot. Every ball must be at rest.
    pub fn resolve_shot(
        &mut self,
        balls: &mut [Ball],
        table: &TableConfig,
        status: TurnStatus,
    ) -> ShotOutcome {
        let on = self.on_ball();
        let striker = self.striker;
        let potted: Vec<BallKind> = status.object_pots().collect();

        if let Some(foul) = foul::detect(&status, &on) {
            return self.resolve_foul(balls, table, status, foul, potted);
        }

        self.last_foul = None;
        self.ball_in_hand = false;

        if potted.is_empty() {
            log::debug!("{:?} missed, break ends on {}", striker, self.break_score);
            self.switch_turn();
            self.refresh_target(balls);
            return ShotOutcome {
                striker,
                foul: None,
                penalty: 0,
                points: 0,
                potted,
                turn_switched: true,
                break_total: 0,
                frame_over: self.over,
            };
        }

        let object_pots: Vec<(BallId, BallKind)> = status
            .potted
            .iter()
            .copied()
            .filter(|(_, k)| *k != BallKind::Cue)
            .collect();
        let points = self.score_pots(balls, table, &object_pots);

        self.scores[striker.index()] += points;
        self.break_score += points;
        self.free_ball = false;

        let legal_left = self.on_ball().legal_balls(balls).next().is_some();
        if !self.over && !legal_left {
            log::warn!("No legal ball left for {:?}, ending frame", self.target);
            self.over = true;
        }
        if self.over {
            log::info!(
                "Frame over: {} - {} ({:?} wins)",
                self.scores[0],
                self.scores[1],
                self.leader()
            );
        }

        ShotOutcome {
            striker,
            foul: None,
            penalty: 0,
            points,
            potted,
            turn_switched: false,
            break_total: self.break_score,
            frame_over: self.over,
        }
    }

    // -- internals ----------------------------------------------------------

    /// Score the legal pots of a fair shot and advance the target.
    fn score_pots(
        &mut self,
        balls: &mut [Ball],
        table: &TableConfig,
        pots: &[(BallId, BallKind)],
    ) -> u32 {
        let mut points = 0;
        match self.target {
            TargetState::Red => {
                // Reds (or free-ball substitutes) are worth one each.
                for (id, kind) in pots {
                    points += 1;
                    if kind.is_colour() {
                        respawn_colour(balls, table, *id);
                    }
                }
                self.target = TargetState::AnyColour;
                self.nominated = None;
                self.nomination_pending = true;
            }
            TargetState::AnyColour => {
                for (id, kind) in pots {
                    points += kind.value();
                    respawn_colour(balls, table, *id);
                }
                self.nominated = None;
                self.refresh_target(balls);
            }
            TargetState::Colour(on) => {
                let mut advanced = false;
                for (id, kind) in pots {
                    if *kind == on {
                        points += on.value();
                        advanced = true;
                    } else {
                        // Free-ball substitute: one point, back on its spot.
                        points += 1;
                        respawn_colour(balls, table, *id);
                    }
                }
                if advanced {
                    self.refresh_target(balls);
                }
            }
        }
        points
    }

    fn resolve_foul(
        &mut self,
        balls: &mut [Ball],
        table: &TableConfig,
        status: TurnStatus,
        foul: Foul,
        potted: Vec<BallKind>,
    ) -> ShotOutcome {
        let on = self.on_ball();
        let striker = self.striker;
        let penalty = foul::penalty(&status, &on);
        self.scores[striker.other().index()] += penalty;
        self.last_foul = Some(foul);

        for (id, kind) in &status.potted {
            if kind.is_colour() {
                respawn_colour(balls, table, *id);
            }
        }
        self.ball_in_hand = status.cue_potted();
        if self.ball_in_hand {
            respawn_cue(balls, table);
        }

        log::info!("Foul by {:?}: {} ({} to opponent)", striker, foul, penalty);

        self.switch_turn();
        self.refresh_target(balls);
        if !self.over {
            // Ball in hand can always be placed with a view of the ball on.
            self.snookered = !self.ball_in_hand && is_snookered(balls, &OnBall::new(self.target));
            self.foul_decision = Some(PendingDecision {
                offender: striker,
                free_ball_offered: self.snookered,
            });
        }

        ShotOutcome {
            striker,
            foul: Some(foul),
            penalty,
            points: 0,
            potted,
            turn_switched: true,
            break_total: 0,
            frame_over: self.over,
        }
    }

    /// Hand the table to the other side.
    fn switch_turn(&mut self) {
        self.striker = self.striker.other();
        self.break_score = 0;
        self.nominated = None;
        self.nomination_pending = false;
        self.free_ball = false;
        self.snookered = false;
        log::debug!("{:?} to play", self.striker);
    }

    /// Red while reds remain, otherwise the lowest colour; no ball left ends the frame.
    fn refresh_target(&mut self, balls: &[Ball]) {
        match TargetState::fresh(balls) {
            Some(target) => self.target = target,
            None => self.over = true,
        }
    }
}
