use thiserror::Error;

use crate::api::types::Side;
use crate::core::ball::BallKind;

/// Rejected input or malformed data. Returning one of these never
/// leaves the session half-updated.
#[derive(Error, Debug)]
pub enum SnookerError {
    #[error("Not {actor:?}'s turn to act")]
    WrongActor { actor: Side },

    #[error("Balls are still moving")]
    BallsMoving,

    #[error("Frame is over")]
    FrameOver,

    #[error("A colour must be nominated first")]
    NominationPending,

    #[error("A foul decision must be made first")]
    FoulDecisionPending,

    #[error("No colour nomination is pending")]
    NoNominationPending,

    #[error("No foul decision is pending")]
    NoFoulDecisionPending,

    #[error("Cue ball is not in hand")]
    NoBallInHand,

    #[error("Cue ball must be placed in the D")]
    OutsideD,

    #[error("Cue ball would overlap another ball")]
    Overlapping,

    #[error("{0:?} is not a colour")]
    NotAColour(BallKind),

    #[error("{0:?} is not on the table")]
    ColourNotOnTable(BallKind),

    #[error("Free ball was not offered")]
    FreeBallNotOffered,

    #[error("Shot direction is zero")]
    ZeroDirection,

    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Stats store error: {0}")]
    Stats(String),
}

impl SnookerError {
    /// Input the player can correct by trying again (bad placement, wrong timing).
    pub fn is_user_input(&self) -> bool {
        !matches!(self, SnookerError::Protocol(_) | SnookerError::Stats(_))
    }
}

pub type Result<T> = std::result::Result<T, SnookerError>;
