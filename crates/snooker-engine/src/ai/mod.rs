pub mod planner;

pub use planner::{Difficulty, PotCandidate, ShotKind, ShotPlan};
