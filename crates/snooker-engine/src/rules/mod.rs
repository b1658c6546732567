// rules/mod.rs
//
// Snooker rules on top of the physics: what is on, what a shot scored,
// which foul it was and where potted colours come back.

pub mod foul;
pub mod frame;
pub mod respawn;
pub mod shot;
pub mod target;
