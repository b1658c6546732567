pub mod ball;
pub mod math;
pub mod physics;
pub mod rng;
pub mod table;
pub mod time;
pub mod trajectory;
pub mod visibility;
