/// Fixed timestep accumulator.
/// Turns variable frame times into a whole number of constant-size ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Longest frame delta accepted; anything longer is clipped.
    max_frame_dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32, max_frame_dt: f32) -> Self {
        Self {
            dt,
            max_frame_dt: max_frame_dt.max(dt),
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    /// Negative or non-finite deltas are ignored.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        // A long stall (tab in background, debugger) must not replay seconds of play.
        self.accumulator += frame_dt.min(self.max_frame_dt);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Drop any partial tick, e.g. after applying a remote snapshot.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
