//! Round timing
//!
//! `RoundClock` counts whole seconds down from the round time, one second
//! per `ticks_per_second` ticks. `FixedStep` turns variable frame times into
//! a whole number of simulation ticks.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundClock {
    ticks_per_second: u32,
    round_time: u32,
    time_left: u32,
    counter: u32,
    elapsed_ticks: u64,
}

impl RoundClock {
    pub fn new(round_time: u32, ticks_per_second: u32) -> Self {
        Self {
            ticks_per_second,
            round_time,
            time_left: round_time,
            counter: 0,
            elapsed_ticks: 0,
        }
    }

    /// Advance one tick; true when a second was taken off the clock
    pub fn tick(&mut self) -> bool {
        self.elapsed_ticks += 1;
        self.counter += 1;
        if self.counter >= self.ticks_per_second && self.time_left > 0 {
            self.counter = 0;
            self.time_left -= 1;
            return true;
        }
        false
    }

    /// Whole seconds remaining
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn round_time(&self) -> u32 {
        self.round_time
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn is_time_up(&self) -> bool {
        self.time_left == 0
    }
}

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedStep {
    dt: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStep {
    pub fn new(dt: f32, max_substeps: u32) -> Self {
        Self {
            dt,
            max_substeps,
            accumulator: 0.0,
        }
    }

    /// Feed a frame's wall time (seconds); returns how many ticks to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        // Long stalls (tab switch, debugger) must not replay seconds of ticks
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            self.accumulator -= self.dt;
            substeps += 1;
        }
        substeps
    }
}
