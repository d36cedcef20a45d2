//! SimulationClock - Fixed-step accumulator for the 30 Hz simulation tick
//!
//! Frames arrive with variable deltas; the clock turns them into whole
//! simulation steps and carries the remainder, so effect durations and
//! cooldowns do not depend on frame rate.

use crate::config::SimulationConstants;
use crate::types::SimTime;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SimulationClock {
    step: f64,
    max_steps_per_frame: u32,
    accumulator: f64,
    time: SimTime,
    total_steps: u64,
}

impl SimulationClock {
    pub fn new(tick_rate: f64, max_steps_per_frame: u32) -> Self {
        let tick_rate = if tick_rate.is_finite() && tick_rate > 0.0 {
            tick_rate
        } else {
            warn!(tick_rate, "invalid simulation tick rate, using 30 Hz");
            30.0
        };
        SimulationClock {
            step: 1.0 / tick_rate,
            max_steps_per_frame: max_steps_per_frame.max(1),
            accumulator: 0.0,
            time: 0.0,
            total_steps: 0,
        }
    }

    pub fn from_constants(constants: &SimulationConstants) -> Self {
        SimulationClock::new(constants.tick_rate, constants.max_steps_per_frame)
    }

    /// Seconds per simulation step
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Simulation time elapsed in whole steps
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Fraction of a step waiting in the accumulator
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.step
    }

    /// Feed a frame delta; returns how many steps to run now
    ///
    /// Backlog beyond the per-frame cap is dropped rather than carried.
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps_per_frame {
            self.accumulator -= self.step;
            steps += 1;
        }
        if self.accumulator >= self.step {
            let dropped = (self.accumulator / self.step).floor();
            debug!(dropped, "simulation backlog dropped");
            self.accumulator %= self.step;
        }

        self.total_steps += u64::from(steps);
        self.time = self.total_steps as f64 * self.step;
        steps
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        SimulationClock::from_constants(&SimulationConstants::default())
    }
}
