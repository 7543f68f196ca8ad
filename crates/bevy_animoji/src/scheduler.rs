use std::time::Duration;

use bevy::prelude::Resource;
use bevy::time::{Timer, TimerMode};

/// Repeating spawn timer with an explicit start/stop lifecycle.
///
/// A stopped timer does not accumulate time, so restarting it always waits a
/// full interval before the next tick.
#[derive(Debug, Resource)]
pub struct SpawnTimer {
    timer: Timer,
    running: bool,
}

impl SpawnTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            timer: Timer::new(interval, TimerMode::Repeating),
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.timer.reset();
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.timer.duration()
    }

    /// Advances the timer and returns how many intervals elapsed.
    pub fn tick(&mut self, delta: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.timer.tick(delta);
        self.timer.times_finished_this_tick()
    }
}
