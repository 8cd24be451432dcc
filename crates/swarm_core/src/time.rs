//! Simulation time and frame pacing
//!
//! A tick is one discrete `position += velocity` step; there is no dt scaling.
//! Pacing only decides when the next tick is presented.

use std::time::{Duration, Instant};

/// Default presentation rate.
pub const TARGET_FPS: u32 = 60;

/// Tick counter
#[derive(Debug, Default)]
pub struct SimulationTime {
    tick_count: u64,
}

impl SimulationTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
    }
}

/// Sleeps the caller to a fixed frame interval.
///
/// Deadlines advance by whole intervals; if the caller falls more than one
/// interval behind, the schedule restarts from now instead of bursting.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    next_deadline: Instant,
}

impl FramePacer {
    /// A target of 0 FPS disables pacing.
    pub fn new(target_fps: u32) -> Self {
        let interval = if target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / target_fps as f64)
        };
        Self {
            interval,
            next_deadline: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Block until the current deadline, then schedule the next one.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            std::thread::sleep(self.next_deadline - now);
            self.next_deadline += self.interval;
        } else if now - self.next_deadline > self.interval {
            self.next_deadline = now + self.interval;
        } else {
            self.next_deadline += self.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counter_advances() {
        let mut time = SimulationTime::new();
        time.advance_tick();
        time.advance_tick();
        assert_eq!(time.tick_count(), 2);
    }

    #[test]
    fn pacer_interval_from_fps() {
        let pacer = FramePacer::new(50);
        assert_eq!(pacer.interval(), Duration::from_millis(20));
        assert_eq!(FramePacer::new(0).interval(), Duration::ZERO);
    }

    #[test]
    fn pacer_waits_at_least_one_interval() {
        let mut pacer = FramePacer::new(200);
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(9));
    }

    #[test]
    fn pacer_resyncs_after_stall() {
        let mut pacer = FramePacer::new(1000);
        std::thread::sleep(Duration::from_millis(10));
        pacer.wait();
        assert!(pacer.next_deadline() > Instant::now() - Duration::from_millis(1));
    }
}
