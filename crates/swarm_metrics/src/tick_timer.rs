//! Tick timing: rolling FPS and per-tick wall time

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

pub struct TickTimer {
    tick_start: Instant,
    tick_times: RingBuffer<Duration>,
}

impl TickTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            tick_start: Instant::now(),
            tick_times: RingBuffer::new(capacity),
        }
    }

    pub fn begin(&mut self) {
        self.tick_start = Instant::now();
    }

    /// Close the current sample and return its duration.
    pub fn end(&mut self) -> Duration {
        let elapsed = self.tick_start.elapsed();
        self.tick_times.push(elapsed);
        elapsed
    }

    /// Record an externally measured sample.
    pub fn record(&mut self, elapsed: Duration) {
        self.tick_times.push(elapsed);
    }

    pub fn fps(&self) -> f64 {
        let avg = self.tick_times.average();
        if avg.as_secs_f64() > 0.0 {
            1.0 / avg.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn tick_time_ms(&self) -> f64 {
        self.tick_times.average().as_secs_f64() * 1000.0
    }

    pub fn tick_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.tick_times.min_max();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }

    pub fn samples(&self) -> usize {
        self.tick_times.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_from_recorded_samples() {
        let mut timer = TickTimer::new(4);
        assert_eq!(timer.fps(), 0.0);

        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.samples(), 2);
        assert!((timer.tick_time_ms() - 25.0).abs() < 1e-9);
        assert!((timer.fps() - 40.0).abs() < 1e-6);

        let (min, max) = timer.tick_time_range_ms();
        assert!((min - 20.0).abs() < 1e-9);
        assert!((max - 30.0).abs() < 1e-9);
    }
}
