//! Accumulated wall time per named tick phase

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct PhaseProfiler {
    timings: HashMap<&'static str, Duration>,
}

impl PhaseProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_phase<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        *self.timings.entry(name).or_insert(Duration::ZERO) += elapsed;
        result
    }

    pub fn timing(&self, name: &str) -> Duration {
        self.timings.get(name).copied().unwrap_or(Duration::ZERO)
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.timings.iter().map(|(name, d)| (*name, *d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_phase_returns_closure_value() {
        let mut profiler = PhaseProfiler::new();
        let value = profiler.time_phase("drain", || 7);
        assert_eq!(value, 7);
        profiler.time_phase("drain", || std::thread::sleep(Duration::from_millis(1)));
        assert!(profiler.timing("drain") >= Duration::from_millis(1));
        assert_eq!(profiler.timing("workers"), Duration::ZERO);

        profiler.reset();
        assert_eq!(profiler.iter().count(), 0);
    }
}
