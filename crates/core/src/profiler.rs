//! Stage timing helpers for the estimator pipeline.
//!
//! Provides an RAII timing scope that reports through `tracing`.
use std::time::Instant;
use tracing::debug;

/// A timing scope that logs its elapsed time at `debug` level when dropped.
pub struct StageTimer {
    start: Instant,
    name: &'static str,
}

impl StageTimer {
    /// Starts timing a named stage.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        debug!(stage = self.name, elapsed_ms = self.elapsed_ms(), "stage complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_stage_timer_measures_time() {
        let timer = StageTimer::new("test");
        thread::sleep(Duration::from_millis(10));
        let elapsed = timer.elapsed_ms();
        assert!(elapsed >= 10.0, "Expected at least 10ms, got {elapsed}");
    }
}
