use std::time::{Duration, Instant};

/// Minimum spacing between frames for a target rate. Zero fps disables pacing.
pub(crate) fn frame_interval(target_fps: u32) -> Duration {
    if target_fps == 0 {
        Duration::from_millis(0)
    } else {
        Duration::from_millis((1000 / target_fps).max(1) as u64)
    }
}

/// Sleeps so that successive frames are at least one interval apart.
pub(crate) struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub(crate) fn new(target_fps: u32) -> Self {
        Self {
            interval: frame_interval(target_fps),
            last: None,
        }
    }

    pub(crate) fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Delay between failed captures: starts at `base` and doubles per
/// consecutive failure, capped at `max`. A good frame resets it.
#[derive(Clone, Debug)]
pub struct RetryBackoff {
    base: Duration,
    max: Duration,
    failures: u32,
}

impl RetryBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            failures: 0,
        }
    }

    /// Record a failure and return how long to wait before retrying.
    pub fn on_failure(&mut self) -> Duration {
        let shift = self.failures.min(16);
        self.failures = self.failures.saturating_add(1);
        self.base.saturating_mul(1 << shift).min(self.max)
    }

    pub fn on_success(&mut self) {
        self.failures = 0;
    }

    /// Failures since the last success.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_from_fps() {
        assert_eq!(frame_interval(10), Duration::from_millis(100));
        assert_eq!(frame_interval(0), Duration::ZERO);
        assert_eq!(frame_interval(5000), Duration::from_millis(1));
    }

    #[test]
    fn pacer_spaces_frames() {
        let mut pacer = Pacer::new(50);
        let start = Instant::now();
        pacer.wait();
        pacer.wait();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn backoff_doubles_then_caps_and_resets() {
        let mut backoff = RetryBackoff::new(Duration::from_millis(100), Duration::from_millis(500));
        assert_eq!(backoff.on_failure(), Duration::from_millis(100));
        assert_eq!(backoff.on_failure(), Duration::from_millis(200));
        assert_eq!(backoff.on_failure(), Duration::from_millis(400));
        assert_eq!(backoff.on_failure(), Duration::from_millis(500));
        for _ in 0..40 {
            assert_eq!(backoff.on_failure(), Duration::from_millis(500));
        }
        assert_eq!(backoff.failures(), 44);

        backoff.on_success();
        assert_eq!(backoff.failures(), 0);
        assert_eq!(backoff.on_failure(), Duration::from_millis(100));
    }
}
