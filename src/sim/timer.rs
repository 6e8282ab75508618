/// Elapsed-time tracking for the maze stage, in whole seconds.

use std::time::Instant;

#[derive(Clone, Debug, Default)]
pub struct StopWatch {
    started: Option<Instant>,
    running: bool,
    elapsed_secs: u64,
}

impl StopWatch {
    pub fn new() -> Self {
        StopWatch::default()
    }

    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.running = true;
        self.elapsed_secs = 0;
    }

    /// Recompute `floor(now - start)` in seconds. No-op when stopped.
    pub fn sample(&mut self, now: Instant) -> u64 {
        if self.running {
            if let Some(start) = self.started {
                self.elapsed_secs = now.saturating_duration_since(start).as_secs();
            }
        }
        self.elapsed_secs
    }

    /// Take a final sample at `now` and freeze the value.
    pub fn stop(&mut self, now: Instant) -> u64 {
        let secs = self.sample(now);
        self.running = false;
        secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn truncates_to_whole_seconds() {
        let t0 = Instant::now();
        let mut sw = StopWatch::new();
        sw.start(t0);
        assert_eq!(sw.sample(t0 + Duration::from_millis(999)), 0);
        assert_eq!(sw.sample(t0 + Duration::from_millis(1000)), 1);
        assert_eq!(sw.sample(t0 + Duration::from_millis(2750)), 2);
    }

    #[test]
    fn stop_freezes_value() {
        let t0 = Instant::now();
        let mut sw = StopWatch::new();
        sw.start(t0);
        assert_eq!(sw.stop(t0 + Duration::from_secs(7)), 7);
        assert!(!sw.is_running());
        assert_eq!(sw.sample(t0 + Duration::from_secs(60)), 7);
        assert_eq!(sw.elapsed_secs(), 7);
    }

    #[test]
    fn unstarted_reads_zero() {
        let mut sw = StopWatch::new();
        assert_eq!(sw.sample(Instant::now()), 0);
    }
}
