/// Timing primitives for the cooperative game loop.
///
///   - `Interval`  : repeating schedule (narration reveal, clock refresh)
///   - `Scheduler` : one-shot deferred tasks, each cancellable by id
///
/// Nothing here reads the clock. Callers pass `now`, so behavior under
/// test is fully determined by the instants they supply.

use std::time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Repeating schedule. `poll` reports how many periods have elapsed since
/// the last poll, so a slow frame catches up instead of dropping ticks.
#[derive(Clone, Debug)]
pub struct Interval {
    period: Duration,
    next_due: Instant,
    active: bool,
}

impl Interval {
    /// Start a schedule whose first firing is one period after `now`.
    pub fn start(period: Duration, now: Instant) -> Self {
        let period = period.max(MIN_PERIOD);
        Interval { period, next_due: now + period, active: true }
    }

    /// An interval that never fires.
    pub fn idle() -> Self {
        Interval { period: MIN_PERIOD, next_due: Instant::now(), active: false }
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn poll(&mut self, now: Instant) -> u32 {
        if !self.active {
            return 0;
        }
        let mut fired = 0;
        while now >= self.next_due {
            fired += 1;
            self.next_due += self.period;
        }
        fired
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TaskId(u64);

#[derive(Clone, Debug)]
struct Pending<T> {
    id: TaskId,
    due: Instant,
    action: T,
}

/// One-shot deferred actions.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler { next_id: 0, pending: Vec::new() }
    }

    pub fn schedule(&mut self, due: Instant, action: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { id, due, action });
        id
    }

    /// Drop a pending task. Returns false if it already fired or was cancelled.
    #[cfg(test)]
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Drop every pending task; returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every task due at or before `now`, earliest first.
    /// Ties keep scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(TaskId, T)> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.due, p.id.0));
        due.into_iter().map(|p| (p.id, p.action)).collect()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn interval_fires_once_per_period() {
        let t0 = Instant::now();
        let mut iv = Interval::start(ms(40), t0);
        assert_eq!(iv.poll(t0), 0);
        assert_eq!(iv.poll(t0 + ms(39)), 0);
        assert_eq!(iv.poll(t0 + ms(40)), 1);
        assert_eq!(iv.poll(t0 + ms(41)), 0);
        assert_eq!(iv.poll(t0 + ms(80)), 1);
    }

    #[test]
    fn interval_catches_up_after_slow_frame() {
        let t0 = Instant::now();
        let mut iv = Interval::start(ms(40), t0);
        assert_eq!(iv.poll(t0 + ms(200)), 5);
        assert_eq!(iv.poll(t0 + ms(239)), 0);
    }

    #[test]
    fn cancelled_interval_is_silent() {
        let t0 = Instant::now();
        let mut iv = Interval::start(ms(10), t0);
        iv.cancel();
        assert!(!iv.is_active());
        assert_eq!(iv.poll(t0 + ms(1000)), 0);
        assert_eq!(Interval::idle().poll(t0 + ms(1000)), 0);
    }

    #[test]
    fn zero_period_is_clamped() {
        let t0 = Instant::now();
        let mut iv = Interval::start(Duration::ZERO, t0);
        assert_eq!(iv.poll(t0 + ms(3)), 3);
    }

    #[test]
    fn drain_returns_only_due_tasks_in_order() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(t0 + ms(300), "late");
        s.schedule(t0 + ms(100), "early");
        s.schedule(t0 + ms(100), "early-second");

        let due: Vec<_> = s.drain_due(t0 + ms(150)).into_iter().map(|(_, a)| a).collect();
        assert_eq!(due, vec!["early", "early-second"]);
        assert_eq!(s.len(), 1);

        let due: Vec<_> = s.drain_due(t0 + ms(300)).into_iter().map(|(_, a)| a).collect();
        assert_eq!(due, vec!["late"]);
        assert!(s.is_empty());
    }

    #[test]
    fn cancel_by_id() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        let a = s.schedule(t0 + ms(10), 1);
        let b = s.schedule(t0 + ms(10), 2);
        assert!(s.cancel(a));
        assert!(!s.cancel(a));
        let due = s.drain_due(t0 + ms(10));
        assert_eq!(due, vec![(b, 2)]);
    }

    #[test]
    fn cancel_all_empties_queue() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(t0, ());
        s.schedule(t0, ());
        assert_eq!(s.cancel_all(), 2);
        assert!(s.drain_due(t0 + ms(1)).is_empty());
    }
}
