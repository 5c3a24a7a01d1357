//! Host capability ports.
//!
//! Browser globals (local storage, timers, the clock) are reached only
//! through these traits so the components can run against in-memory hosts.

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    time::Duration,
};

/// Persistent boolean flags (browser local storage).
///
/// A set flag survives reloads; nothing in this crate clears one.
pub trait FlagStore {
    fn is_set(&self, key: &str) -> bool;
    fn set(&self, key: &str);
}

/// Flag store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryFlags {
    flags: RefCell<HashSet<String>>,
}

impl MemoryFlags {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlags {
    fn is_set(&self, key: &str) -> bool {
        self.flags.borrow().contains(key)
    }

    fn set(&self, key: &str) {
        self.flags.borrow_mut().insert(key.to_string());
    }
}

/// Wall clock in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Timer facility (`setTimeout` / `setInterval`).
///
/// Timers are never cancelled; the page lifetime bounds them.
pub trait Scheduler {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>);
    fn set_interval(&self, period: Duration, task: Box<dyn FnMut()>);
}

enum Job {
    Once(Box<dyn FnOnce()>),
    Every(Duration, Box<dyn FnMut()>),
}

struct Entry {
    due: Duration,
    seq: u64,
    job: Job,
}

/// Deterministic clock and scheduler.
///
/// Time only moves when [`VirtualClock::advance`] is called; due tasks run
/// in deadline order, ties broken by scheduling order.
pub struct VirtualClock {
    epoch_ms: f64,
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    queue: RefCell<Vec<Entry>>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    /// Start at the Unix epoch.
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Start at a given wall-clock time.
    pub fn starting_at(epoch_ms: f64) -> Self {
        Self {
            epoch_ms,
            now: Cell::new(Duration::ZERO),
            next_seq: Cell::new(0),
            queue: RefCell::new(Vec::new()),
        }
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.now.get()
    }

    /// Number of timers still waiting (intervals count once).
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move time forward, running every task that falls due.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;

        loop {
            let next = {
                let queue = self.queue.borrow();
                queue
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.due <= target)
                    .min_by_key(|(_, entry)| (entry.due, entry.seq))
                    .map(|(idx, _)| idx)
            };

            let Some(idx) = next else { break };
            let entry = self.queue.borrow_mut().swap_remove(idx);
            self.now.set(entry.due);

            match entry.job {
                Job::Once(task) => task(),
                Job::Every(period, mut task) => {
                    task();
                    self.push(entry.due + period, Job::Every(period, task));
                }
            }
        }

        self.now.set(target);
    }

    fn push(&self, due: Duration, job: Job) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.queue.borrow_mut().push(Entry { due, seq, job });
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> f64 {
        self.epoch_ms + self.now.get().as_secs_f64() * 1000.0
    }
}

impl Scheduler for VirtualClock {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.push(self.now.get() + delay, Job::Once(task));
    }

    fn set_interval(&self, period: Duration, task: Box<dyn FnMut()>) {
        // A zero period would spin forever inside `advance`.
        let period = period.max(Duration::from_millis(1));
        self.push(self.now.get() + period, Job::Every(period, task));
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_memory_flags() {
        let flags = MemoryFlags::new();
        assert!(!flags.is_set("pushPrompted"));

        flags.set("pushPrompted");
        assert!(flags.is_set("pushPrompted"));
        assert!(!flags.is_set("exitPopupShown"));
    }

    #[test]
    fn test_timeout_runs_once_when_due() {
        let clock = VirtualClock::new();
        let hits = Rc::new(Cell::new(0));

        let counter = hits.clone();
        clock.set_timeout(
            Duration::from_secs(10),
            Box::new(move || counter.set(counter.get() + 1)),
        );

        clock.advance(Duration::from_millis(9_999));
        assert_eq!(hits.get(), 0);

        clock.advance(Duration::from_millis(1));
        assert_eq!(hits.get(), 1);

        clock.advance(Duration::from_secs(60));
        assert_eq!(hits.get(), 1);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_interval_repeats() {
        let clock = VirtualClock::new();
        let hits = Rc::new(Cell::new(0));

        let counter = hits.clone();
        clock.set_interval(
            Duration::from_secs(30),
            Box::new(move || counter.set(counter.get() + 1)),
        );

        clock.advance(Duration::from_secs(95));
        assert_eq!(hits.get(), 3);
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn test_tasks_run_in_deadline_order() {
        let clock = Rc::new(VirtualClock::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = order.clone();
        clock.set_timeout(Duration::from_millis(300), Box::new(move || log.borrow_mut().push("late")));
        let log = order.clone();
        clock.set_timeout(Duration::from_millis(100), Box::new(move || log.borrow_mut().push("early")));

        // A task scheduling a follow-up that is already due within the window.
        let log = order.clone();
        let nested_clock = clock.clone();
        clock.set_timeout(
            Duration::from_millis(150),
            Box::new(move || {
                let log = log.clone();
                nested_clock.set_timeout(
                    Duration::from_millis(50),
                    Box::new(move || log.borrow_mut().push("nested")),
                );
            }),
        );

        clock.advance(Duration::from_secs(1));
        assert_eq!(*order.borrow(), vec!["early", "nested", "late"]);
    }

    #[test]
    fn test_clock_reports_wall_time() {
        let clock = VirtualClock::starting_at(1_000.0);
        clock.advance(Duration::from_millis(2_500));

        assert_eq!(clock.now_ms(), 3_500.0);
        assert_eq!(clock.elapsed(), Duration::from_millis(2_500));
    }
}
