//! Per-worker progress, folded into one number for the caller.

use worker::WorkerState;

/// The aggregate progress ledger for one session.  Owned exclusively by
/// the session coordinator, which is the single consumer of worker
/// events, so the ledger needs no synchronization of its own.  A new
/// session gets a fresh tracker; it is never reset mid-flight.
pub struct ProgressTracker {
    percents: Vec<u32>,
    states: Vec<WorkerState>,
}

impl ProgressTracker {
    /// A tracker for `workers` workers, all running at zero percent.
    pub fn new(workers: usize) -> ProgressTracker {
        ProgressTracker {
            percents: vec![0; workers],
            states: vec![WorkerState::Running; workers],
        }
    }

    /// Records a worker's last reported percentage.
    pub fn update(&mut self, worker: usize, percent: u32) {
        self.percents[worker] = percent;
    }

    /// Overall progress: the arithmetic mean of every worker's last
    /// reported percentage, truncated.
    pub fn overall(&self) -> u32 {
        self.percents.iter().sum::<u32>() / self.percents.len() as u32
    }

    /// Marks a worker terminal.  Terminal states are sticky; the
    /// coordinator never reports a worker twice.
    pub fn mark_terminal(&mut self, worker: usize, state: WorkerState) {
        self.states[worker] = state;
    }

    /// True once no worker is still running.
    pub fn all_terminal(&self) -> bool {
        self.states.iter().all(|s| *s != WorkerState::Running)
    }

    /// Workers that finished their whole region.
    pub fn completed_workers(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == WorkerState::Completed)
            .count()
    }

    /// Workers that stopped early, whether cancelled or faulted.
    pub fn cancelled_workers(&self) -> usize {
        self.states
            .iter()
            .filter(|s| **s == WorkerState::Cancelled)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_is_the_truncated_mean() {
        let mut tracker = ProgressTracker::new(2);
        tracker.update(0, 50);
        tracker.update(1, 75);
        assert_eq!(tracker.overall(), 62);
    }

    #[test]
    fn overall_starts_at_zero_and_ends_at_one_hundred() {
        let mut tracker = ProgressTracker::new(3);
        assert_eq!(tracker.overall(), 0);
        for worker in 0..3 {
            tracker.update(worker, 100);
        }
        assert_eq!(tracker.overall(), 100);
    }

    #[test]
    fn all_terminal_waits_for_every_worker() {
        let mut tracker = ProgressTracker::new(2);
        assert!(!tracker.all_terminal());
        tracker.mark_terminal(0, WorkerState::Completed);
        assert!(!tracker.all_terminal());
        tracker.mark_terminal(1, WorkerState::Cancelled);
        assert!(tracker.all_terminal());
        assert_eq!(tracker.completed_workers(), 1);
        assert_eq!(tracker.cancelled_workers(), 1);
    }
}
