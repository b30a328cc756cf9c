//! Timing of the engine's periodic activities.
//!
//! The engine never sleeps or spawns anything itself.  Instead it reports,
//! via [`Plan`], which single activity its current state wants run and how
//! often, and the front end keeps a [`Scheduler`] in sync with that plan.
use std::time::{Duration, Instant};

/// A cancellation token.  The engine moves to a new epoch on every state
/// transition, which invalidates everything scheduled under the old one.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Epoch(u64);

impl Epoch {
    pub(crate) fn next(self) -> Epoch {
        Epoch(self.0.wrapping_add(1))
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Activity {
    /// Move the snake one cell
    Movement,
    /// Take one second off the math question's timer
    Countdown,
    /// Check the camera for the face gesture
    FacePoll,
}

/// The periodic activity wanted by the engine's current state
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Plan {
    pub(crate) activity: Activity,
    pub(crate) period: Duration,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Task {
    activity: Activity,
    epoch: Epoch,
    due: Instant,
}

/// A task set aside by [`Scheduler::pause()`], with the time it still had to
/// wait
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Held {
    activity: Activity,
    epoch: Epoch,
    left: Duration,
}

/// Holds the one pending timed task, if any
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Scheduler {
    task: Option<Task>,
    held: Option<Held>,
}

impl Scheduler {
    pub(crate) fn new() -> Scheduler {
        Scheduler::default()
    }

    /// Bring the pending task in line with `plan` under `epoch`.  A task
    /// scheduled for a different activity or epoch is cancelled and, if there
    /// is a plan, a fresh one is scheduled a full period from `now`.  A paused
    /// task for the same activity and epoch resumes with whatever time it had
    /// left.  Returns the deadline of the pending task after syncing.
    pub(crate) fn sync(&mut self, plan: Option<Plan>, epoch: Epoch, now: Instant) -> Option<Instant> {
        let held = self.held.take();
        let Some(plan) = plan else {
            self.task = None;
            return None;
        };
        match self.task {
            Some(task) if task.activity == plan.activity && task.epoch == epoch => Some(task.due),
            _ => {
                let wait = match held {
                    Some(h) if h.activity == plan.activity && h.epoch == epoch => h.left,
                    _ => plan.period,
                };
                let due = now + wait;
                self.task = Some(Task {
                    activity: plan.activity,
                    epoch,
                    due,
                });
                Some(due)
            }
        }
    }

    /// If the pending task is due at `now`, remove it and return what should
    /// be run.  The caller is expected to [`sync()`][Scheduler::sync] again
    /// afterwards to schedule the next run.
    pub(crate) fn take_due(&mut self, now: Instant) -> Option<(Activity, Epoch)> {
        match self.task {
            Some(task) if task.due <= now => {
                self.task = None;
                Some((task.activity, task.epoch))
            }
            _ => None,
        }
    }

    /// Stop the clock on the pending task.  The next [`sync()`][Scheduler::sync]
    /// picks it up again with the time it had left at `now`.  Pausing while
    /// already paused changes nothing.
    pub(crate) fn pause(&mut self, now: Instant) {
        if let Some(task) = self.task.take() {
            self.held = Some(Held {
                activity: task.activity,
                epoch: task.epoch,
                left: task.due.saturating_duration_since(now),
            });
        }
    }
}
