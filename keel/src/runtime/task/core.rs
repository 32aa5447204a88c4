use super::state::TaskState;

use std::future::Future;
use std::pin::Pin;

/// Boxed fiber body.
pub(crate) type Fiber = Pin<Box<dyn Future<Output = ()>>>;

/// A spawned fiber managed by the scheduler.
///
/// The body is moved out while it is polled so the scheduler never holds a
/// borrow of the task slab across user code.
pub(crate) struct Task {
    fiber: Option<Fiber>,
    pub(crate) state: TaskState,
}

impl Task {
    /// Creates a task ready to be queued.
    pub(crate) fn new(fiber: Fiber) -> Self {
        Self {
            fiber: Some(fiber),
            state: TaskState::Queued,
        }
    }

    /// Takes the body out for polling and marks the task `Running`.
    ///
    /// Returns `None` if the task is already being polled.
    pub(crate) fn begin(&mut self) -> Option<Fiber> {
        let fiber = self.fiber.take()?;
        self.state = TaskState::Running;
        Some(fiber)
    }

    /// Puts a still-pending body back.
    ///
    /// Returns `true` when the task was woken during the poll and has to be
    /// queued again.
    pub(crate) fn suspend(&mut self, fiber: Fiber) -> bool {
        self.fiber = Some(fiber);

        if self.state == TaskState::Notified {
            self.state = TaskState::Queued;
            true
        } else {
            self.state = TaskState::Idle;
            false
        }
    }

    /// Applies a wake-up.
    ///
    /// Returns `true` when the task has to be pushed onto the run queue.
    pub(crate) fn notify(&mut self) -> bool {
        match self.state {
            TaskState::Idle => {
                self.state = TaskState::Queued;
                true
            }
            TaskState::Running => {
                self.state = TaskState::Notified;
                false
            }
            TaskState::Queued | TaskState::Notified => false,
        }
    }
}
