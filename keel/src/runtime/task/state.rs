/// Scheduling state of a fiber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TaskState {
    /// Suspended, waiting for its waker.
    Idle,

    /// Sitting in the run queue.
    Queued,

    /// Being polled.
    Running,

    /// Woken while being polled; re-queued once the poll returns.
    Notified,
}
