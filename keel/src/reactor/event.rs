/// An I/O event reported by the poller.
///
/// Error and hang-up conditions are reported as both readable and writable
/// so that every waiter retries its syscall and observes the failure.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Event {
    /// Token of the registration the event belongs to.
    pub(crate) token: usize,

    pub(crate) readable: bool,
    pub(crate) writable: bool,
}
