use crate::future::Future;
use crate::runtime::Handle;

use std::time::{Duration, Instant};

/// Creates a future that resolves after `duration`.
///
/// The deadline is fixed when `sleep` is called. Timers are not cancellable:
/// dropping the future only discards the wake-up.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(&handle, Duration::from_millis(10)).await?;
/// ```
pub fn sleep(handle: &Handle, duration: Duration) -> Future<()> {
    let (promise, future) = handle.make_pair();

    handle.add_timer(Instant::now() + duration, promise);

    future
}
