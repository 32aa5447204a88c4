use super::Handle;

use std::cell::RefCell;

thread_local! {
    /// Handle to the scheduler driving the current thread.
    ///
    /// Installed while a runtime runs its loop so fibers and yield points can
    /// reach the scheduler without explicit parameter passing.
    pub(crate) static CURRENT_HANDLE: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Enters the runtime execution context for the current thread.
///
/// Installs `handle` for the duration of `f`, then restores the previous
/// context, so runtimes may be driven one after another on the same thread.
pub(crate) fn enter_context<R>(handle: &Handle, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_HANDLE.with(|current| current.replace(Some(handle.clone())));

    let out = f();

    CURRENT_HANDLE.with(|current| current.replace(previous));

    out
}

/// Returns a clone of the installed handle, if any.
pub(crate) fn current() -> Option<Handle> {
    CURRENT_HANDLE.with(|current| current.borrow().clone())
}
