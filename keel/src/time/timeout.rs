use super::sleep::sleep;
use crate::error::Error;
use crate::future::{Future, Promise};
use crate::runtime::Handle;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Bounds the time `future` may take.
///
/// Resolves with the outcome of `future` if it completes within `duration`,
/// and fails with [`Error::TimedOut`] otherwise. The losing side is not
/// cancelled: a late outcome is discarded.
pub fn timeout<T: 'static>(handle: &Handle, duration: Duration, future: Future<T>) -> Future<T> {
    let (promise, result) = handle.make_pair();
    let winner: Rc<RefCell<Option<Promise<T>>>> = Rc::new(RefCell::new(Some(promise)));

    let guarded = winner.clone();
    future.on_complete(move |outcome| {
        let promise = guarded.borrow_mut().take();

        match promise {
            Some(promise) => {
                let _ = promise.complete(outcome);
            }
            None => {
                if let Err(err) = outcome {
                    tracing::debug!(error = %err, "failure after timeout discarded");
                }
            }
        }
    });

    sleep(handle, duration).on_complete(move |_| {
        let promise = winner.borrow_mut().take();

        if let Some(promise) = promise {
            let _ = promise.fail(Error::TimedOut);
        }
    });

    result
}
