use super::Future;
use crate::error::Result;

use std::cell::RefCell;
use std::future::IntoFuture;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Outcome handoff between a continuation and the fiber awaiting it.
struct WaitSlot<T> {
    outcome: Option<Result<T>>,
    waker: Option<Waker>,
}

/// Adapter that lets a fiber `.await` a [`Future`].
///
/// Created by `IntoFuture`; resolves to the future's `Result`.
pub struct Wait<T: 'static> {
    future: Option<Future<T>>,
    slot: Rc<RefCell<WaitSlot<T>>>,
}

impl<T: 'static> IntoFuture for Future<T> {
    type Output = Result<T>;
    type IntoFuture = Wait<T>;

    fn into_future(self) -> Self::IntoFuture {
        Wait {
            future: Some(self),
            slot: Rc::new(RefCell::new(WaitSlot {
                outcome: None,
                waker: None,
            })),
        }
    }
}

impl<T: 'static> std::future::Future for Wait<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(mut future) = this.future.take() {
            if future.is_ready() {
                return Poll::Ready(future.get());
            }

            this.slot.borrow_mut().waker = Some(cx.waker().clone());

            let slot = this.slot.clone();
            future.on_complete(move |outcome| {
                let waker = {
                    let mut slot = slot.borrow_mut();
                    slot.outcome = Some(outcome);
                    slot.waker.take()
                };

                if let Some(waker) = waker {
                    waker.wake();
                }
            });

            return Poll::Pending;
        }

        let mut slot = this.slot.borrow_mut();

        match slot.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}
