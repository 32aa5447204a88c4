use super::{Future, Promise, make_pair};
use crate::error::{Error, Result};
use crate::runtime::Handle;

use std::cell::RefCell;
use std::rc::Rc;

/// Fan-in state shared by the continuations of `when_all`.
struct Gather<T: 'static> {
    slots: Vec<Option<Result<T>>>,
    remaining: usize,
    promise: Option<Promise<Vec<Result<T>>>>,
}

/// Waits for every future and collects their outcomes in input order.
///
/// The combined future never fails and never completes early: a failure
/// at one position is stored there while the others keep running.
pub fn when_all<T, I>(handle: &Handle, futures: I) -> Future<Vec<Result<T>>>
where
    T: 'static,
    I: IntoIterator<Item = Future<T>>,
{
    let futures: Vec<Future<T>> = futures.into_iter().collect();

    if futures.is_empty() {
        return handle.ready(Vec::new());
    }

    let (promise, result) = make_pair(handle);

    let gather = Rc::new(RefCell::new(Gather {
        slots: futures.iter().map(|_| None).collect(),
        remaining: futures.len(),
        promise: Some(promise),
    }));

    for (index, future) in futures.into_iter().enumerate() {
        let gather = gather.clone();

        future.on_complete(move |outcome| {
            let finished = {
                let mut gather = gather.borrow_mut();
                gather.slots[index] = Some(outcome);
                gather.remaining -= 1;

                if gather.remaining == 0 {
                    let slots = std::mem::take(&mut gather.slots);
                    gather.promise.take().map(|promise| (promise, slots))
                } else {
                    None
                }
            };

            if let Some((promise, slots)) = finished {
                let outcomes = slots
                    .into_iter()
                    .map(|slot| slot.unwrap_or(Err(Error::BrokenPromise)))
                    .collect();
                let _ = promise.resolve(outcomes);
            }
        });
    }

    result
}

struct Both<A: 'static, B: 'static> {
    first: Option<Result<A>>,
    second: Option<Result<B>>,
    promise: Option<Promise<(Result<A>, Result<B>)>>,
}

impl<A: 'static, B: 'static> Both<A, B> {
    fn try_finish(&mut self) {
        if self.first.is_none() || self.second.is_none() {
            return;
        }

        if let (Some(first), Some(second), Some(promise)) =
            (self.first.take(), self.second.take(), self.promise.take())
        {
            let _ = promise.resolve((first, second));
        }
    }
}

/// Waits for two futures of different types.
pub fn when_both<A, B>(first: Future<A>, second: Future<B>) -> Future<(Result<A>, Result<B>)>
where
    A: 'static,
    B: 'static,
{
    let (promise, result) = make_pair(first.handle());

    let both = Rc::new(RefCell::new(Both {
        first: None,
        second: None,
        promise: Some(promise),
    }));

    let left = both.clone();
    first.on_complete(move |outcome| {
        let mut both = left.borrow_mut();
        both.first = Some(outcome);
        both.try_finish();
    });

    second.on_complete(move |outcome| {
        let mut both = both.borrow_mut();
        both.second = Some(outcome);
        both.try_finish();
    });

    result
}
