use crate::error::{Error, Result};

/// Deferred work waiting on a cell: receives the terminal outcome.
pub(crate) type Continuation<T> = Box<dyn FnOnce(Result<T>)>;

/// The state of one asynchronous computation.
///
/// A cell leaves `Pending` exactly once. `Taken` marks a terminal outcome
/// that has already been handed over to its single consumer.
pub(crate) enum State<T> {
    /// Not resolved yet; may hold the single attached continuation.
    Pending(Option<Continuation<T>>),

    /// Resolved with a value.
    Ready(T),

    /// Resolved with a failure.
    Failed(Error),

    /// The outcome was moved out.
    Taken,
}

/// What the resolving side has to do after a successful transition.
pub(crate) enum Completion<T> {
    /// No continuation was attached; the outcome stays in the cell.
    Stored,

    /// A continuation was waiting and must be queued with the outcome.
    Wake(Continuation<T>, Result<T>),
}

/// Shared cell between one [`Promise`](super::Promise) and one
/// [`Future`](super::Future).
pub(crate) struct ResultCell<T> {
    state: State<T>,

    /// Set when the future was dropped without reading the outcome.
    abandoned: bool,
}

impl<T> ResultCell<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: State::Pending(None),
            abandoned: false,
        }
    }

    pub(crate) fn with_outcome(outcome: Result<T>) -> Self {
        let state = match outcome {
            Ok(value) => State::Ready(value),
            Err(err) => State::Failed(err),
        };

        Self {
            state,
            abandoned: false,
        }
    }

    pub(crate) fn abandon(&mut self) {
        self.abandoned = true;
    }

    pub(crate) fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending(_))
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_) | State::Failed(_))
    }

    pub(crate) fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed(_))
    }

    /// Moves `Pending` to a terminal state.
    ///
    /// Fails with [`Error::AlreadyResolved`] once the cell has left `Pending`;
    /// the first outcome is kept.
    pub(crate) fn complete(&mut self, outcome: Result<T>) -> Result<Completion<T>> {
        match &mut self.state {
            State::Pending(continuation) => match continuation.take() {
                Some(continuation) => {
                    self.state = State::Taken;
                    Ok(Completion::Wake(continuation, outcome))
                }
                None => {
                    self.state = match outcome {
                        Ok(value) => State::Ready(value),
                        Err(err) => State::Failed(err),
                    };
                    Ok(Completion::Stored)
                }
            },
            _ => Err(Error::AlreadyResolved),
        }
    }

    /// Attaches the continuation.
    ///
    /// Returns the continuation together with the outcome when the cell is
    /// already terminal, so the caller can queue it instead of running it inline.
    pub(crate) fn attach(
        &mut self,
        continuation: Continuation<T>,
    ) -> Option<(Continuation<T>, Result<T>)> {
        match &mut self.state {
            State::Pending(slot) => {
                debug_assert!(slot.is_none(), "future has a continuation already");
                *slot = Some(continuation);
                None
            }
            State::Taken => Some((continuation, Err(Error::AlreadyConsumed))),
            _ => {
                let outcome = self.take();
                outcome.map(|outcome| (continuation, outcome))
            }
        }
    }

    /// Moves a terminal outcome out of the cell.
    pub(crate) fn take(&mut self) -> Option<Result<T>> {
        match std::mem::replace(&mut self.state, State::Taken) {
            State::Ready(value) => Some(Ok(value)),
            State::Failed(err) => Some(Err(err)),
            other => {
                self.state = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_complete_without_continuation_stores_value() {
        let mut cell = ResultCell::new();

        assert!(cell.is_pending());
        assert!(matches!(cell.complete(Ok(7)), Ok(Completion::Stored)));
        assert!(cell.is_ready());
        assert!(matches!(cell.take(), Some(Ok(7))));
        assert!(cell.take().is_none());
    }

    #[test]
    fn test_second_completion_keeps_first_outcome() {
        let mut cell = ResultCell::new();

        cell.complete(Ok(1)).unwrap();
        let second = cell.complete(Err(Error::msg("late")));

        assert!(matches!(second, Err(Error::AlreadyResolved)));
        assert!(matches!(cell.take(), Some(Ok(1))));
    }

    #[test]
    fn test_complete_hands_back_attached_continuation() {
        let seen = Rc::new(RefCell::new(None));
        let mut cell = ResultCell::<u32>::new();

        let sink = seen.clone();
        assert!(
            cell.attach(Box::new(move |outcome| {
                *sink.borrow_mut() = outcome.ok();
            }))
            .is_none()
        );

        match cell.complete(Ok(3)).unwrap() {
            Completion::Wake(continuation, outcome) => continuation(outcome),
            Completion::Stored => panic!("continuation was lost"),
        }

        assert_eq!(*seen.borrow(), Some(3));
        assert!(!cell.is_pending());
    }

    #[test]
    fn test_attach_to_failed_cell_returns_outcome() {
        let mut cell = ResultCell::<()>::with_outcome(Err(Error::msg("boom")));

        assert!(cell.is_failed());

        let (_, outcome) = cell.attach(Box::new(|_| {})).unwrap();
        assert_eq!(outcome.unwrap_err().to_string(), "boom");
    }
}
