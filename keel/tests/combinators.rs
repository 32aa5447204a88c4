use keel::{Error, Future, Handle, RuntimeBuilder};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn runtime() -> keel::Runtime {
    RuntimeBuilder::new().build().expect("failed to build runtime")
}

#[test]
fn test_then_flattens_a_returned_future() {
    let value = runtime()
        .run(|handle| {
            let inner = handle.clone();
            handle
                .ready(2)
                .then(move |v| inner.ready(v * 10))
                .then(|v| Ok(v + 1))
        })
        .expect("entry computation failed");

    assert_eq!(value, 21);
}

#[test]
fn test_then_skips_the_callback_on_failure() {
    let called = Rc::new(Cell::new(false));
    let flag = called.clone();

    let outcome = runtime().run(move |handle| {
        handle.failed::<u32>(Error::msg("first")).then(move |v| {
            flag.set(true);
            Ok(v + 1)
        })
    });

    assert!(!called.get());
    assert_eq!(outcome.expect_err("failure expected").to_string(), "first");
}

#[test]
fn test_then_propagates_a_callback_failure() {
    let outcome = runtime().run(|handle| {
        handle
            .ready(1)
            .then(|_| Err::<u32, _>(Error::msg("from callback")))
            .map(|v| v + 1)
    });

    assert_eq!(
        outcome.expect_err("failure expected").to_string(),
        "from callback"
    );
}

#[test]
fn test_then_accepts_unit_callbacks() {
    let seen = Rc::new(Cell::new(0));
    let sink = seen.clone();

    runtime()
        .run(move |handle| handle.ready(9).then(move |v| sink.set(v)))
        .expect("entry computation failed");

    assert_eq!(seen.get(), 9);
}

#[test]
fn test_then_wrapped_observes_failures() {
    let observed = runtime()
        .run(|handle| {
            handle
                .failed::<u32>(Error::TimedOut)
                .then_wrapped(|mut f: Future<u32>| Ok(matches!(f.get(), Err(Error::TimedOut))))
        })
        .expect("entry computation failed");

    assert!(observed);
}

#[test]
fn test_then_wrapped_observes_values() {
    let value = runtime()
        .run(|handle| handle.ready(3).then_wrapped(|mut f| f.get().map(|v| v * 3)))
        .expect("entry computation failed");

    assert_eq!(value, 9);
}

#[test]
fn test_handle_exception_recovers() {
    let value = runtime()
        .run(|handle| {
            handle
                .failed::<u32>(Error::msg("broken"))
                .handle_exception(|err| {
                    assert_eq!(err.to_string(), "broken");
                    Ok(0)
                })
        })
        .expect("entry computation failed");

    assert_eq!(value, 0);
}

#[test]
fn test_handle_exception_passes_values_through() {
    let value = runtime()
        .run(|handle| {
            handle
                .ready(5u32)
                .handle_exception(|_| -> keel::Result<u32> { panic!("must not run") })
        })
        .expect("entry computation failed");

    assert_eq!(value, 5);
}

#[test]
fn test_finally_runs_once_and_keeps_the_value() {
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();

    let value = runtime()
        .run(move |handle| handle.ready("kept").finally(move || counter.set(counter.get() + 1)))
        .expect("entry computation failed");

    assert_eq!(value, "kept");
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_finally_runs_once_and_keeps_the_failure() {
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();

    let outcome = runtime().run(move |handle| {
        handle
            .failed::<u32>(Error::msg("original"))
            .finally(move || counter.set(counter.get() + 1))
    });

    assert_eq!(outcome.expect_err("failure expected").to_string(), "original");
    assert_eq!(runs.get(), 1);
}

#[test]
fn test_finally_waits_for_a_returned_future() {
    let order = Rc::new(RefCell::new(Vec::new()));

    let cleanup = order.clone();
    let after = order.clone();

    runtime()
        .run(move |handle| {
            let inner = handle.clone();
            handle
                .ready(())
                .finally(move || {
                    let log = cleanup.clone();
                    keel::time::sleep(&inner, std::time::Duration::from_millis(5))
                        .map(move |()| log.borrow_mut().push("cleanup"))
                })
                .map(move |()| after.borrow_mut().push("after"))
        })
        .expect("entry computation failed");

    assert_eq!(*order.borrow(), vec!["cleanup", "after"]);
}

#[test]
fn test_finally_failure_keeps_the_original_outcome() {
    let value = runtime()
        .run(|handle| {
            handle
                .ready(11)
                .finally(|| Err::<(), _>(Error::msg("cleanup failed")))
        })
        .expect("entry computation failed");

    assert_eq!(value, 11);
}

#[test]
fn test_discard_result_keeps_failures() {
    let runtime = runtime();

    runtime
        .run(|handle| handle.ready(vec![1, 2, 3]).discard_result())
        .expect("entry computation failed");

    let outcome = runtime.run(|handle| handle.failed::<u32>(Error::msg("lost")).discard_result());
    assert_eq!(outcome.expect_err("failure expected").to_string(), "lost");
}

#[test]
fn test_chain_runs_steps_in_order() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let step = |log: &Rc<RefCell<Vec<u32>>>, n: u32| {
        let log = log.clone();
        move |_: ()| log.borrow_mut().push(n)
    };

    runtime()
        .run(|handle: &Handle| {
            handle
                .ready(())
                .map(step(&log, 1))
                .map(step(&log, 2))
                .map(step(&log, 3))
        })
        .expect("entry computation failed");

    assert_eq!(*log.borrow(), vec![1, 2, 3]);
}
