use keel::{Error, RuntimeBuilder, make_pair};

use std::cell::Cell;
use std::rc::Rc;

#[test]
fn test_get_before_resolution_is_not_ready() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let (promise, mut future) = make_pair::<u32>(runtime.handle());

    assert!(!future.is_ready());
    assert!(matches!(future.get(), Err(Error::NotReady)));

    promise.resolve(7).expect("first resolution must succeed");

    assert!(future.is_ready());
    assert_eq!(future.get().expect("value expected"), 7);
}

#[test]
fn test_second_get_reports_already_consumed() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let mut future = runtime.handle().ready("once");

    assert_eq!(future.get().expect("value expected"), "once");
    assert!(matches!(future.get(), Err(Error::AlreadyConsumed)));
    assert!(!future.is_ready());
}

#[test]
fn test_second_resolution_is_rejected() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let (promise, mut future) = runtime.handle().make_pair::<u32>();

    promise.resolve(1).expect("first resolution must succeed");
    assert!(matches!(promise.resolve(2), Err(Error::AlreadyResolved)));
    assert!(matches!(promise.fail(Error::msg("late")), Err(Error::AlreadyResolved)));
    assert!(promise.is_resolved());

    assert_eq!(future.get().expect("value expected"), 1);
}

#[test]
fn test_dropped_promise_breaks_the_future() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let (promise, mut future) = runtime.handle().make_pair::<u32>();

    drop(promise);

    assert!(future.is_failed());
    assert!(matches!(future.get(), Err(Error::BrokenPromise)));
}

#[test]
fn test_failed_future_carries_its_error() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let mut future = runtime.handle().failed::<u32>(Error::msg("boom"));

    assert!(future.is_ready());
    assert!(future.is_failed());

    let err = future.get().expect_err("failure expected");
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn test_ignore_ready_future_discards_failure() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let future = runtime.handle().failed::<()>(Error::msg("ignored"));

    future.ignore_ready_future();
}

#[test]
fn test_continuation_is_never_run_inline() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let ran = Rc::new(Cell::new(false));

    let value = runtime
        .run(|handle| {
            let flag = ran.clone();
            let chained = handle.ready(20).map(move |v| {
                flag.set(true);
                v + 1
            });

            assert!(!ran.get(), "continuation ran in the caller's stack");
            chained
        })
        .expect("entry computation failed");

    assert!(ran.get());
    assert_eq!(value, 21);
}

#[test]
fn test_resolving_a_waited_promise_defers_the_continuation() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let ran = Rc::new(Cell::new(false));

    let value = runtime
        .run(|handle| {
            let (promise, future) = handle.make_pair::<u32>();

            let flag = ran.clone();
            let chained = future.map(move |v| {
                flag.set(true);
                v * 2
            });

            promise.resolve(21).expect("first resolution must succeed");
            assert!(!ran.get(), "continuation ran inside resolve");

            chained
        })
        .expect("entry computation failed");

    assert!(ran.get());
    assert_eq!(value, 42);
}

#[test]
fn test_futurize_captures_the_outcome() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let handle = runtime.handle();

    let mut ok = handle.futurize(|| Ok(5u8));
    let mut failed = handle.futurize::<u8, _>(|| Err(Error::msg("nope")));

    assert_eq!(ok.get().expect("value expected"), 5);
    assert!(failed.is_failed());
    assert!(failed.get().is_err());
}

#[keel::test]
async fn test_await_resolves_with_the_promised_value() {
    let handle = keel::Handle::current();
    let (promise, future) = handle.make_pair::<String>();

    handle.spawn_detached(async move {
        keel::yield_now().await;
        let _ = promise.resolve("hello".to_string());
    });

    assert_eq!(future.await.expect("value expected"), "hello");
}
