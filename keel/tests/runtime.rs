use keel::{Error, Handle, RuntimeBuilder};

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn test_block_on_returns_the_body_output() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");

    let result = runtime.block_on(async { 42 }).expect("runtime stalled");

    assert_eq!(result, 42);
}

#[test]
fn test_spawn_returns_the_fiber_outcome() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");

    let value = runtime
        .run(|handle| {
            let inner = handle.clone();
            handle.spawn(async move {
                let a = inner.ready(20).await?;
                let b = inner.ready(22).await?;
                Ok::<_, Error>(a + b)
            })
        })
        .expect("entry computation failed");

    assert_eq!(value, 42);
}

#[test]
fn test_spawn_propagates_a_fiber_failure() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");

    let outcome = runtime.run(|handle| {
        let inner = handle.clone();
        handle.spawn(async move {
            inner.failed::<u32>(Error::msg("inside fiber")).await?;
            Ok::<_, Error>(())
        })
    });

    assert_eq!(
        outcome.expect_err("failure expected").to_string(),
        "inside fiber"
    );
}

#[test]
fn test_stalled_entry_is_reported() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let mut parked = None;

    let outcome = runtime.run(|handle| {
        let (promise, future) = handle.make_pair::<u32>();
        parked = Some(promise);
        future
    });

    assert!(matches!(outcome, Err(Error::Stalled)));
    drop(parked);
}

#[test]
fn test_run_until_idle_drains_detached_work() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
    let finished = Rc::new(Cell::new(0));

    for millis in [1, 5, 10] {
        let finished = finished.clone();
        let handle = runtime.handle().clone();

        runtime.handle().spawn_detached(async move {
            let _ = keel::time::sleep(&handle, Duration::from_millis(millis)).await;
            finished.set(finished.get() + 1);
        });
    }

    runtime.run_until_idle().expect("loop failed");

    assert_eq!(finished.get(), 3);
}

#[test]
fn test_runtime_can_be_driven_repeatedly() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");

    for i in 0..3u32 {
        let value = runtime
            .run(|handle| handle.ready(i).map(|v| v + 1))
            .expect("entry computation failed");
        assert_eq!(value, i + 1);
    }
}

#[test]
fn test_current_handle_is_installed_while_running() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");

    assert!(Handle::try_current().is_none());

    let inside = runtime
        .block_on(async { Handle::try_current().is_some() })
        .expect("runtime stalled");

    assert!(inside);
    assert!(Handle::try_current().is_none());
}

#[test]
fn test_dropping_the_runtime_releases_pending_work() {
    let dropped = Rc::new(Cell::new(false));

    struct Flag(Rc<Cell<bool>>);

    impl Drop for Flag {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    {
        let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");
        let handle = runtime.handle().clone();
        let flag = Flag(dropped.clone());

        runtime.handle().spawn_detached(async move {
            let _flag = flag;
            let _ = keel::time::sleep(&handle, Duration::from_secs(3600)).await;
        });
    }

    assert!(dropped.get());
}

#[test]
#[should_panic(expected = "event_capacity")]
fn test_zero_event_capacity_is_rejected() {
    let _ = RuntimeBuilder::new().event_capacity(0);
}
