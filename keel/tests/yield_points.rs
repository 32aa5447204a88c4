use keel::{Handle, RuntimeBuilder, maybe_yield, when_all, without_yield_check, yield_now};

use std::cell::RefCell;
use std::future::Future as _;
use std::rc::Rc;
use std::time::Duration;

fn counting_fiber(
    handle: &Handle,
    name: &'static str,
    log: Rc<RefCell<Vec<&'static str>>>,
    guarded: bool,
) -> keel::Future<()> {
    handle.spawn(async move {
        let body = async {
            for _ in 0..5 {
                log.borrow_mut().push(name);
                maybe_yield().await;
            }
        };

        if guarded {
            without_yield_check(body).await;
        } else {
            body.await;
        }

        Ok(())
    })
}

#[keel::test(task_quota_us = 0)]
async fn test_maybe_yield_interleaves_fibers() {
    let handle = Handle::current();
    let log = Rc::new(RefCell::new(Vec::new()));

    let a = counting_fiber(&handle, "a", log.clone(), false);
    let b = counting_fiber(&handle, "b", log.clone(), false);

    for outcome in when_all(&handle, vec![a, b]).await.expect("when_all never fails") {
        outcome.expect("fiber failed");
    }

    let log = log.borrow();
    assert_eq!(log.len(), 10);
    assert_eq!(
        *log,
        vec!["a", "b", "a", "b", "a", "b", "a", "b", "a", "b"]
    );
}

#[keel::test(task_quota_us = 0)]
async fn test_without_yield_check_runs_to_completion() {
    let handle = Handle::current();
    let log = Rc::new(RefCell::new(Vec::new()));

    let a = counting_fiber(&handle, "a", log.clone(), true);
    let b = counting_fiber(&handle, "b", log.clone(), true);

    for outcome in when_all(&handle, vec![a, b]).await.expect("when_all never fails") {
        outcome.expect("fiber failed");
    }

    assert_eq!(
        *log.borrow(),
        vec!["a", "a", "a", "a", "a", "b", "b", "b", "b", "b"]
    );
}

#[keel::test]
async fn test_yield_now_lets_others_run() {
    let handle = Handle::current();
    let log = Rc::new(RefCell::new(Vec::new()));

    let other = log.clone();
    let spawned = handle.spawn(async move {
        other.borrow_mut().push("spawned");
        Ok(())
    });

    log.borrow_mut().push("before");
    yield_now().await;
    log.borrow_mut().push("after");

    spawned.await.expect("fiber failed");
    assert_eq!(*log.borrow(), vec!["before", "spawned", "after"]);
}

#[test]
fn test_handle_maybe_yield_follows_the_quota() {
    let relaxed = RuntimeBuilder::new()
        .task_quota(Duration::from_secs(3600))
        .build()
        .expect("failed to build runtime");
    assert!(relaxed.handle().maybe_yield().is_ready());

    let strict = RuntimeBuilder::new()
        .task_quota(Duration::ZERO)
        .build()
        .expect("failed to build runtime");
    assert!(strict.handle().need_preempt());
    assert!(!strict.handle().maybe_yield().is_ready());
}

#[test]
fn test_continuation_loop_yields_and_finishes() {
    let runtime = RuntimeBuilder::new()
        .task_quota(Duration::ZERO)
        .build()
        .expect("failed to build runtime");

    fn count_down(handle: Handle, left: u32, total: Rc<RefCell<u32>>) -> keel::Future<u32> {
        if left == 0 {
            let sum = *total.borrow();
            return handle.ready(sum);
        }

        *total.borrow_mut() += left;

        let next = handle.clone();
        handle
            .maybe_yield()
            .then(move |()| count_down(next, left - 1, total))
    }

    let sum = runtime
        .run(|handle| count_down(handle.clone(), 100, Rc::new(RefCell::new(0))))
        .expect("entry computation failed");

    assert_eq!(sum, 5050);
}

#[test]
fn test_maybe_yield_outside_a_runtime_is_a_no_op() {
    let mut fut = std::pin::pin!(maybe_yield());
    let waker = std::task::Waker::noop();
    let mut cx = std::task::Context::from_waker(waker);

    assert!(fut.as_mut().poll(&mut cx).is_ready());
}
