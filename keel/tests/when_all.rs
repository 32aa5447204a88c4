use keel::time::sleep;
use keel::{Error, Handle, RuntimeBuilder, when_all};

use std::time::{Duration, Instant};

#[test]
fn test_when_all_of_nothing_is_ready() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");

    let mut all = when_all::<u32, _>(runtime.handle(), Vec::new());

    assert!(all.is_ready());
    assert!(all.get().expect("value expected").is_empty());
}

#[test]
fn test_when_all_keeps_input_order() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");

    let outcomes = runtime
        .run(|handle| {
            let slow = sleep(handle, Duration::from_millis(30)).map(|()| 1u32);
            let fast = handle.ready(2u32);
            let medium = sleep(handle, Duration::from_millis(10)).map(|()| 3u32);

            when_all(handle, vec![slow, fast, medium])
        })
        .expect("entry computation failed");

    let values: Vec<u32> = outcomes
        .into_iter()
        .map(|outcome| outcome.expect("value expected"))
        .collect();

    assert_eq!(values, vec![1, 2, 3]);
}

#[keel::test]
async fn test_when_all_waits_past_a_failure() {
    let handle = Handle::current();
    let start = Instant::now();

    let first = sleep(&handle, Duration::from_millis(10)).map(|()| 1u32);
    let failing = handle.failed::<u32>(Error::msg("middle"));
    let late = sleep(&handle, Duration::from_millis(60)).map(|()| 3u32);

    let all = when_all(&handle, vec![first, failing, late]);

    sleep(&handle, Duration::from_millis(20))
        .await
        .expect("sleep never fails");
    assert!(!all.is_ready(), "when_all completed before its last input");

    let outcomes = all.await.expect("when_all never fails");

    assert!(start.elapsed() >= Duration::from_millis(60));
    assert_eq!(outcomes.len(), 3);
    assert_eq!(*outcomes[0].as_ref().expect("value expected"), 1);
    assert_eq!(
        outcomes[1].as_ref().expect_err("failure expected").to_string(),
        "middle"
    );
    assert_eq!(*outcomes[2].as_ref().expect("value expected"), 3);
}

#[test]
fn test_when_both_mixes_types() {
    let runtime = RuntimeBuilder::new().build().expect("failed to build runtime");

    let (number, text) = runtime
        .run(|handle| keel::when_both(handle.ready(4u8), handle.ready("four")))
        .expect("entry computation failed");

    assert_eq!(number.expect("value expected"), 4);
    assert_eq!(text.expect("value expected"), "four");
}

#[keel::test]
async fn test_when_all_macro_collects_a_tuple() {
    let handle = Handle::current();

    let (a, b, c) = keel::when_all!(
        handle.ready(1u32),
        sleep(&handle, Duration::from_millis(5)).map(|()| "two"),
        handle.failed::<bool>(Error::TimedOut),
    )
    .await
    .expect("when_all! never fails");

    assert_eq!(a.expect("value expected"), 1);
    assert_eq!(b.expect("value expected"), "two");
    assert!(matches!(c, Err(Error::TimedOut)));
}

#[keel::test]
async fn test_when_all_macro_with_a_single_future() {
    let handle = Handle::current();

    let (only,) = keel::when_all!(handle.ready('x'))
        .await
        .expect("when_all! never fails");

    assert_eq!(only.expect("value expected"), 'x');
}

#[keel::test]
async fn test_when_all_macro_with_four_futures() {
    let handle = Handle::current();

    let (a, b, c, d) = keel::when_all!(
        handle.ready(1u8),
        handle.ready(2u16),
        handle.ready(3u32),
        handle.ready(4u64)
    )
    .await
    .expect("when_all! never fails");

    assert_eq!(
        (a.ok(), b.ok(), c.ok(), d.ok()),
        (Some(1), Some(2), Some(3), Some(4))
    );
}
