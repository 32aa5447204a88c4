use crate::runtime::injector::Injector;

use std::mem;
use std::sync::Arc;
use std::task::{RawWaker, RawWakerVTable, Waker};

/// Wake target of one fiber: its id in the task slab and the injector to
/// report it to.
struct TaskWaker {
    task: usize,
    injector: Arc<Injector>,
}

impl TaskWaker {
    fn wake(&self) {
        self.injector.push(self.task);
    }
}

static VTABLE: RawWakerVTable = RawWakerVTable::new(clone_raw, wake_raw, wake_by_ref_raw, drop_raw);

/// Creates the [`Waker`] handed to fiber `task` while it is polled.
///
/// # Safety
///
/// The data pointer always originates from `Arc::into_raw` on a
/// `TaskWaker`, and every vtable entry keeps the reference count balanced.
pub(crate) fn make_waker(task: usize, injector: Arc<Injector>) -> Waker {
    let waker = Arc::new(TaskWaker { task, injector });

    unsafe { Waker::from_raw(RawWaker::new(Arc::into_raw(waker) as *const (), &VTABLE)) }
}

fn clone_raw(ptr: *const ()) -> RawWaker {
    let arc = unsafe { Arc::<TaskWaker>::from_raw(ptr as *const TaskWaker) };
    let cloned = arc.clone();
    mem::forget(arc);

    RawWaker::new(Arc::into_raw(cloned) as *const (), &VTABLE)
}

fn wake_raw(ptr: *const ()) {
    let arc = unsafe { Arc::<TaskWaker>::from_raw(ptr as *const TaskWaker) };
    arc.wake();
}

fn wake_by_ref_raw(ptr: *const ()) {
    let arc = unsafe { Arc::<TaskWaker>::from_raw(ptr as *const TaskWaker) };
    arc.wake();
    mem::forget(arc);
}

fn drop_raw(ptr: *const ()) {
    unsafe { drop(Arc::<TaskWaker>::from_raw(ptr as *const TaskWaker)) };
}
