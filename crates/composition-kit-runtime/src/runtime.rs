//! Single-threaded task queue for futures that must run on the UI thread.
//!
//! Futures spawned here may capture `Rc`/`RefCell` state because they are
//! only ever polled from the thread that owns the [`UiRuntime`]. When a task
//! is woken, the runtime asks the host's [`FrameScheduler`] for a frame; the
//! host then calls [`UiRuntime::poll_tasks`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::ThreadId;

use crate::platform::{DefaultScheduler, FrameScheduler};

pub type TaskId = u64;

struct TaskEntry {
    id: TaskId,
    future: Pin<Box<dyn Future<Output = ()> + 'static>>,
}

struct RuntimeInner {
    scheduler: Arc<dyn FrameScheduler>,
    tasks: RefCell<Vec<TaskEntry>>,
    polling: RefCell<Vec<TaskId>>,
    next_task_id: Cell<TaskId>,
    woken: Arc<AtomicBool>,
    task_waker: Waker,
    ui_thread_id: ThreadId,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn FrameScheduler>) -> Self {
        let woken = Arc::new(AtomicBool::new(false));
        let task_waker = RuntimeTaskWaker {
            scheduler: Arc::clone(&scheduler),
            woken: Arc::clone(&woken),
        }
        .into_waker();
        Self {
            scheduler,
            tasks: RefCell::new(Vec::new()),
            polling: RefCell::new(Vec::new()),
            next_task_id: Cell::new(1),
            woken,
            task_waker,
            ui_thread_id: std::thread::current().id(),
        }
    }

    fn spawn_ui_task(&self, future: Pin<Box<dyn Future<Output = ()> + 'static>>) -> TaskId {
        debug_assert_eq!(
            std::thread::current().id(),
            self.ui_thread_id,
            "UI task spawned off the runtime thread"
        );
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskEntry { id, future });
        self.woken.store(true, Ordering::SeqCst);
        self.scheduler.schedule_frame();
        id
    }

    fn contains_task(&self, id: TaskId) -> bool {
        self.polling.borrow().contains(&id)
            || self.tasks.borrow().iter().any(|entry| entry.id == id)
    }

    fn poll_async_tasks(&self) -> bool {
        self.woken.store(false, Ordering::SeqCst);
        let mut cx = Context::from_waker(&self.task_waker);
        // Take the queue so tasks can spawn more tasks while being polled.
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        *self.polling.borrow_mut() = tasks.iter().map(|entry| entry.id).collect();
        let mut pending = Vec::with_capacity(tasks.len());
        let mut made_progress = false;
        for mut entry in tasks.into_iter() {
            let poll = entry.future.as_mut().poll(&mut cx);
            self.polling.borrow_mut().retain(|id| *id != entry.id);
            match poll {
                Poll::Ready(()) => {
                    made_progress = true;
                }
                Poll::Pending => {
                    pending.push(entry);
                }
            }
        }
        if !pending.is_empty() {
            let mut tasks = self.tasks.borrow_mut();
            let spawned = std::mem::take(&mut *tasks);
            tasks.extend(pending);
            tasks.extend(spawned);
        }
        made_progress
    }
}

/// Handle to the UI-thread task queue.
///
/// Cloning is cheap; all clones share the same queue.
#[derive(Clone)]
pub struct UiRuntime {
    inner: Rc<RuntimeInner>,
}

impl fmt::Debug for UiRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiRuntime")
            .field("pending_tasks", &self.pending_task_count())
            .finish()
    }
}

impl Default for UiRuntime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

impl UiRuntime {
    pub fn new(scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    /// Queues `fut` to be polled on the next [`poll_tasks`](Self::poll_tasks).
    pub fn spawn_ui<F>(&self, fut: F) -> TaskHandle
    where
        F: Future<Output = ()> + 'static,
    {
        let id = self.inner.spawn_ui_task(Box::pin(fut));
        TaskHandle {
            id,
            runtime: Rc::downgrade(&self.inner),
        }
    }

    /// Polls every queued task once. Returns true if any task completed.
    pub fn poll_tasks(&self) -> bool {
        self.inner.poll_async_tasks()
    }

    /// Polls until a full pass neither completes a task nor receives a wake.
    pub fn run_until_stalled(&self) {
        loop {
            let progressed = self.poll_tasks();
            let woken = self.inner.woken.load(Ordering::SeqCst);
            if !progressed && !woken {
                break;
            }
        }
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.pending_task_count() > 0
    }

    pub fn pending_task_count(&self) -> usize {
        self.inner
            .tasks
            .try_borrow()
            .map(|tasks| tasks.len())
            .unwrap_or(0)
    }

    /// True if a task was woken or spawned since the last poll.
    pub fn needs_poll(&self) -> bool {
        self.inner.woken.load(Ordering::SeqCst)
    }
}

/// Handle to a spawned UI task.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    runtime: Weak<RuntimeInner>,
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").field("id", &self.id).finish()
    }
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// True until the task completes.
    pub fn is_pending(&self) -> bool {
        self.runtime
            .upgrade()
            .map(|inner| inner.contains_task(self.id))
            .unwrap_or(false)
    }
}

struct RuntimeTaskWaker {
    scheduler: Arc<dyn FrameScheduler>,
    woken: Arc<AtomicBool>,
}

impl RuntimeTaskWaker {
    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::SeqCst);
        arc_self.scheduler.schedule_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingScheduler {
        frames: AtomicUsize,
    }

    impl FrameScheduler for CountingScheduler {
        fn schedule_frame(&self) {
            self.frames.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Future that returns Pending once, waking itself, then completes.
    struct YieldOnce {
        yielded: bool,
    }

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.yielded {
                Poll::Ready(())
            } else {
                self.yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[test]
    fn spawned_task_runs_on_poll() {
        let runtime = UiRuntime::default();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let handle = runtime.spawn_ui(async move {
            flag.set(true);
        });

        assert!(handle.is_pending());
        assert!(!ran.get());
        assert!(runtime.poll_tasks());
        assert!(ran.get());
        assert!(!handle.is_pending());
        assert!(!runtime.has_pending_tasks());
    }

    #[test]
    fn spawn_and_wake_schedule_frames() {
        let scheduler = Arc::new(CountingScheduler::default());
        let runtime = UiRuntime::new(scheduler.clone());
        runtime.spawn_ui(YieldOnce { yielded: false });
        assert_eq!(scheduler.frames.load(Ordering::SeqCst), 1);

        assert!(!runtime.poll_tasks());
        assert_eq!(scheduler.frames.load(Ordering::SeqCst), 2);
        assert!(runtime.needs_poll());

        runtime.run_until_stalled();
        assert!(!runtime.has_pending_tasks());
    }

    #[test]
    fn tasks_may_spawn_tasks_while_polled() {
        let runtime = UiRuntime::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        let inner_runtime = runtime.clone();
        let outer_order = Rc::clone(&order);
        runtime.spawn_ui(async move {
            outer_order.borrow_mut().push("outer");
            let nested_order = Rc::clone(&outer_order);
            inner_runtime.spawn_ui(async move {
                nested_order.borrow_mut().push("inner");
            });
        });

        runtime.run_until_stalled();
        assert_eq!(*order.borrow(), vec!["outer", "inner"]);
    }
}
