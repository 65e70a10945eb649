//! Platform abstraction traits for Composition Kit runtime services.
//!
//! The host owns the UI thread and its frame loop. These traits let the list
//! engine ask for more work to be done without depending on a concrete
//! windowing or event-loop implementation.

/// Schedules work on the host's UI thread.
///
/// Implementations are invoked from task wakers, which may fire on any
/// thread, so they must be safe to share across threads.
pub trait FrameScheduler: Send + Sync {
    /// Request that the host run another frame, during which it should call
    /// [`UiRuntime::poll_tasks`](crate::UiRuntime::poll_tasks).
    fn schedule_frame(&self);
}

/// Scheduler for hosts that poll the runtime on their own cadence.
#[derive(Debug, Default)]
pub struct DefaultScheduler;

impl FrameScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}
