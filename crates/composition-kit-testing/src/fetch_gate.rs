use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[derive(Default)]
struct GateState {
    released: Cell<bool>,
    started: Cell<usize>,
    waker: RefCell<Option<Waker>>,
}

/// Manually released stand-in for an asynchronous page load.
///
/// Fetch futures handed out by the gate stay pending until the test calls
/// [`release`](Self::release); driving the `UiRuntime` afterwards completes
/// them.
#[derive(Clone, Default)]
pub struct FetchGate {
    state: Rc<GateState>,
}

impl FetchGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait(&self) -> GateWait {
        GateWait { gate: self.clone() }
    }

    /// Fetch callback that counts invocations and waits on this gate.
    pub fn fetch_fn(&self) -> impl Fn() -> GateWait + 'static {
        let gate = self.clone();
        move || {
            gate.state.started.set(gate.state.started.get() + 1);
            gate.wait()
        }
    }

    /// How many times the callback from [`fetch_fn`](Self::fetch_fn) ran.
    pub fn started(&self) -> usize {
        self.state.started.get()
    }

    pub fn is_released(&self) -> bool {
        self.state.released.get()
    }

    /// True while a fetch is parked on the gate.
    pub fn has_waiter(&self) -> bool {
        self.state.waker.borrow().is_some()
    }

    pub fn release(&self) {
        self.state.released.set(true);
        let waker = self.state.waker.borrow_mut().take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Closes the gate again for the next fetch.
    pub fn reset(&self) {
        self.state.released.set(false);
    }
}

pub struct GateWait {
    gate: FetchGate,
}

impl Future for GateWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let state = &self.gate.state;
        if state.released.get() {
            state.waker.borrow_mut().take();
            Poll::Ready(())
        } else {
            *state.waker.borrow_mut() = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}
