//! Testing utilities and harness for Composition Kit

pub mod capture_log;
pub mod fetch_gate;
pub mod surface;

pub use capture_log::{CapturedRecord, CapturingLog};
pub use fetch_gate::{FetchGate, GateWait};
pub use surface::{FakeView, RecordingSurface, ReusableCell};

pub mod prelude {
    pub use crate::capture_log::CapturingLog;
    pub use crate::fetch_gate::FetchGate;
    pub use crate::surface::{FakeView, RecordingSurface, ReusableCell};
}
