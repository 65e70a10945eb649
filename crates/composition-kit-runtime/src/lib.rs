#![doc = r"UI-thread runtime services shared by the Composition Kit crates."]

pub mod collections;
pub mod geometry;
pub mod logger;
pub mod owned;
pub mod platform;
pub mod runtime;

pub use geometry::{Axis, Point, Size};
pub use logger::Logger;
pub use owned::Owned;
pub use platform::{DefaultScheduler, FrameScheduler};
pub use runtime::{TaskHandle, TaskId, UiRuntime};
