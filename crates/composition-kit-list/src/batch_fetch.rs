//! Decides when to load the next page of a list from scroll position.
//!
//! The trigger watches scroll metrics pushed by a surface. Once the reader is
//! within `leading_screens` viewports of the tracked edge it runs the
//! installed fetch callback on the UI runtime. At most one fetch is in flight
//! at a time; observations made while fetching still move the recorded
//! position but never start a second fetch.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use composition_kit_runtime::{Axis, Logger, Owned, Point, Size, UiRuntime};
use web_time::Instant;

use crate::surface::{ScrollMetrics, ScrollObserver};

pub type FetchFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Starts one batch fetch. The returned future completes when the fetch is
/// done, successful or not.
pub type FetchCallback = Rc<dyn Fn() -> FetchFuture>;

/// Edge of the content the trigger loads more items for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackingDirection {
    /// Top edge of vertical content.
    Up,
    /// Bottom edge of vertical content.
    #[default]
    Down,
    /// Trailing edge of horizontal content.
    Right,
}

impl TrackingDirection {
    pub fn axis(self) -> Axis {
        match self {
            TrackingDirection::Up | TrackingDirection::Down => Axis::Vertical,
            TrackingDirection::Right => Axis::Horizontal,
        }
    }

    /// True if moving from `old` to `new` scrolls toward the tracked edge.
    pub fn is_match(self, old: Point, new: Point) -> bool {
        match self {
            TrackingDirection::Up => new.y < old.y,
            TrackingDirection::Down => new.y > old.y,
            TrackingDirection::Right => new.x > old.x,
        }
    }

    /// Distance left to scroll before the tracked edge is reached.
    pub fn remaining_distance(self, metrics: &ScrollMetrics) -> f32 {
        let axis = self.axis();
        let offset = axis.of_point(metrics.offset);
        match self {
            TrackingDirection::Up => offset,
            TrackingDirection::Down | TrackingDirection::Right => {
                axis.of_size(metrics.content_size) - axis.of_size(metrics.viewport_size) - offset
            }
        }
    }

    /// Content shorter than the viewport pins the offset at zero, so the
    /// distance check alone would never fire for it.
    fn has_small_content(self, metrics: &ScrollMetrics) -> bool {
        let axis = self.axis();
        axis.of_point(metrics.offset) == 0.0
            && axis.of_size(metrics.content_size) < axis.of_size(metrics.viewport_size)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchFetchConfig {
    pub direction: TrackingDirection,
    /// How many viewport lengths before the edge a fetch starts.
    pub leading_screens: f32,
    pub enabled: bool,
}

impl Default for BatchFetchConfig {
    fn default() -> Self {
        Self {
            direction: TrackingDirection::Down,
            leading_screens: 2.0,
            enabled: true,
        }
    }
}

impl BatchFetchConfig {
    pub fn new(direction: TrackingDirection) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn with_leading_screens(mut self, leading_screens: f32) -> Self {
        self.leading_screens = leading_screens;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchPhase {
    #[default]
    Idle,
    Fetching,
}

#[derive(Default)]
struct TriggerState {
    phase: FetchPhase,
    last_offset: Option<Point>,
    enabled: bool,
    on_fetch: Option<FetchCallback>,
    fetch_count: u64,
}

/// Single-flight batch-fetch state machine.
///
/// Cloning is cheap; clones share state, which is how the scroll observer
/// handed to a surface drives the same trigger.
#[derive(Clone)]
pub struct BatchFetchTrigger {
    direction: TrackingDirection,
    leading_screens: f32,
    state: Owned<TriggerState>,
    runtime: UiRuntime,
    logger: Logger,
}

impl fmt::Debug for BatchFetchTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("BatchFetchTrigger")
            .field("direction", &self.direction)
            .field("leading_screens", &self.leading_screens)
            .field("phase", &state.phase)
            .field("enabled", &state.enabled)
            .field("last_offset", &state.last_offset)
            .field("fetch_count", &state.fetch_count)
            .finish()
    }
}

impl BatchFetchTrigger {
    pub fn new(config: BatchFetchConfig, runtime: UiRuntime, logger: Logger) -> Self {
        Self {
            direction: config.direction,
            leading_screens: config.leading_screens,
            state: Owned::new(TriggerState {
                enabled: config.enabled,
                ..TriggerState::default()
            }),
            runtime,
            logger,
        }
    }

    /// Installs the fetch callback, replacing any previous one. A fetch that
    /// is already running is unaffected.
    pub fn set_on_batch_fetch<F, Fut>(&self, on_fetch: F)
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let callback: FetchCallback = Rc::new(move || Box::pin(on_fetch()) as FetchFuture);
        self.state.update(|state| state.on_fetch = Some(callback));
    }

    pub fn clear_on_batch_fetch(&self) {
        self.state.update(|state| state.on_fetch = None);
    }

    /// Gates automatic fetches only; scroll position keeps being tracked.
    pub fn set_enabled(&self, enabled: bool) {
        self.state.update(|state| state.enabled = enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.state.with(|state| state.enabled)
    }

    pub fn phase(&self) -> FetchPhase {
        self.state.with(|state| state.phase)
    }

    pub fn is_fetching(&self) -> bool {
        self.phase() == FetchPhase::Fetching
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> u64 {
        self.state.with(|state| state.fetch_count)
    }

    pub fn last_offset(&self) -> Option<Point> {
        self.state.with(|state| state.last_offset)
    }

    pub fn direction(&self) -> TrackingDirection {
        self.direction
    }

    pub fn leading_screens(&self) -> f32 {
        self.leading_screens
    }

    /// Feeds one scroll observation. Returns true if it started a fetch.
    ///
    /// The first observation only records the offset.
    pub fn did_scroll(&self, metrics: ScrollMetrics) -> bool {
        let enabled = {
            let mut state = self.state.borrow_mut();
            let Some(previous) = state.last_offset.replace(metrics.offset) else {
                return false;
            };
            if !self.direction.is_match(previous, metrics.offset) {
                return false;
            }
            state.enabled
        };

        if self.leading_screens <= 0.0 && metrics.viewport_size == Size::ZERO {
            return false;
        }

        let viewport = self.direction.axis().of_size(metrics.viewport_size);
        let trigger_distance = viewport * self.leading_screens;
        let eligible = self.direction.has_small_content(&metrics)
            || self.direction.remaining_distance(&metrics) <= trigger_distance;

        if !eligible || !enabled {
            return false;
        }
        self.start_fetch()
    }

    /// Starts a fetch regardless of position or the enabled flag. Still a
    /// no-op while a fetch is running or when no callback is installed.
    pub fn trigger_manually(&self) -> bool {
        self.start_fetch()
    }

    /// Observer that forwards a surface's scroll metrics to this trigger.
    pub fn observer(&self) -> ScrollObserver {
        let trigger = self.clone();
        Box::new(move |metrics| {
            trigger.did_scroll(metrics);
        })
    }

    fn start_fetch(&self) -> bool {
        let callback = {
            let state = self.state.borrow();
            if state.phase == FetchPhase::Fetching {
                return false;
            }
            match state.on_fetch.clone() {
                Some(callback) => callback,
                None => return false,
            }
        };

        let fetch_number = self.state.update(|state| {
            state.phase = FetchPhase::Fetching;
            state.fetch_count += 1;
            state.fetch_count
        });
        self.logger
            .debug(format_args!("batch fetch #{fetch_number} started"));

        // The callback runs with no borrow held so it may query the trigger.
        let fetch = callback();
        let state = self.state.clone();
        let logger = self.logger.clone();
        let started = Instant::now();
        self.runtime.spawn_ui(async move {
            fetch.await;
            state.update(|state| state.phase = FetchPhase::Idle);
            logger.debug(format_args!(
                "batch fetch #{fetch_number} finished in {:?}",
                started.elapsed()
            ));
        });
        true
    }
}
