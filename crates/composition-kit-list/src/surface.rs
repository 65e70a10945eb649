//! Contract between the list engine and the view system that draws cells.
//!
//! The engine never lays out or draws anything itself. A surface keeps pools
//! of reusable cells per [`CellKind`], applies positional updates, and pushes
//! scroll metrics to an observer registered by the engine.

use std::fmt;

use composition_kit_runtime::{Point, Size};

use crate::identity::{CellKind, IndexPath};
use crate::snapshot::SectionCounts;

/// Positional changes for a surface, derived from a
/// [`SnapshotDiff`](crate::SnapshotDiff).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceUpdate {
    /// Old section indices.
    pub deleted_sections: Vec<usize>,
    /// New section indices.
    pub inserted_sections: Vec<usize>,
    pub moved_sections: Vec<(usize, usize)>,
    /// Old index paths.
    pub deleted_items: Vec<IndexPath>,
    /// New index paths.
    pub inserted_items: Vec<IndexPath>,
    pub moved_items: Vec<(IndexPath, IndexPath)>,
    /// Item count of every section once the update is applied.
    pub section_counts: SectionCounts,
}

impl SurfaceUpdate {
    pub fn is_empty(&self) -> bool {
        self.deleted_sections.is_empty()
            && self.inserted_sections.is_empty()
            && self.moved_sections.is_empty()
            && self.deleted_items.is_empty()
            && self.inserted_items.is_empty()
            && self.moved_items.is_empty()
    }
}

/// How a surface is carrying out an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The update is fully applied.
    Immediate,
    /// An animated transition is running. The surface must report its end
    /// through [`DynamicListView::transition_did_finish`](crate::DynamicListView::transition_did_finish).
    Animating,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    AnimationFailed { reason: String },
    Rejected { reason: String },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::AnimationFailed { reason } => write!(f, "animation failed: {reason}"),
            SurfaceError::Rejected { reason } => write!(f, "update rejected: {reason}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Scroll position and extents reported by a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub offset: Point,
    pub content_size: Size,
    pub viewport_size: Size,
}

impl ScrollMetrics {
    pub fn new(offset: Point, content_size: Size, viewport_size: Size) -> Self {
        Self {
            offset,
            content_size,
            viewport_size,
        }
    }

    /// Vertical-only metrics: offset, content height and viewport height.
    pub fn vertical(offset: f32, content_height: f32, viewport_height: f32) -> Self {
        Self::new(
            Point::new(0.0, offset),
            Size::new(0.0, content_height),
            Size::new(0.0, viewport_height),
        )
    }

    /// Horizontal-only metrics: offset, content width and viewport width.
    pub fn horizontal(offset: f32, content_width: f32, viewport_width: f32) -> Self {
        Self::new(
            Point::new(offset, 0.0),
            Size::new(content_width, 0.0),
            Size::new(viewport_width, 0.0),
        )
    }
}

/// Callback a surface invokes on every scroll offset or extent change.
pub type ScrollObserver = Box<dyn FnMut(ScrollMetrics)>;

pub trait RenderingSurface {
    /// Cell handed out by the surface's reuse pools.
    type Cell;
    /// Handle to a view instance. Clones must refer to the same view, and
    /// equality must mean identity.
    type View: Clone + PartialEq;

    fn register_cell_kind(&mut self, kind: &CellKind);

    /// Returns a cell of `kind` for `index_path`, recycled when possible.
    fn dequeue_reusable_cell(&mut self, kind: &CellKind, index_path: IndexPath) -> Self::Cell;

    fn apply_update(
        &mut self,
        update: &SurfaceUpdate,
        animated: bool,
    ) -> Result<Transition, SurfaceError>;

    /// Discards displayed cells and lays out from scratch.
    fn reload_data(&mut self, section_counts: &[usize]);

    /// Replaces the scroll observer.
    fn set_scroll_observer(&mut self, observer: ScrollObserver);

    /// True if `view` is currently part of the render tree.
    fn is_view_attached(&self, view: &Self::View) -> bool;
}
