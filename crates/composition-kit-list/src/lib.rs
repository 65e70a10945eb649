//! Dynamic list engine for Composition Kit: snapshots, diffing, content
//! pooling, cell resolution and batch fetching

pub mod batch_fetch;
pub mod cell_provider;
pub mod container;
pub mod content_pool;
pub mod diff;
pub mod identity;
pub mod list_view;
pub mod reconciler;
pub mod snapshot;
pub mod surface;

pub use batch_fetch::{
    BatchFetchConfig, BatchFetchTrigger, FetchCallback, FetchFuture, FetchPhase,
    TrackingDirection,
};
pub use cell_provider::{CellContext, CellPayload, CellProvider, RenderableCell};
pub use container::{ContainerCell, ContentHost};
pub use content_pool::ContentPool;
pub use diff::{ItemChange, ItemMove, SectionChange, SectionMove, SnapshotDiff};
pub use identity::{CellKind, IndexPath, ItemIdentifier, SectionIdentifier, SingleSection};
pub use list_view::{DynamicListView, ListConfiguration};
pub use reconciler::{ApplyOutcome, Reconciler};
pub use snapshot::{SectionCounts, Snapshot, SnapshotError};
pub use surface::{
    RenderingSurface, ScrollMetrics, ScrollObserver, SurfaceError, SurfaceUpdate, Transition,
};

pub mod prelude {
    pub use crate::cell_provider::{CellPayload, CellProvider, RenderableCell};
    pub use crate::identity::{CellKind, IndexPath, SingleSection};
    pub use crate::list_view::{DynamicListView, ListConfiguration};
    pub use crate::snapshot::Snapshot;
    pub use crate::surface::{RenderingSurface, ScrollMetrics};
    pub use composition_kit_runtime::{Axis, Logger, UiRuntime};
}
