//! Entry point that wires the reconciler, content pool, cell provider and
//! batch-fetch trigger to one rendering surface.

use std::fmt;
use std::future::Future;

use composition_kit_runtime::{Axis, Logger, UiRuntime};

use crate::batch_fetch::{BatchFetchConfig, BatchFetchTrigger, TrackingDirection};
use crate::cell_provider::{CellProvider, RenderableCell};
use crate::content_pool::ContentPool;
use crate::diff::SnapshotDiff;
use crate::identity::{CellKind, IndexPath, ItemIdentifier, SectionIdentifier, SingleSection};
use crate::reconciler::{ApplyOutcome, Reconciler};
use crate::snapshot::Snapshot;
use crate::surface::RenderingSurface;

#[derive(Clone, Debug)]
pub struct ListConfiguration {
    pub axis: Axis,
    /// Viewport lengths before the trailing edge at which the next page is
    /// requested.
    pub leading_screens: f32,
    /// Enables consistency checks: duplicate items, detached pooled views,
    /// and panicking on cells requested before [`DynamicListView::set_up`].
    pub diagnostics: bool,
    pub logger: Logger,
}

impl Default for ListConfiguration {
    fn default() -> Self {
        Self {
            axis: Axis::Vertical,
            leading_screens: 1.0,
            diagnostics: cfg!(debug_assertions),
            logger: Logger::noop(),
        }
    }
}

impl ListConfiguration {
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_leading_screens(mut self, leading_screens: f32) -> Self {
        self.leading_screens = leading_screens;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    fn tracking_direction(&self) -> TrackingDirection {
        match self.axis {
            Axis::Vertical => TrackingDirection::Down,
            Axis::Horizontal => TrackingDirection::Right,
        }
    }
}

type SelectionHandler<I> = Box<dyn FnMut(&I)>;

/// A dynamic list bound to a rendering surface.
///
/// The view does not own its surface; every call that touches the surface
/// takes it as an argument. Call [`attach`](Self::attach) once, then
/// [`set_up`](Self::set_up) before the surface asks for cells.
pub struct DynamicListView<S, I, D, Surf: RenderingSurface> {
    reconciler: Reconciler<S, I>,
    pool: ContentPool<I, Surf::View>,
    cell_provider: Option<CellProvider<I, D, Surf>>,
    on_select: Option<SelectionHandler<I>>,
    trigger: BatchFetchTrigger,
    diagnostics: bool,
    logger: Logger,
}

impl<S, I, D, Surf> fmt::Debug for DynamicListView<S, I, D, Surf>
where
    S: fmt::Debug,
    I: fmt::Debug,
    Surf: RenderingSurface,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicListView")
            .field("reconciler", &self.reconciler)
            .field("pool", &self.pool)
            .field("set_up", &self.cell_provider.is_some())
            .field("trigger", &self.trigger)
            .finish()
    }
}

impl<S, I, D, Surf> DynamicListView<S, I, D, Surf>
where
    S: SectionIdentifier,
    I: ItemIdentifier,
    Surf: RenderingSurface,
{
    pub fn new(config: ListConfiguration, runtime: UiRuntime) -> Self {
        let trigger = BatchFetchTrigger::new(
            BatchFetchConfig::new(config.tracking_direction())
                .with_leading_screens(config.leading_screens),
            runtime,
            config.logger.clone(),
        );
        Self {
            reconciler: Reconciler::new(config.logger.clone(), config.diagnostics),
            pool: ContentPool::new(config.logger.clone(), config.diagnostics),
            cell_provider: None,
            on_select: None,
            trigger,
            diagnostics: config.diagnostics,
            logger: config.logger,
        }
    }

    /// Registers the container cell kind and starts observing scrolling.
    pub fn attach(&mut self, surface: &mut Surf) {
        surface.register_cell_kind(&CellKind::CONTAINER);
        surface.set_scroll_observer(self.trigger.observer());
    }

    pub fn register_cell_kind(&mut self, surface: &mut Surf, kind: &CellKind) {
        self.logger
            .trace(format_args!("registering cell kind {kind}"));
        surface.register_cell_kind(kind);
    }

    /// Installs the cell provider and the selection handler.
    pub fn set_up(
        &mut self,
        cell_provider: CellProvider<I, D, Surf>,
        on_select: impl FnMut(&I) + 'static,
    ) {
        self.cell_provider = Some(cell_provider);
        self.on_select = Some(Box::new(on_select));
    }

    pub fn set_on_batch_fetch<F, Fut>(&self, on_fetch: F)
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.trigger.set_on_batch_fetch(on_fetch);
    }

    pub fn set_contents(
        &mut self,
        surface: &mut Surf,
        snapshot: Snapshot<S, I>,
        animated: bool,
    ) -> ApplyOutcome<S, I> {
        self.reconciler
            .apply(surface, &mut self.pool, snapshot, animated)
    }

    /// Replaces the items of `section`, moving the section to the end.
    ///
    /// Builds on the latest requested snapshot, so edits queued behind a
    /// running transition are not lost.
    pub fn set_items_in_section(
        &mut self,
        surface: &mut Surf,
        items: impl IntoIterator<Item = I>,
        section: S,
        animated: bool,
    ) -> ApplyOutcome<S, I> {
        let mut snapshot = self.reconciler.latest().clone();
        snapshot.replace_section_items(section, items);
        self.set_contents(surface, snapshot, animated)
    }

    /// The last applied snapshot.
    pub fn snapshot(&self) -> &Snapshot<S, I> {
        self.reconciler.current()
    }

    pub fn is_set_up(&self) -> bool {
        self.cell_provider.is_some()
    }

    /// The cell the surface should display at `index_path`.
    ///
    /// # Panics
    ///
    /// With diagnostics on, panics if called before [`set_up`](Self::set_up).
    pub fn cell_for_item(
        &mut self,
        surface: &mut Surf,
        index_path: IndexPath,
    ) -> RenderableCell<Surf::Cell, Surf::View> {
        let Some(provider) = self.cell_provider.as_ref() else {
            if self.diagnostics {
                panic!("cell requested at {index_path} before the list view was set up");
            }
            self.logger.error(format_args!(
                "cell requested at {index_path} before the list view was set up"
            ));
            return RenderableCell::Placeholder(index_path);
        };

        let Some(item) = self.reconciler.current().item_at(index_path) else {
            self.logger.warn(format_args!(
                "cell requested at {index_path}, outside the displayed snapshot"
            ));
            return RenderableCell::Placeholder(index_path);
        };

        provider.cell(&mut self.pool, item, index_path, surface)
    }

    /// Reports a selection. Returns false if `index_path` holds no item.
    pub fn did_select_item(&mut self, index_path: IndexPath) -> bool {
        let Some(item) = self.reconciler.current().item_at(index_path) else {
            self.logger.warn(format_args!(
                "selection at {index_path}, outside the displayed snapshot"
            ));
            return false;
        };
        if let Some(on_select) = self.on_select.as_mut() {
            on_select(item);
        }
        true
    }

    /// Called by the surface when an animated update completes.
    pub fn transition_did_finish(&mut self, surface: &mut Surf) -> Vec<SnapshotDiff<S, I>> {
        self.reconciler
            .transition_did_finish(surface, &mut self.pool)
    }

    pub fn trigger_batch_fetch_manually(&self) -> bool {
        self.trigger.trigger_manually()
    }

    pub fn set_batch_fetch_enabled(&self, enabled: bool) {
        self.trigger.set_enabled(enabled);
    }

    pub fn content_pool(&self) -> &ContentPool<I, Surf::View> {
        &self.pool
    }

    pub fn batch_fetch_trigger(&self) -> &BatchFetchTrigger {
        &self.trigger
    }

    pub fn is_in_transition(&self) -> bool {
        self.reconciler.is_in_transition()
    }
}

impl<I, D, Surf> DynamicListView<SingleSection, I, D, Surf>
where
    I: ItemIdentifier,
    Surf: RenderingSurface,
{
    /// Shows `items` as the only section.
    pub fn set_items(
        &mut self,
        surface: &mut Surf,
        items: impl IntoIterator<Item = I>,
        animated: bool,
    ) -> ApplyOutcome<SingleSection, I> {
        self.set_contents(surface, Snapshot::with_items(items), animated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_provider::CellPayload;
    use crate::surface::{ScrollMetrics, ScrollObserver, SurfaceError, SurfaceUpdate, Transition};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct StubSurface {
        kinds: Vec<CellKind>,
        observer: Option<ScrollObserver>,
    }

    impl RenderingSurface for StubSurface {
        type Cell = (CellKind, IndexPath);
        type View = &'static str;

        fn register_cell_kind(&mut self, kind: &CellKind) {
            self.kinds.push(kind.clone());
        }

        fn dequeue_reusable_cell(&mut self, kind: &CellKind, index_path: IndexPath) -> Self::Cell {
            (kind.clone(), index_path)
        }

        fn apply_update(
            &mut self,
            _update: &SurfaceUpdate,
            _animated: bool,
        ) -> Result<Transition, SurfaceError> {
            Ok(Transition::Immediate)
        }

        fn reload_data(&mut self, _section_counts: &[usize]) {}

        fn set_scroll_observer(&mut self, observer: ScrollObserver) {
            self.observer = Some(observer);
        }

        fn is_view_attached(&self, _view: &Self::View) -> bool {
            true
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Section {
        Header,
        Feed,
    }

    fn row() -> CellKind {
        CellKind::new("row")
    }

    fn list<S: SectionIdentifier>(diagnostics: bool) -> DynamicListView<S, u32, u32, StubSurface> {
        DynamicListView::new(
            ListConfiguration::default().with_diagnostics(diagnostics),
            UiRuntime::default(),
        )
    }

    fn provider() -> CellProvider<u32, u32, StubSurface> {
        CellProvider::with_payload(
            |item: &u32| {
                if *item == 0 {
                    CellPayload::persistent_view("banner")
                } else {
                    CellPayload::Data(*item)
                }
            },
            |cx, _data| cx.dequeue_reusable_cell(&CellKind::new("row")),
        )
    }

    #[test]
    fn attach_registers_container_and_observer() {
        let mut surface = StubSurface::default();
        let mut view = list::<SingleSection>(false);
        view.attach(&mut surface);
        view.register_cell_kind(&mut surface, &row());
        assert_eq!(surface.kinds, vec![CellKind::CONTAINER, row()]);
        assert!(surface.observer.is_some());
    }

    #[test]
    fn cells_resolve_against_the_applied_snapshot() {
        let mut surface = StubSurface::default();
        let mut view = list::<SingleSection>(false);
        view.set_up(provider(), |_| {});
        view.set_items(&mut surface, [0, 5], false);

        let banner = view.cell_for_item(&mut surface, IndexPath::new(0, 0));
        assert_eq!(banner.content(), Some(&"banner"));
        assert!(view.content_pool().contains(&0));

        let cell = view.cell_for_item(&mut surface, IndexPath::new(0, 1));
        assert_eq!(cell.as_reusable(), Some(&(row(), IndexPath::new(0, 1))));

        let missing = view.cell_for_item(&mut surface, IndexPath::new(0, 9));
        assert!(missing.is_placeholder());
    }

    #[test]
    fn rendering_before_set_up_returns_a_placeholder() {
        let mut surface = StubSurface::default();
        let mut view = list::<SingleSection>(false);
        view.set_items(&mut surface, [1], false);
        let cell = view.cell_for_item(&mut surface, IndexPath::new(0, 0));
        assert_eq!(cell, RenderableCell::Placeholder(IndexPath::new(0, 0)));
    }

    #[test]
    #[should_panic(expected = "before the list view was set up")]
    fn rendering_before_set_up_panics_with_diagnostics() {
        let mut surface = StubSurface::default();
        let mut view = list::<SingleSection>(true);
        view.set_items(&mut surface, [1], false);
        view.cell_for_item(&mut surface, IndexPath::new(0, 0));
    }

    #[test]
    fn selection_reports_the_item() {
        let mut surface = StubSurface::default();
        let mut view = list::<SingleSection>(false);
        let selected = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&selected);
        view.set_up(provider(), move |item| sink.borrow_mut().push(*item));
        view.set_items(&mut surface, [3, 4], false);

        assert!(view.did_select_item(IndexPath::new(0, 1)));
        assert!(!view.did_select_item(IndexPath::new(1, 0)));
        assert_eq!(*selected.borrow(), vec![4]);
    }

    #[test]
    fn replacing_section_items_moves_the_section_last() {
        let mut surface = StubSurface::default();
        let mut view = list::<Section>(false);
        let snapshot =
            Snapshot::from_sections([(Section::Header, vec![1]), (Section::Feed, vec![2, 3])])
                .expect("distinct sections");
        view.set_contents(&mut surface, snapshot, false);

        view.set_items_in_section(&mut surface, [9], Section::Header, false);
        let sections: Vec<_> = view.snapshot().section_identifiers().copied().collect();
        assert_eq!(sections, vec![Section::Feed, Section::Header]);
        assert_eq!(view.snapshot().items_in_section(&Section::Header), Some(&[9][..]));
    }

    #[test]
    fn horizontal_lists_track_the_trailing_edge() {
        let view: DynamicListView<SingleSection, u32, u32, StubSurface> = DynamicListView::new(
            ListConfiguration::default().with_axis(Axis::Horizontal),
            UiRuntime::default(),
        );
        assert_eq!(
            view.batch_fetch_trigger().direction(),
            TrackingDirection::Right
        );
        assert_eq!(view.batch_fetch_trigger().leading_screens(), 1.0);
    }

    #[test]
    fn scroll_observer_drives_the_trigger() {
        let mut surface = StubSurface::default();
        let mut view = list::<SingleSection>(false);
        view.attach(&mut surface);
        let fetches = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fetches);
        view.set_on_batch_fetch(move || {
            *counter.borrow_mut() += 1;
            async {}
        });

        let observer = surface.observer.as_mut().expect("observer installed");
        observer(ScrollMetrics::vertical(0.0, 1000.0, 300.0));
        observer(ScrollMetrics::vertical(450.0, 1000.0, 300.0));
        assert_eq!(*fetches.borrow(), 1);
        assert!(view.batch_fetch_trigger().is_fetching());
    }
}
