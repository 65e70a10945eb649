use std::fmt;
use std::rc::Rc;

use composition_kit_list::{
    CellKind, DynamicListView, IndexPath, ItemIdentifier, RenderableCell, RenderingSurface,
    ScrollMetrics, ScrollObserver, SectionIdentifier, SurfaceError, SurfaceUpdate, Transition,
};

/// Stand-in for a platform view. Clones share identity; two views built
/// separately are never equal, even with the same name.
#[derive(Clone)]
pub struct FakeView {
    inner: Rc<str>,
}

impl FakeView {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self { inner: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.inner
    }
}

impl PartialEq for FakeView {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for FakeView {}

impl fmt::Debug for FakeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FakeView({})", self.inner)
    }
}

/// Cell handed out by [`RecordingSurface::dequeue_reusable_cell`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReusableCell {
    pub kind: CellKind,
    pub index_path: IndexPath,
    /// Dequeue order, starting at zero.
    pub serial: u64,
}

/// In-memory rendering surface that records every call made on it.
#[derive(Default)]
pub struct RecordingSurface {
    registered_kinds: Vec<CellKind>,
    updates: Vec<(SurfaceUpdate, bool)>,
    reloads: Vec<Vec<usize>>,
    attached: Vec<FakeView>,
    observer: Option<ScrollObserver>,
    animate_transitions: bool,
    failure: Option<SurfaceError>,
    next_serial: u64,
}

impl fmt::Debug for RecordingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSurface")
            .field("registered_kinds", &self.registered_kinds)
            .field("updates", &self.updates.len())
            .field("reloads", &self.reloads.len())
            .field("attached", &self.attached)
            .finish()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Animated updates report [`Transition::Animating`] until the test calls
    /// `transition_did_finish` on the list view.
    pub fn with_animations(mut self) -> Self {
        self.animate_transitions = true;
        self
    }

    /// Every update fails with `error`.
    pub fn failing_with(mut self, error: SurfaceError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn set_failure(&mut self, error: Option<SurfaceError>) {
        self.failure = error;
    }

    pub fn registered_kinds(&self) -> &[CellKind] {
        &self.registered_kinds
    }

    /// Successful updates with their `animated` flag, oldest first.
    pub fn updates(&self) -> &[(SurfaceUpdate, bool)] {
        &self.updates
    }

    pub fn last_update(&self) -> Option<&SurfaceUpdate> {
        self.updates.last().map(|(update, _)| update)
    }

    pub fn reloads(&self) -> &[Vec<usize>] {
        &self.reloads
    }

    pub fn has_scroll_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Pushes scroll metrics to the installed observer. Returns false when no
    /// observer is installed.
    pub fn scroll(&mut self, metrics: ScrollMetrics) -> bool {
        match self.observer.as_mut() {
            Some(observer) => {
                observer(metrics);
                true
            }
            None => false,
        }
    }

    /// Scrolls a vertical list through `offsets` with fixed extents.
    pub fn scroll_vertically(&mut self, offsets: &[f32], content: f32, viewport: f32) {
        for &offset in offsets {
            self.scroll(ScrollMetrics::vertical(offset, content, viewport));
        }
    }

    pub fn attach_view(&mut self, view: &FakeView) {
        if !self.attached.contains(view) {
            self.attached.push(view.clone());
        }
    }

    pub fn detach_all(&mut self) {
        self.attached.clear();
    }

    pub fn attached_views(&self) -> &[FakeView] {
        &self.attached
    }

    /// Asks `list` for every cell of its current snapshot, the way a platform
    /// list asks for visible cells, and attaches hosted views.
    pub fn render_all<S, I, D>(
        &mut self,
        list: &mut DynamicListView<S, I, D, Self>,
    ) -> Vec<RenderableCell<ReusableCell, FakeView>>
    where
        S: SectionIdentifier,
        I: ItemIdentifier,
    {
        self.detach_all();
        let counts = list.snapshot().section_counts();
        let mut cells = Vec::new();
        for (section, count) in counts.iter().enumerate() {
            for item in 0..*count {
                let cell = list.cell_for_item(self, IndexPath::new(section, item));
                if let Some(view) = cell.content() {
                    self.attach_view(view);
                }
                cells.push(cell);
            }
        }
        cells
    }
}

impl RenderingSurface for RecordingSurface {
    type Cell = ReusableCell;
    type View = FakeView;

    fn register_cell_kind(&mut self, kind: &CellKind) {
        if !self.registered_kinds.contains(kind) {
            self.registered_kinds.push(kind.clone());
        }
    }

    fn dequeue_reusable_cell(&mut self, kind: &CellKind, index_path: IndexPath) -> ReusableCell {
        assert!(
            self.registered_kinds.contains(kind),
            "cell kind {kind} dequeued before it was registered"
        );
        let serial = self.next_serial;
        self.next_serial += 1;
        ReusableCell {
            kind: kind.clone(),
            index_path,
            serial,
        }
    }

    fn apply_update(
        &mut self,
        update: &SurfaceUpdate,
        animated: bool,
    ) -> Result<Transition, SurfaceError> {
        if let Some(error) = self.failure.clone() {
            return Err(error);
        }
        self.updates.push((update.clone(), animated));
        if animated && self.animate_transitions {
            Ok(Transition::Animating)
        } else {
            Ok(Transition::Immediate)
        }
    }

    fn reload_data(&mut self, section_counts: &[usize]) {
        self.reloads.push(section_counts.to_vec());
    }

    fn set_scroll_observer(&mut self, observer: ScrollObserver) {
        self.observer = Some(observer);
    }

    fn is_view_attached(&self, view: &FakeView) -> bool {
        self.attached.contains(view)
    }
}
