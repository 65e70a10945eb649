//! Headless rendering surface that prints what a real list would display.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use composition_kit_list::{
    CellKind, ContentHost, DynamicListView, IndexPath, ItemIdentifier, RenderableCell,
    RenderingSurface, ScrollMetrics, ScrollObserver, SectionIdentifier, SurfaceError,
    SurfaceUpdate, Transition,
};
use composition_kit_runtime::{FrameScheduler, Point, Size};

/// Records frame requests from the UI runtime; the demo loop polls tasks
/// whenever one is pending.
#[derive(Default)]
pub struct ConsoleScheduler {
    frame_requested: AtomicBool,
}

impl ConsoleScheduler {
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::SeqCst)
    }
}

impl FrameScheduler for ConsoleScheduler {
    fn schedule_frame(&self) {
        self.frame_requested.store(true, Ordering::SeqCst);
    }
}

/// A pre-built view, shared by handle.
#[derive(Clone)]
pub struct ConsoleView {
    label: Rc<str>,
}

impl ConsoleView {
    pub fn new(label: &str) -> Self {
        Self {
            label: Rc::from(label),
        }
    }
}

impl PartialEq for ConsoleView {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.label, &other.label)
    }
}

impl fmt::Debug for ConsoleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug)]
pub struct ConsoleCell {
    pub kind: CellKind,
    pub index_path: IndexPath,
    pub text: String,
}

pub struct ConsoleSurface {
    row_height: f32,
    viewport: f32,
    offset: f32,
    item_count: usize,
    kinds: Vec<CellKind>,
    attached: Vec<ConsoleView>,
    observer: Option<ScrollObserver>,
}

impl ConsoleSurface {
    pub fn new(row_height: f32, viewport: f32) -> Self {
        Self {
            row_height,
            viewport,
            offset: 0.0,
            item_count: 0,
            kinds: Vec::new(),
            attached: Vec::new(),
            observer: None,
        }
    }

    fn content_length(&self) -> f32 {
        self.item_count as f32 * self.row_height
    }

    fn max_offset(&self) -> f32 {
        (self.content_length() - self.viewport).max(0.0)
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Scrolls by `delta`, clamped to the content, and notifies the observer.
    pub fn scroll_by(&mut self, delta: f32) {
        self.offset = (self.offset + delta).clamp(0.0, self.max_offset());
        let metrics = ScrollMetrics::new(
            Point::new(0.0, self.offset),
            Size::new(self.viewport, self.content_length()),
            Size::new(self.viewport, self.viewport),
        );
        if let Some(observer) = self.observer.as_mut() {
            observer(metrics);
        }
    }

    /// Requests the cells in the viewport from `list` and prints them.
    pub fn render_visible<S, I, D>(&mut self, list: &mut DynamicListView<S, I, D, Self>)
    where
        S: SectionIdentifier,
        I: ItemIdentifier,
    {
        let first = (self.offset / self.row_height).floor() as usize;
        let visible = (self.viewport / self.row_height).ceil() as usize + 1;
        let last = (first + visible).min(self.item_count);

        let mut lines = Vec::with_capacity(last.saturating_sub(first));
        for index in first..last {
            match list.cell_for_item(self, IndexPath::new(0, index)) {
                RenderableCell::Reusable(cell) => lines.push(cell.text),
                RenderableCell::Container(container) => {
                    if let Some(view) = container.content() {
                        lines.push(format!("[{view:?}]"));
                        if !self.attached.contains(view) {
                            self.attached.push(view.clone());
                        }
                    }
                }
                RenderableCell::Placeholder(index_path) => {
                    lines.push(format!("<empty {index_path}>"))
                }
            }
        }
        log::info!(
            "offset {:>6.0} | rows {first}..{last} of {} | {}",
            self.offset,
            self.item_count,
            lines.join(", ")
        );
    }
}

impl RenderingSurface for ConsoleSurface {
    type Cell = ConsoleCell;
    type View = ConsoleView;

    fn register_cell_kind(&mut self, kind: &CellKind) {
        log::debug!("registered cell kind {kind}");
        self.kinds.push(kind.clone());
    }

    fn dequeue_reusable_cell(&mut self, kind: &CellKind, index_path: IndexPath) -> ConsoleCell {
        if !self.kinds.contains(kind) {
            log::warn!("cell kind {kind} was never registered");
        }
        ConsoleCell {
            kind: kind.clone(),
            index_path,
            text: String::new(),
        }
    }

    fn apply_update(
        &mut self,
        update: &SurfaceUpdate,
        animated: bool,
    ) -> Result<Transition, SurfaceError> {
        self.item_count = update.section_counts.iter().sum();
        log::info!(
            "update (animated: {animated}): +{} -{} ~{} items, {} total",
            update.inserted_items.len() + update.inserted_sections.len(),
            update.deleted_items.len() + update.deleted_sections.len(),
            update.moved_items.len(),
            self.item_count
        );
        Ok(Transition::Immediate)
    }

    fn reload_data(&mut self, section_counts: &[usize]) {
        self.item_count = section_counts.iter().sum();
        log::info!("reload: {} items", self.item_count);
    }

    fn set_scroll_observer(&mut self, observer: ScrollObserver) {
        self.observer = Some(observer);
    }

    fn is_view_attached(&self, view: &ConsoleView) -> bool {
        self.attached.contains(view)
    }
}
