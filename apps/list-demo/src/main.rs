//! Pages a feed into a `DynamicListView` while a simulated reader scrolls.
//!
//! Usage: `list-demo [page-size] [pages]`. Set `RUST_LOG=debug` to see the
//! engine's own diagnostics.

mod console;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use anyhow::{ensure, Context as _};
use composition_kit_list::prelude::*;
use composition_kit_runtime::Owned;

use console::{ConsoleCell, ConsoleScheduler, ConsoleSurface, ConsoleView};

const ROW_HEIGHT: f32 = 44.0;
const VIEWPORT: f32 = 440.0;
const SCROLL_STEP: f32 = 180.0;
const MAX_STEPS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Row {
    Header,
    Post(u32),
}

struct DemoOptions {
    page_size: u32,
    pages: u32,
}

impl DemoOptions {
    fn from_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let page_size = match args.next() {
            Some(arg) => arg
                .parse::<u32>()
                .with_context(|| format!("invalid page size {arg:?}"))?,
            None => 20,
        };
        let pages = match args.next() {
            Some(arg) => arg
                .parse::<u32>()
                .with_context(|| format!("invalid page count {arg:?}"))?,
            None => 4,
        };
        ensure!(page_size > 0, "page size must be at least 1");
        Ok(Self { page_size, pages })
    }
}

/// Server-side feed: hands out one page per fetch until exhausted.
struct Feed {
    page_size: u32,
    pages: u32,
    loaded_pages: u32,
    changed: bool,
}

impl Feed {
    fn load_next_page(&mut self) {
        if self.loaded_pages < self.pages {
            self.loaded_pages += 1;
            self.changed = true;
            log::info!("loaded page {}/{}", self.loaded_pages, self.pages);
        }
    }

    fn is_exhausted(&self) -> bool {
        self.loaded_pages >= self.pages
    }

    fn rows(&self) -> impl Iterator<Item = Row> {
        let posts = self.loaded_pages * self.page_size;
        std::iter::once(Row::Header).chain((0..posts).map(Row::Post))
    }
}

/// Completes on the second poll, standing in for network latency.
#[derive(Default)]
struct Latency {
    waited: bool,
}

impl Future for Latency {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.waited {
            Poll::Ready(())
        } else {
            self.waited = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let options = DemoOptions::from_args(std::env::args().skip(1))?;
    println!("=== Composition Kit List Demo ===");
    println!(
        "Paging {} pages of {} posts",
        options.pages, options.page_size
    );
    println!();

    let scheduler = Arc::new(ConsoleScheduler::default());
    let runtime = UiRuntime::new(scheduler.clone());
    let mut surface = ConsoleSurface::new(ROW_HEIGHT, VIEWPORT);
    let mut list: DynamicListView<SingleSection, Row, u32, ConsoleSurface> = DynamicListView::new(
        ListConfiguration::default().with_logger(Logger::global().with_target("list_demo")),
        runtime.clone(),
    );

    let post_kind = CellKind::of::<ConsoleCell>();
    list.attach(&mut surface);
    list.register_cell_kind(&mut surface, &post_kind);

    let header = ConsoleView::new("Latest posts");
    let provider: CellProvider<Row, u32, ConsoleSurface> = CellProvider::with_payload(
        move |row: &Row| match row {
            Row::Header => CellPayload::persistent_view(header.clone()),
            Row::Post(number) => CellPayload::Data(*number),
        },
        move |cx, number| {
            let mut cell: ConsoleCell = cx.dequeue_reusable_cell(&post_kind);
            cell.text = format!("{} {number} @{}", cell.kind.name(), cell.index_path);
            cell
        },
    );
    list.set_up(provider, |row| log::info!("selected {row:?}"));

    let feed = Owned::new(Feed {
        page_size: options.page_size,
        pages: options.pages,
        loaded_pages: 0,
        changed: false,
    });
    let fetch_feed = feed.clone();
    list.set_on_batch_fetch(move || {
        let feed = fetch_feed.clone();
        async move {
            Latency::default().await;
            feed.update(Feed::load_next_page);
        }
    });

    // Scroll observation never fires on the first offset, so the first page
    // is requested explicitly.
    list.trigger_batch_fetch_manually();

    for _ in 0..MAX_STEPS {
        if scheduler.take_frame_request() {
            runtime.run_until_stalled();
        }

        let changed = feed.update(|feed| std::mem::take(&mut feed.changed));
        if changed {
            let rows: Vec<Row> = feed.with(|feed| feed.rows().collect());
            list.set_items(&mut surface, rows, true);
            surface.render_visible(&mut list);
        }

        let done = feed.with(Feed::is_exhausted)
            && surface.is_at_end()
            && !list.batch_fetch_trigger().is_fetching();
        if done {
            break;
        }
        if surface.is_at_end() && !feed.with(Feed::is_exhausted) {
            // Content that fits the viewport cannot be scrolled toward its end.
            list.trigger_batch_fetch_manually();
            continue;
        }
        surface.scroll_by(SCROLL_STEP);
        surface.render_visible(&mut list);
    }

    list.did_select_item(IndexPath::new(0, 1));
    log::info!(
        "finished with {} rows after {} fetches",
        list.snapshot().number_of_items(),
        list.batch_fetch_trigger().fetch_count()
    );
    Ok(())
}
