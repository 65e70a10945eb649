//! Resolution of an item identity into the cell a surface displays.

use std::fmt;

use crate::container::{ContainerCell, ContentHost};
use crate::content_pool::ContentPool;
use crate::identity::{CellKind, IndexPath, ItemIdentifier};
use crate::surface::RenderingSurface;

/// What the caller wants shown for an item.
#[derive(Clone, Debug, PartialEq)]
pub enum CellPayload<D, V> {
    /// Render `D` through the provider's construction function.
    Data(D),
    /// Show `view` verbatim. With `persist` set, the view is parked in the
    /// content pool and reused for this item until it is swept.
    View { view: V, persist: bool },
}

impl<D, V> CellPayload<D, V> {
    pub fn view(view: V) -> Self {
        CellPayload::View {
            view,
            persist: false,
        }
    }

    pub fn persistent_view(view: V) -> Self {
        CellPayload::View {
            view,
            persist: true,
        }
    }
}

/// A cell ready to be handed back to the surface.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderableCell<C, V> {
    /// Dequeued from the surface and configured by the construction function.
    Reusable(C),
    /// Pass-through container hosting a caller-owned view.
    Container(ContainerCell<V>),
    /// Empty cell returned when nothing can be rendered for the position.
    Placeholder(IndexPath),
}

impl<C, V> RenderableCell<C, V> {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, RenderableCell::Placeholder(_))
    }

    pub fn as_reusable(&self) -> Option<&C> {
        match self {
            RenderableCell::Reusable(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerCell<V>> {
        match self {
            RenderableCell::Container(cell) => Some(cell),
            _ => None,
        }
    }

    /// The hosted view, for container cells that have one.
    pub fn content(&self) -> Option<&V>
    where
        V: PartialEq,
    {
        self.as_container().and_then(|cell| cell.content())
    }
}

/// Arguments passed to a construction function.
pub struct CellContext<'a, I, Surf> {
    item: &'a I,
    index_path: IndexPath,
    surface: &'a mut Surf,
}

impl<'a, I, Surf: RenderingSurface> CellContext<'a, I, Surf> {
    pub fn item(&self) -> &I {
        self.item
    }

    pub fn index_path(&self) -> IndexPath {
        self.index_path
    }

    pub fn dequeue_reusable_cell(&mut self, kind: &CellKind) -> Surf::Cell {
        self.surface.dequeue_reusable_cell(kind, self.index_path)
    }

    pub fn surface(&mut self) -> &mut Surf {
        self.surface
    }
}

type ResolveFn<I, D, V> = Box<dyn Fn(&I) -> CellPayload<D, V>>;
type ConstructFn<I, D, Surf> =
    Box<dyn Fn(&mut CellContext<'_, I, Surf>, D) -> <Surf as RenderingSurface>::Cell>;

/// Turns item identities into cells.
///
/// A provider holds two caller functions: `resolve` decides what an item
/// shows, and `construct` builds a recycled cell for [`CellPayload::Data`].
pub struct CellProvider<I, D, Surf: RenderingSurface> {
    resolve: ResolveFn<I, D, Surf::View>,
    construct: ConstructFn<I, D, Surf>,
}

impl<I, D, Surf: RenderingSurface> fmt::Debug for CellProvider<I, D, Surf> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellProvider").finish_non_exhaustive()
    }
}

impl<I: ItemIdentifier, Surf: RenderingSurface> CellProvider<I, I, Surf> {
    /// Provider whose every item is rendered through `construct` with the
    /// item identity itself as data.
    pub fn new(
        construct: impl Fn(&mut CellContext<'_, I, Surf>, I) -> Surf::Cell + 'static,
    ) -> Self {
        Self::with_payload(|item: &I| CellPayload::Data(item.clone()), construct)
    }
}

impl<I: ItemIdentifier, D, Surf: RenderingSurface> CellProvider<I, D, Surf> {
    pub fn with_payload(
        resolve: impl Fn(&I) -> CellPayload<D, Surf::View> + 'static,
        construct: impl Fn(&mut CellContext<'_, I, Surf>, D) -> Surf::Cell + 'static,
    ) -> Self {
        Self {
            resolve: Box::new(resolve),
            construct: Box::new(construct),
        }
    }

    /// Resolves the cell for `item` at `index_path`.
    ///
    /// A pooled view wins over everything else, and only a persistent view
    /// payload writes to the pool.
    pub fn cell(
        &self,
        pool: &mut ContentPool<I, Surf::View>,
        item: &I,
        index_path: IndexPath,
        surface: &mut Surf,
    ) -> RenderableCell<Surf::Cell, Surf::View> {
        if let Some(view) = pool.get(item) {
            return RenderableCell::Container(ContainerCell::with_content(
                index_path,
                view.clone(),
            ));
        }

        match (self.resolve)(item) {
            CellPayload::View { view, persist } => {
                if persist {
                    pool.set(item.clone(), view.clone());
                }
                RenderableCell::Container(ContainerCell::with_content(index_path, view))
            }
            CellPayload::Data(data) => {
                let mut context = CellContext {
                    item,
                    index_path,
                    surface,
                };
                RenderableCell::Reusable((self.construct)(&mut context, data))
            }
        }
    }
}
