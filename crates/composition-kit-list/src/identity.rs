//! Identity types shared by snapshots, diffs and surfaces.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;

/// Caller-supplied section identity.
///
/// Blanket-implemented for every type with the required bounds.
pub trait SectionIdentifier: Clone + Eq + Hash + fmt::Debug + 'static {}

impl<T> SectionIdentifier for T where T: Clone + Eq + Hash + fmt::Debug + 'static {}

/// Caller-supplied item identity.
///
/// Must be unique across all sections of a snapshot: the content pool is
/// keyed by item identity alone.
pub trait ItemIdentifier: Clone + Eq + Hash + fmt::Debug + 'static {}

impl<T> ItemIdentifier for T where T: Clone + Eq + Hash + fmt::Debug + 'static {}

/// Section identity for lists that only ever have one section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SingleSection {
    #[default]
    Main,
}

/// Position of an item within a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

/// Name under which a rendering surface keeps a pool of reusable cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellKind(Cow<'static, str>);

impl CellKind {
    /// Kind used for pass-through container cells.
    pub const CONTAINER: CellKind = CellKind(Cow::Borrowed("composition_kit::container"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Kind named after a cell type, so each cell type gets its own pool.
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(type_name::<T>()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
