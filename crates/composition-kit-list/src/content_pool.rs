//! Retention of caller-built views keyed by item identity.
//!
//! Views that should keep their state across reloads (embedded players,
//! focused text fields) are parked here instead of being rebuilt from
//! recycled cells. An entry lives until a reconcile pass sweeps it because
//! its item is no longer displayed.

use std::fmt;

use composition_kit_runtime::collections::map::{HashMap, HashSet};
use composition_kit_runtime::Logger;

use crate::identity::ItemIdentifier;

pub struct ContentPool<I, V> {
    contents: HashMap<I, V>,
    logger: Logger,
    diagnostics: bool,
}

impl<I: fmt::Debug, V> fmt::Debug for ContentPool<I, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentPool")
            .field("len", &self.contents.len())
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

impl<I: ItemIdentifier, V> Default for ContentPool<I, V> {
    fn default() -> Self {
        Self::new(Logger::noop(), false)
    }
}

impl<I: ItemIdentifier, V> ContentPool<I, V> {
    pub fn new(logger: Logger, diagnostics: bool) -> Self {
        Self {
            contents: HashMap::default(),
            logger,
            diagnostics,
        }
    }

    /// Stores `view` under `item`, returning the view it replaced.
    ///
    /// Replacing an entry is legal but usually means the same item was asked
    /// to build its view twice.
    pub fn set(&mut self, item: I, view: V) -> Option<V> {
        if self.diagnostics && self.contents.contains_key(&item) {
            self.logger.warn(format_args!(
                "content pool already holds a view for {item:?}; replacing it"
            ));
        }
        self.contents.insert(item, view)
    }

    pub fn get(&self, item: &I) -> Option<&V> {
        self.contents.get(item)
    }

    pub fn contains(&self, item: &I) -> bool {
        self.contents.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &I> + '_ {
        self.contents.keys()
    }

    pub fn remove(&mut self, item: &I) -> Option<V> {
        self.contents.remove(item)
    }

    /// Drops every entry whose item is not in `live`. Returns how many were
    /// dropped.
    pub fn sweep(&mut self, live: &HashSet<I>) -> usize {
        let before = self.contents.len();
        self.contents.retain(|item, _| live.contains(item));
        let removed = before - self.contents.len();
        if removed > 0 {
            self.logger.trace(format_args!(
                "content pool swept {removed} entries, {} retained",
                self.contents.len()
            ));
        }
        removed
    }

    /// Items whose pooled view is not attached according to `is_attached`.
    ///
    /// A pooled view that never reaches the render tree after a reconcile is
    /// usually a view that was built for the wrong item.
    pub fn report_detached(&self, mut is_attached: impl FnMut(&V) -> bool) -> Vec<I> {
        let detached: Vec<I> = self
            .contents
            .iter()
            .filter(|(_, view)| !is_attached(view))
            .map(|(item, _)| item.clone())
            .collect();
        if !detached.is_empty() {
            self.logger.error(format_args!(
                "pooled views not displayed: {detached:?}"
            ));
        }
        detached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(items: &[u32]) -> HashSet<u32> {
        items.iter().copied().collect()
    }

    #[test]
    fn sweep_keeps_only_live_entries() {
        let mut pool = ContentPool::default();
        pool.set(1, "a");
        pool.set(2, "b");
        pool.set(3, "c");

        assert_eq!(pool.sweep(&live(&[2, 4])), 2);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(&2), Some(&"b"));
        assert!(!pool.contains(&1));
    }

    #[test]
    fn set_returns_the_replaced_view() {
        let mut pool = ContentPool::default();
        assert_eq!(pool.set("header", 1), None);
        assert_eq!(pool.set("header", 2), Some(1));
        assert_eq!(pool.get(&"header"), Some(&2));
    }

    #[test]
    fn detached_views_are_reported() {
        let mut pool = ContentPool::default();
        pool.set(1, true);
        pool.set(2, false);
        assert_eq!(pool.report_detached(|attached| *attached), vec![2]);
    }

    #[test]
    fn empty_sweep_clears_the_pool() {
        let mut pool = ContentPool::default();
        pool.set(9, ());
        pool.sweep(&HashSet::default());
        assert!(pool.is_empty());
        assert_eq!(pool.keys().count(), 0);
    }
}
