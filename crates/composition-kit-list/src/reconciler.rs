//! Applies snapshots to a surface one at a time.
//!
//! Every applied snapshot becomes the baseline the next one is diffed
//! against. While the surface runs an animated transition, later snapshots
//! wait in a queue and are applied in order once the surface reports that
//! the transition finished.

use std::collections::VecDeque;
use std::fmt;

use composition_kit_runtime::collections::map::HashSet;
use composition_kit_runtime::Logger;

use crate::content_pool::ContentPool;
use crate::diff::SnapshotDiff;
use crate::identity::{ItemIdentifier, SectionIdentifier};
use crate::snapshot::Snapshot;
use crate::surface::{RenderingSurface, Transition};

/// Result of [`Reconciler::apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome<S, I> {
    /// The snapshot was applied right away with this diff.
    Applied(SnapshotDiff<S, I>),
    /// A transition is in flight; the snapshot waits at `position` in the
    /// queue.
    Queued { position: usize },
}

impl<S, I> ApplyOutcome<S, I> {
    pub fn diff(&self) -> Option<&SnapshotDiff<S, I>> {
        match self {
            ApplyOutcome::Applied(diff) => Some(diff),
            ApplyOutcome::Queued { .. } => None,
        }
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, ApplyOutcome::Queued { .. })
    }
}

pub struct Reconciler<S, I> {
    current: Snapshot<S, I>,
    pending: VecDeque<(Snapshot<S, I>, bool)>,
    in_transition: bool,
    diagnostics: bool,
    logger: Logger,
}

impl<S: fmt::Debug, I: fmt::Debug> fmt::Debug for Reconciler<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("current", &self.current)
            .field("pending", &self.pending.len())
            .field("in_transition", &self.in_transition)
            .finish()
    }
}

impl<S: SectionIdentifier, I: ItemIdentifier> Default for Reconciler<S, I> {
    fn default() -> Self {
        Self::new(Logger::noop(), false)
    }
}

impl<S: SectionIdentifier, I: ItemIdentifier> Reconciler<S, I> {
    pub fn new(logger: Logger, diagnostics: bool) -> Self {
        Self {
            current: Snapshot::new(),
            pending: VecDeque::new(),
            in_transition: false,
            diagnostics,
            logger,
        }
    }

    /// The last applied snapshot.
    pub fn current(&self) -> &Snapshot<S, I> {
        &self.current
    }

    /// The snapshot the surface will show once the queue drains.
    pub fn latest(&self) -> &Snapshot<S, I> {
        self.pending
            .back()
            .map(|(snapshot, _)| snapshot)
            .unwrap_or(&self.current)
    }

    pub fn is_in_transition(&self) -> bool {
        self.in_transition
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Diffs `snapshot` against the baseline, pushes the update to `surface`
    /// and sweeps `pool` down to the items `snapshot` contains.
    ///
    /// Surface failures degrade to a full reload and are never returned.
    pub fn apply<Surf: RenderingSurface>(
        &mut self,
        surface: &mut Surf,
        pool: &mut ContentPool<I, Surf::View>,
        snapshot: Snapshot<S, I>,
        animated: bool,
    ) -> ApplyOutcome<S, I> {
        if self.in_transition {
            self.pending.push_back((snapshot, animated));
            let position = self.pending.len() - 1;
            self.logger.trace(format_args!(
                "transition in flight; snapshot queued at {position}"
            ));
            return ApplyOutcome::Queued { position };
        }
        ApplyOutcome::Applied(self.apply_now(surface, pool, snapshot, animated))
    }

    /// Ends the running transition and applies queued snapshots until one of
    /// them starts another transition. Returns the diffs that were applied.
    pub fn transition_did_finish<Surf: RenderingSurface>(
        &mut self,
        surface: &mut Surf,
        pool: &mut ContentPool<I, Surf::View>,
    ) -> Vec<SnapshotDiff<S, I>> {
        if !self.in_transition {
            self.logger
                .debug(format_args!("transition finished while none was running"));
        }
        self.in_transition = false;
        if self.diagnostics && self.pending.is_empty() {
            pool.report_detached(|view| surface.is_view_attached(view));
        }

        let mut applied = Vec::new();
        while !self.in_transition {
            let Some((snapshot, animated)) = self.pending.pop_front() else {
                break;
            };
            applied.push(self.apply_now(surface, pool, snapshot, animated));
        }
        applied
    }

    fn apply_now<Surf: RenderingSurface>(
        &mut self,
        surface: &mut Surf,
        pool: &mut ContentPool<I, Surf::View>,
        snapshot: Snapshot<S, I>,
        animated: bool,
    ) -> SnapshotDiff<S, I> {
        if self.diagnostics {
            let duplicates = snapshot.duplicate_items();
            if !duplicates.is_empty() {
                self.logger.error(format_args!(
                    "snapshot contains duplicate items {duplicates:?}; only the first occurrence is tracked"
                ));
            }
        }

        let diff = SnapshotDiff::between(&self.current, &snapshot);
        if !diff.is_empty() {
            let update = diff.to_surface_update(&snapshot);
            match surface.apply_update(&update, animated) {
                Ok(Transition::Immediate) => {}
                Ok(Transition::Animating) => self.in_transition = true,
                Err(err) => {
                    self.logger
                        .warn(format_args!("{err}; reloading the list instead"));
                    surface.reload_data(&update.section_counts);
                }
            }
        }

        let live: HashSet<I> = snapshot.item_identifiers().cloned().collect();
        self.current = snapshot;
        pool.sweep(&live);

        if self.diagnostics && !self.in_transition {
            pool.report_detached(|view| surface.is_view_attached(view));
        }
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{CellKind, IndexPath, SingleSection};
    use crate::surface::{ScrollObserver, SurfaceError, SurfaceUpdate};

    #[derive(Default)]
    struct ScriptedSurface {
        animate: bool,
        fail: bool,
        updates: Vec<SurfaceUpdate>,
        reloads: Vec<Vec<usize>>,
    }

    impl RenderingSurface for ScriptedSurface {
        type Cell = IndexPath;
        type View = u8;

        fn register_cell_kind(&mut self, _kind: &CellKind) {}

        fn dequeue_reusable_cell(&mut self, _kind: &CellKind, index_path: IndexPath) -> IndexPath {
            index_path
        }

        fn apply_update(
            &mut self,
            update: &SurfaceUpdate,
            animated: bool,
        ) -> Result<Transition, SurfaceError> {
            if self.fail {
                return Err(SurfaceError::AnimationFailed {
                    reason: "layout invalidated".into(),
                });
            }
            self.updates.push(update.clone());
            if animated && self.animate {
                Ok(Transition::Animating)
            } else {
                Ok(Transition::Immediate)
            }
        }

        fn reload_data(&mut self, section_counts: &[usize]) {
            self.reloads.push(section_counts.to_vec());
        }

        fn set_scroll_observer(&mut self, _observer: ScrollObserver) {}

        fn is_view_attached(&self, _view: &u8) -> bool {
            true
        }
    }

    fn items(values: &[u32]) -> Snapshot<SingleSection, u32> {
        Snapshot::with_items(values.iter().copied())
    }

    #[test]
    fn applying_the_same_snapshot_twice_is_empty() {
        let mut reconciler = Reconciler::default();
        let mut surface = ScriptedSurface::default();
        let mut pool = ContentPool::default();

        let first = reconciler.apply(&mut surface, &mut pool, items(&[1, 2, 3]), false);
        assert_eq!(first.diff().map(|d| d.inserted_items.len()), Some(3));

        let second = reconciler.apply(&mut surface, &mut pool, items(&[1, 2, 3]), false);
        assert!(second.diff().is_some_and(|d| d.is_empty()));
        assert_eq!(surface.updates.len(), 1);
    }

    #[test]
    fn apply_sweeps_the_pool() {
        let mut reconciler = Reconciler::default();
        let mut surface = ScriptedSurface::default();
        let mut pool = ContentPool::default();
        pool.set(1, 10);
        pool.set(4, 40);

        reconciler.apply(&mut surface, &mut pool, items(&[1, 2]), false);
        assert!(pool.contains(&1));
        assert!(!pool.contains(&4));
    }

    #[test]
    fn snapshots_queue_behind_a_running_transition() {
        let mut reconciler = Reconciler::default();
        let mut surface = ScriptedSurface {
            animate: true,
            ..ScriptedSurface::default()
        };
        let mut pool = ContentPool::default();

        reconciler.apply(&mut surface, &mut pool, items(&[1]), true);
        assert!(reconciler.is_in_transition());

        let queued = reconciler.apply(&mut surface, &mut pool, items(&[1, 2]), false);
        assert_eq!(queued, ApplyOutcome::Queued { position: 0 });
        let queued = reconciler.apply(&mut surface, &mut pool, items(&[2, 1]), false);
        assert_eq!(queued, ApplyOutcome::Queued { position: 1 });
        assert_eq!(reconciler.current(), &items(&[1]));
        assert_eq!(reconciler.latest(), &items(&[2, 1]));

        let applied = reconciler.transition_did_finish(&mut surface, &mut pool);
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].inserted_items.len(), 1);
        assert_eq!(applied[1].moved_items.len(), 1);
        assert_eq!(reconciler.current(), &items(&[2, 1]));
        assert_eq!(reconciler.pending_count(), 0);
        assert_eq!(surface.updates.len(), 3);
    }

    #[test]
    fn draining_stops_at_the_next_animated_snapshot() {
        let mut reconciler = Reconciler::default();
        let mut surface = ScriptedSurface {
            animate: true,
            ..ScriptedSurface::default()
        };
        let mut pool = ContentPool::default();

        reconciler.apply(&mut surface, &mut pool, items(&[1]), true);
        reconciler.apply(&mut surface, &mut pool, items(&[1, 2]), true);
        reconciler.apply(&mut surface, &mut pool, items(&[1, 2, 3]), true);

        assert_eq!(reconciler.transition_did_finish(&mut surface, &mut pool).len(), 1);
        assert!(reconciler.is_in_transition());
        assert_eq!(reconciler.pending_count(), 1);
    }

    #[test]
    fn surface_failure_falls_back_to_reload() {
        let mut reconciler = Reconciler::default();
        let mut surface = ScriptedSurface {
            fail: true,
            ..ScriptedSurface::default()
        };
        let mut pool = ContentPool::default();

        let outcome = reconciler.apply(&mut surface, &mut pool, items(&[1, 2]), true);
        assert!(!outcome.is_queued());
        assert_eq!(surface.reloads, vec![vec![2]]);
        assert!(!reconciler.is_in_transition());
        assert_eq!(reconciler.current(), &items(&[1, 2]));
    }
}
