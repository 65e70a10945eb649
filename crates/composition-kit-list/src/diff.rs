//! Identity-based difference between two snapshots.
//!
//! Sections and items are matched by identity. Elements present on both sides
//! keep their place when they belong to the longest run whose relative order
//! is unchanged; every other surviving element is reported as a move. This
//! keeps the move set minimal for pure reorders and makes applying a snapshot
//! to itself produce an empty diff.

use crate::identity::{IndexPath, ItemIdentifier, SectionIdentifier};
use crate::snapshot::Snapshot;
use crate::surface::SurfaceUpdate;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionChange<S> {
    pub section: S,
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionMove<S> {
    pub section: S,
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemChange<I> {
    pub item: I,
    pub index_path: IndexPath,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemMove<I> {
    pub item: I,
    pub from: IndexPath,
    pub to: IndexPath,
}

/// Changes that turn one snapshot into another.
///
/// Deleted entries carry positions in the old snapshot, inserted entries
/// positions in the new one. Items that disappear together with their
/// section, or arrive together with a new section, are covered by the
/// section change and not listed individually. Items that survive are always
/// listed as moves when they relocate, even into or out of such sections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotDiff<S, I> {
    pub deleted_sections: Vec<SectionChange<S>>,
    pub inserted_sections: Vec<SectionChange<S>>,
    pub moved_sections: Vec<SectionMove<S>>,
    pub deleted_items: Vec<ItemChange<I>>,
    pub inserted_items: Vec<ItemChange<I>>,
    pub moved_items: Vec<ItemMove<I>>,
}

impl<S, I> Default for SnapshotDiff<S, I> {
    fn default() -> Self {
        Self {
            deleted_sections: Vec::new(),
            inserted_sections: Vec::new(),
            moved_sections: Vec::new(),
            deleted_items: Vec::new(),
            inserted_items: Vec::new(),
            moved_items: Vec::new(),
        }
    }
}

impl<S: SectionIdentifier, I: ItemIdentifier> SnapshotDiff<S, I> {
    pub fn between(old: &Snapshot<S, I>, new: &Snapshot<S, I>) -> Self {
        let mut diff = Self::default();
        diff.diff_sections(old, new);
        diff.diff_items(old, new);
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    pub fn change_count(&self) -> usize {
        self.deleted_sections.len()
            + self.inserted_sections.len()
            + self.moved_sections.len()
            + self.deleted_items.len()
            + self.inserted_items.len()
            + self.moved_items.len()
    }

    /// Positional form of this diff for a rendering surface.
    pub fn to_surface_update(&self, new: &Snapshot<S, I>) -> SurfaceUpdate {
        SurfaceUpdate {
            deleted_sections: self.deleted_sections.iter().map(|c| c.index).collect(),
            inserted_sections: self.inserted_sections.iter().map(|c| c.index).collect(),
            moved_sections: self.moved_sections.iter().map(|m| (m.from, m.to)).collect(),
            deleted_items: self.deleted_items.iter().map(|c| c.index_path).collect(),
            inserted_items: self.inserted_items.iter().map(|c| c.index_path).collect(),
            moved_items: self.moved_items.iter().map(|m| (m.from, m.to)).collect(),
            section_counts: new.section_counts(),
        }
    }

    fn diff_sections(&mut self, old: &Snapshot<S, I>, new: &Snapshot<S, I>) {
        for (index, section) in old.section_identifiers().enumerate() {
            if !new.contains_section(section) {
                self.deleted_sections.push(SectionChange {
                    section: section.clone(),
                    index,
                });
            }
        }

        let mut surviving = Vec::new();
        let mut old_order = Vec::new();
        for (index, section) in new.section_identifiers().enumerate() {
            match old.section_index(section) {
                Some(old_index) => {
                    surviving.push((section, old_index, index));
                    old_order.push(old_index);
                }
                None => self.inserted_sections.push(SectionChange {
                    section: section.clone(),
                    index,
                }),
            }
        }

        let stable = longest_increasing_subsequence(&old_order);
        for ((section, from, to), keep) in surviving.into_iter().zip(stable) {
            if !keep {
                self.moved_sections.push(SectionMove {
                    section: section.clone(),
                    from,
                    to,
                });
            }
        }
    }

    fn diff_items(&mut self, old: &Snapshot<S, I>, new: &Snapshot<S, I>) {
        let old_locations = old.item_locations();
        let new_locations = new.item_locations();

        for (section_index, (section, items)) in old.sections().enumerate() {
            if !new.contains_section(section) {
                continue;
            }
            for (position, item) in items.iter().enumerate() {
                if !new_locations.contains_key(item) {
                    self.deleted_items.push(ItemChange {
                        item: item.clone(),
                        index_path: IndexPath::new(section_index, position),
                    });
                }
            }
        }

        for (section_index, (section, items)) in new.sections().enumerate() {
            let section_is_new = !old.contains_section(section);
            let mut same_section = Vec::new();
            let mut old_order = Vec::new();

            for (position, item) in items.iter().enumerate() {
                let to = IndexPath::new(section_index, position);
                // Later occurrences of a duplicated item are ignored.
                if new_locations.get(item) != Some(&to) {
                    continue;
                }
                match old_locations.get(item) {
                    None => {
                        if !section_is_new {
                            self.inserted_items.push(ItemChange {
                                item: item.clone(),
                                index_path: to,
                            });
                        }
                    }
                    Some(&from) => {
                        if old.section_at(from.section) == Some(section) {
                            same_section.push((item, from, to));
                            old_order.push(from.item);
                        } else {
                            self.moved_items.push(ItemMove {
                                item: item.clone(),
                                from,
                                to,
                            });
                        }
                    }
                }
            }

            let stable = longest_increasing_subsequence(&old_order);
            for ((item, from, to), keep) in same_section.into_iter().zip(stable) {
                if !keep {
                    self.moved_items.push(ItemMove {
                        item: item.clone(),
                        from,
                        to,
                    });
                }
            }
        }

        self.moved_items.sort_by_key(|m| m.to);
    }
}

/// Marks the members of one longest strictly increasing subsequence.
fn longest_increasing_subsequence(sequence: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; sequence.len()];

    for (index, &value) in sequence.iter().enumerate() {
        let slot = tails.partition_point(|&tail| sequence[tail] < value);
        if slot > 0 {
            previous[index] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(index);
        } else {
            tails[slot] = index;
        }
    }

    let mut keep = vec![false; sequence.len()];
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        keep[index] = true;
        cursor = previous[index];
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SingleSection;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Section {
        Inbox,
        Archive,
        Spam,
    }

    fn snapshot(sections: Vec<(Section, Vec<&'static str>)>) -> Snapshot<Section, &'static str> {
        Snapshot::from_sections(sections).unwrap()
    }

    #[test]
    fn lis_marks_stable_run() {
        assert_eq!(
            longest_increasing_subsequence(&[0, 1, 2]),
            vec![true, true, true]
        );
        assert_eq!(
            longest_increasing_subsequence(&[2, 0, 1]),
            vec![false, true, true]
        );
        assert_eq!(longest_increasing_subsequence(&[]), Vec::<bool>::new());
        let keep = longest_increasing_subsequence(&[3, 1, 2, 0, 4]);
        assert_eq!(keep.iter().filter(|k| **k).count(), 3);
    }

    #[test]
    fn first_apply_inserts_sections_only() {
        let empty = Snapshot::new();
        let new = snapshot(vec![(Section::Inbox, vec!["a", "b"]), (Section::Archive, vec!["c"])]);
        let diff = SnapshotDiff::between(&empty, &new);

        assert_eq!(
            diff.inserted_sections,
            vec![
                SectionChange {
                    section: Section::Inbox,
                    index: 0
                },
                SectionChange {
                    section: Section::Archive,
                    index: 1
                },
            ]
        );
        // Items arriving with their section are covered by the section insert.
        assert!(diff.inserted_items.is_empty());
        assert!(diff.moved_items.is_empty());
    }

    #[test]
    fn same_snapshot_produces_empty_diff() {
        let s = snapshot(vec![(Section::Inbox, vec!["a", "b"]), (Section::Archive, vec!["c"])]);
        assert!(SnapshotDiff::between(&s, &s.clone()).is_empty());
    }

    #[test]
    fn inserts_and_deletes_within_a_section() {
        let old = Snapshot::with_items(["a", "b", "c"]);
        let new = Snapshot::with_items(["a", "c", "d"]);
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(
            diff.deleted_items,
            vec![ItemChange {
                item: "b",
                index_path: IndexPath::new(0, 1)
            }]
        );
        assert_eq!(
            diff.inserted_items,
            vec![ItemChange {
                item: "d",
                index_path: IndexPath::new(0, 2)
            }]
        );
        assert!(diff.moved_items.is_empty());
        assert!(diff.moved_sections.is_empty());
    }

    #[test]
    fn reorder_reports_minimal_moves() {
        let old = Snapshot::with_items(["a", "b", "c", "d"]);
        let new = Snapshot::with_items(["d", "a", "b", "c"]);
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(
            diff.moved_items,
            vec![ItemMove {
                item: "d",
                from: IndexPath::new(0, 3),
                to: IndexPath::new(0, 0)
            }]
        );
        assert!(diff.inserted_items.is_empty());
        assert!(diff.deleted_items.is_empty());
    }

    #[test]
    fn item_changing_section_is_a_move() {
        let old = snapshot(vec![(Section::Inbox, vec!["a", "b"]), (Section::Archive, vec!["c"])]);
        let new = snapshot(vec![(Section::Inbox, vec!["a"]), (Section::Archive, vec!["b", "c"])]);
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(
            diff.moved_items,
            vec![ItemMove {
                item: "b",
                from: IndexPath::new(0, 1),
                to: IndexPath::new(1, 0)
            }]
        );
        assert!(diff.deleted_items.is_empty());
        assert!(diff.inserted_items.is_empty());
    }

    #[test]
    fn section_reorder_and_removal() {
        let old = snapshot(vec![
            (Section::Inbox, vec!["a"]),
            (Section::Archive, vec!["b"]),
            (Section::Spam, vec!["c"]),
        ]);
        let new = snapshot(vec![(Section::Archive, vec!["b", "a"]), (Section::Inbox, vec![])]);
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(
            diff.deleted_sections,
            vec![SectionChange {
                section: Section::Spam,
                index: 2
            }]
        );
        assert_eq!(
            diff.moved_sections,
            vec![SectionMove {
                section: Section::Archive,
                from: 1,
                to: 0
            }]
        );
        // "c" leaves with its section; "a" survives and changes section.
        assert!(diff.deleted_items.is_empty());
        assert_eq!(diff.moved_items.len(), 1);
        assert_eq!(diff.moved_items[0].item, "a");
    }

    #[test]
    fn item_moving_into_new_section_is_still_a_move() {
        let old = snapshot(vec![(Section::Inbox, vec!["a", "b"])]);
        let new = snapshot(vec![(Section::Inbox, vec!["a"]), (Section::Spam, vec!["b", "x"])]);
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(diff.inserted_sections.len(), 1);
        assert!(diff.inserted_items.is_empty());
        assert_eq!(
            diff.moved_items,
            vec![ItemMove {
                item: "b",
                from: IndexPath::new(0, 1),
                to: IndexPath::new(1, 0)
            }]
        );
    }

    #[test]
    fn surface_update_carries_positions_and_counts() {
        let old = Snapshot::with_items([1, 2, 3]);
        let new = Snapshot::with_items([3, 1, 4]);
        let diff = SnapshotDiff::between(&old, &new);
        let update = diff.to_surface_update(&new);

        assert_eq!(update.deleted_items, vec![IndexPath::new(0, 1)]);
        assert_eq!(update.inserted_items, vec![IndexPath::new(0, 2)]);
        assert_eq!(
            update.moved_items,
            vec![(IndexPath::new(0, 2), IndexPath::new(0, 0))]
        );
        assert_eq!(update.section_counts.as_slice(), &[3]);
        assert!(!update.is_empty());

        let _: SnapshotDiff<SingleSection, i32> = SnapshotDiff::default();
    }
}
