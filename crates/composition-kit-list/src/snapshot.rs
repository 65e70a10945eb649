//! Ordered, sectioned description of what a list should display.
//!
//! A [`Snapshot`] is a plain value: the engine never mutates one after it has
//! been applied. Callers either build a new snapshot or clone the current
//! one, edit the clone, and apply it.

use std::fmt;

use composition_kit_runtime::collections::map::{HashMap, HashSet};
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::identity::{IndexPath, ItemIdentifier, SectionIdentifier, SingleSection};

/// Item counts per section, in section order.
pub type SectionCounts = SmallVec<[usize; 4]>;

/// Errors produced by snapshot editing operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    SectionNotFound { section: String },
    DuplicateSection { section: String },
    NoSections,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::SectionNotFound { section } => {
                write!(f, "section {section} is not in the snapshot")
            }
            SnapshotError::DuplicateSection { section } => {
                write!(f, "section {section} is already in the snapshot")
            }
            SnapshotError::NoSections => f.write_str("snapshot has no sections"),
        }
    }
}

impl std::error::Error for SnapshotError {}

#[derive(Clone)]
pub struct Snapshot<S, I> {
    sections: IndexMap<S, Vec<I>>,
}

impl<S, I> Default for Snapshot<S, I> {
    fn default() -> Self {
        Self {
            sections: IndexMap::new(),
        }
    }
}

impl<S: fmt::Debug, I: fmt::Debug> fmt::Debug for Snapshot<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.sections.iter()).finish()
    }
}

/// Equality is order-sensitive for both sections and items.
impl<S: SectionIdentifier, I: ItemIdentifier> PartialEq for Snapshot<S, I> {
    fn eq(&self, other: &Self) -> bool {
        self.sections.len() == other.sections.len()
            && self.sections.iter().eq(other.sections.iter())
    }
}

impl<S: SectionIdentifier, I: ItemIdentifier> Eq for Snapshot<S, I> {}

impl<I: ItemIdentifier> Snapshot<SingleSection, I> {
    /// A snapshot with the single [`SingleSection::Main`] section holding `items`.
    pub fn with_items(items: impl IntoIterator<Item = I>) -> Self {
        let mut sections = IndexMap::new();
        sections.insert(SingleSection::Main, items.into_iter().collect());
        Self { sections }
    }
}

impl<S: SectionIdentifier, I: ItemIdentifier> Snapshot<S, I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from `(section, items)` pairs in order.
    pub fn from_sections(
        sections: impl IntoIterator<Item = (S, Vec<I>)>,
    ) -> Result<Self, SnapshotError> {
        let mut snapshot = Self::new();
        for (section, items) in sections {
            snapshot.append_sections([section.clone()])?;
            snapshot.append_items(items, &section)?;
        }
        Ok(snapshot)
    }

    /// Appends empty sections at the end.
    ///
    /// Fails without modifying the snapshot if any section is already
    /// present or repeated in `sections`.
    pub fn append_sections(
        &mut self,
        sections: impl IntoIterator<Item = S>,
    ) -> Result<(), SnapshotError> {
        let sections: Vec<S> = sections.into_iter().collect();
        let mut seen = HashSet::default();
        for section in &sections {
            if self.sections.contains_key(section) || !seen.insert(section) {
                return Err(SnapshotError::DuplicateSection {
                    section: format!("{section:?}"),
                });
            }
        }
        for section in sections {
            self.sections.insert(section, Vec::new());
        }
        Ok(())
    }

    /// Appends items to the end of `section`.
    ///
    /// Items are not checked for uniqueness here; duplicates are reported when
    /// the snapshot is applied.
    pub fn append_items(
        &mut self,
        items: impl IntoIterator<Item = I>,
        section: &S,
    ) -> Result<(), SnapshotError> {
        match self.sections.get_mut(section) {
            Some(existing) => {
                existing.extend(items);
                Ok(())
            }
            None => Err(SnapshotError::SectionNotFound {
                section: format!("{section:?}"),
            }),
        }
    }

    /// Appends items to the last section.
    pub fn append_items_to_last_section(
        &mut self,
        items: impl IntoIterator<Item = I>,
    ) -> Result<(), SnapshotError> {
        match self.sections.last_mut() {
            Some((_, existing)) => {
                existing.extend(items);
                Ok(())
            }
            None => Err(SnapshotError::NoSections),
        }
    }

    /// Removes sections and their items. Unknown sections are ignored.
    pub fn delete_sections(&mut self, sections: &[S]) {
        for section in sections {
            self.sections.shift_remove(section);
        }
    }

    /// Removes items wherever they appear. Unknown items are ignored.
    pub fn delete_items(&mut self, items: &[I]) {
        let doomed: HashSet<&I> = items.iter().collect();
        for existing in self.sections.values_mut() {
            existing.retain(|item| !doomed.contains(item));
        }
    }

    /// Removes every section and item.
    pub fn delete_all_items(&mut self) {
        self.sections.clear();
    }

    /// Drops `section` (if present) and re-appends it at the end holding
    /// exactly `items`.
    pub fn replace_section_items(&mut self, section: S, items: impl IntoIterator<Item = I>) {
        self.sections.shift_remove(&section);
        self.sections.insert(section, items.into_iter().collect());
    }

    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn number_of_items(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn number_of_items_in_section(&self, section: &S) -> Option<usize> {
        self.sections.get(section).map(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_identifiers(&self) -> impl Iterator<Item = &S> + '_ {
        self.sections.keys()
    }

    /// All items across all sections, in display order.
    pub fn item_identifiers(&self) -> impl Iterator<Item = &I> + '_ {
        self.sections.values().flatten()
    }

    pub fn items_in_section(&self, section: &S) -> Option<&[I]> {
        self.sections.get(section).map(Vec::as_slice)
    }

    pub fn contains_section(&self, section: &S) -> bool {
        self.sections.contains_key(section)
    }

    pub fn contains_item(&self, item: &I) -> bool {
        self.item_identifiers().any(|candidate| candidate == item)
    }

    pub fn section_index(&self, section: &S) -> Option<usize> {
        self.sections.get_index_of(section)
    }

    pub fn section_at(&self, index: usize) -> Option<&S> {
        self.sections.get_index(index).map(|(section, _)| section)
    }

    pub fn item_at(&self, index_path: IndexPath) -> Option<&I> {
        self.sections
            .get_index(index_path.section)
            .and_then(|(_, items)| items.get(index_path.item))
    }

    /// Position of the first occurrence of `item`.
    pub fn index_path_of(&self, item: &I) -> Option<IndexPath> {
        self.sections
            .values()
            .enumerate()
            .find_map(|(section, items)| {
                items
                    .iter()
                    .position(|candidate| candidate == item)
                    .map(|position| IndexPath::new(section, position))
            })
    }

    /// Section holding the first occurrence of `item`.
    pub fn section_of(&self, item: &I) -> Option<&S> {
        self.index_path_of(item)
            .and_then(|path| self.section_at(path.section))
    }

    pub fn section_counts(&self) -> SectionCounts {
        self.sections.values().map(Vec::len).collect()
    }

    /// Items that appear more than once, each reported once in order of
    /// their second appearance.
    pub fn duplicate_items(&self) -> Vec<I> {
        let mut seen = HashSet::default();
        let mut reported = HashSet::default();
        let mut duplicates = Vec::new();
        for item in self.item_identifiers() {
            if !seen.insert(item) && reported.insert(item) {
                duplicates.push(item.clone());
            }
        }
        duplicates
    }

    /// First-occurrence position of every item.
    pub(crate) fn item_locations(&self) -> HashMap<&I, IndexPath> {
        let mut locations = HashMap::default();
        for (section, items) in self.sections.values().enumerate() {
            for (position, item) in items.iter().enumerate() {
                locations
                    .entry(item)
                    .or_insert(IndexPath::new(section, position));
            }
        }
        locations
    }

    pub(crate) fn sections(&self) -> impl Iterator<Item = (&S, &[I])> + '_ {
        self.sections
            .iter()
            .map(|(section, items)| (section, items.as_slice()))
    }
}
