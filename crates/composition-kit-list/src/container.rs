//! Pass-through cell that displays a caller-owned view verbatim.

use crate::identity::IndexPath;

/// Something that hosts at most one content view.
pub trait ContentHost {
    type Content;

    fn has_content(&self) -> bool;

    /// Hosts `content`. Returns false if that exact view was already hosted.
    fn set_content(&mut self, content: Self::Content) -> bool;

    fn content(&self) -> Option<&Self::Content>;

    fn take_content(&mut self) -> Option<Self::Content>;
}

/// Cell wrapping a view that bypasses the surface's recycling: the same view
/// instance is shown every time, never rebuilt.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerCell<V> {
    index_path: IndexPath,
    content: Option<V>,
}

impl<V> ContainerCell<V> {
    pub fn new(index_path: IndexPath) -> Self {
        Self {
            index_path,
            content: None,
        }
    }

    pub fn with_content(index_path: IndexPath, content: V) -> Self {
        Self {
            index_path,
            content: Some(content),
        }
    }

    pub fn index_path(&self) -> IndexPath {
        self.index_path
    }

    /// Detaches the hosted view before the cell is reused for another item.
    pub fn prepare_for_reuse(&mut self, index_path: IndexPath) -> Option<V> {
        self.index_path = index_path;
        self.content.take()
    }
}

impl<V: PartialEq> ContentHost for ContainerCell<V> {
    type Content = V;

    fn has_content(&self) -> bool {
        self.content.is_some()
    }

    fn set_content(&mut self, content: V) -> bool {
        if self.content.as_ref() == Some(&content) {
            return false;
        }
        self.content = Some(content);
        true
    }

    fn content(&self) -> Option<&V> {
        self.content.as_ref()
    }

    fn take_content(&mut self) -> Option<V> {
        self.content.take()
    }
}
