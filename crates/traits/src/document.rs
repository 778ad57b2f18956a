//! DocumentStore trait for abstracting the quiz results document.
//!
//! The engine reads and mutates the document only through this trait, so it can
//! run against an XML file on disk or a tree built in memory by a test.

use std::fmt::Debug;
use thiserror::Error;

/// Tag wildcard accepted by the child lookups.
pub const ANY_TAG: &str = "*";

/// Error type for document operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Invalid node {node:?}: {message}")]
    InvalidNode { node: NodeId, message: String },

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        DocumentError::Io(err.to_string())
    }
}

/// Handle to an element owned by a `DocumentStore`.
///
/// Handles stay valid for the lifetime of the store, including for elements that
/// were detached by a removal; such elements are simply no longer reachable from
/// the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// An ordered tree of elements with attributes and optional text content.
///
/// Child lookups are filtered by tag; pass [`ANY_TAG`] to see every child.
/// Mutations that would break the tree (attaching an element that already has a
/// parent, addressing a handle the store never issued) fail with
/// [`DocumentError::InvalidNode`].
pub trait DocumentStore: Debug {
    /// The document element (`Session` for a quiz).
    fn root(&self) -> NodeId;

    fn tag(&self, node: NodeId) -> Option<&str>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of `parent` with the given tag, in document order.
    fn children(&self, parent: NodeId, tag: &str) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// All attributes of `node` in insertion order.
    fn attributes(&self, node: NodeId) -> Vec<(&str, &str)>;

    /// Text content of the element, if any.
    fn text(&self, node: NodeId) -> Option<&str>;

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DocumentError>;

    /// Sets each attribute, replacing existing values and appending new names.
    fn update_attributes(
        &mut self,
        node: NodeId,
        attributes: &[(&str, &str)],
    ) -> Result<(), DocumentError>;

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId;

    /// Deep-copies `node` and its subtree into a new detached element.
    fn copy_element(&mut self, node: NodeId) -> Result<NodeId, DocumentError>;

    /// Attaches a detached `child` so that it becomes child number `index` of
    /// `parent` (counting all element children). An index past the end appends.
    fn insert_element_before_index(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), DocumentError>;

    fn append_element(&mut self, parent: NodeId, child: NodeId) -> Result<(), DocumentError>;

    /// Detaches every descendant of `ancestor` with the given tag.
    /// Returns how many elements were removed.
    fn remove_all_elements(&mut self, ancestor: NodeId, tag: &str) -> Result<usize, DocumentError>;

    /// Persists the document. In-memory stores treat this as a no-op.
    fn save(&mut self) -> Result<(), DocumentError>;

    /// Returns a human-readable name for this store (for logging/debugging).
    fn name(&self) -> &'static str;

    fn nth_child(&self, parent: NodeId, tag: &str, n: usize) -> Option<NodeId> {
        self.children(parent, tag).get(n).copied()
    }

    fn last_child(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.children(parent, tag).last().copied()
    }

    /// Descendants of `node` with the given tag, in document order.
    fn descendants(&self, node: NodeId, tag: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node, ANY_TAG).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            if tag == ANY_TAG || self.tag(next) == Some(tag) {
                found.push(next);
            }
            stack.extend(self.children(next, ANY_TAG).into_iter().rev());
        }
        found
    }

    /// Position of `node` among all element children of its parent.
    fn child_position(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent, ANY_TAG).iter().position(|c| *c == node)
    }
}
