pub mod document;
pub mod tree;

pub use document::{ANY_TAG, DocumentError, DocumentStore, NodeId};
pub use tree::ElementTree;
