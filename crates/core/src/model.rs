//! Typed views of document elements.
//!
//! Attribute strings are decoded once here; engine logic works with the typed
//! records and writes strings back only through the document store.

use crate::error::QuizError;
use quizflow_traits::{DocumentStore, NodeId};
use quizflow_types::{PageId, ReferenceId, attr, is_yes, tag};

/// All `Page` elements of the session, in document order.
pub fn pages(doc: &dyn DocumentStore) -> Vec<NodeId> {
    doc.children(doc.root(), tag::PAGE)
}

/// The `Page` at `page_index` in document order.
pub fn page_node(doc: &dyn DocumentStore, page_index: usize) -> Result<NodeId, QuizError> {
    doc.nth_child(doc.root(), tag::PAGE, page_index)
        .ok_or_else(|| QuizError::structure(format!("no Page at index {page_index}")))
}

pub fn question_sets(doc: &dyn DocumentStore, page: NodeId) -> Vec<NodeId> {
    doc.children(page, tag::QUESTION_SET)
}

/// Reads an integer attribute. Missing or blank is `None`; anything else that
/// is not an integer is an error.
pub fn integer_attribute(
    doc: &dyn DocumentStore,
    node: NodeId,
    name: &str,
) -> Result<Option<u32>, QuizError> {
    match doc.attribute(node, name).map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| QuizError::InvalidAttribute {
                element: doc.tag(node).unwrap_or_default().to_string(),
                attribute: name.to_string(),
                value: value.to_string(),
            }),
    }
}

pub fn is_quiz_complete(doc: &dyn DocumentStore) -> bool {
    is_yes(doc.attribute(doc.root(), attr::QUIZ_COMPLETE))
}

/// The attributes of a `Page` the engine cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub node: NodeId,
    pub id: PageId,
    /// `None` when absent or not numeric.
    pub page_group: Option<u32>,
    pub rep: u32,
    pub complete: bool,
    pub go_to_bookmark: Option<ReferenceId>,
    pub looped: bool,
    pub segment_required: bool,
}

impl PageRecord {
    /// Decodes a page. A non-integer `Rep` is fatal; a non-numeric `PageGroup`
    /// is treated as missing.
    pub fn read(doc: &dyn DocumentStore, node: NodeId) -> Result<Self, QuizError> {
        let reference = |name: &str| {
            doc.attribute(node, name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ReferenceId::from)
        };
        Ok(Self {
            node,
            id: PageId::from(doc.attribute(node, attr::ID).unwrap_or_default()),
            page_group: doc
                .attribute(node, attr::PAGE_GROUP)
                .and_then(|v| v.trim().parse::<u32>().ok()),
            rep: integer_attribute(doc, node, attr::REP)?.unwrap_or(0),
            complete: is_yes(doc.attribute(node, attr::PAGE_COMPLETE)),
            go_to_bookmark: reference(attr::GO_TO_BOOKMARK),
            looped: is_yes(doc.attribute(node, attr::LOOP)),
            segment_required: is_yes(doc.attribute(node, attr::SEGMENT_REQUIRED)),
        })
    }

    pub fn read_at(doc: &dyn DocumentStore, page_index: usize) -> Result<Self, QuizError> {
        Self::read(doc, page_node(doc, page_index)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizflow_traits::ElementTree;

    #[test]
    fn test_page_record_decodes_flags() {
        let mut tree = ElementTree::new("Session");
        let root = tree.root();
        let page = tree
            .add_child(
                root,
                "Page",
                &[
                    ("ID", "Pt1-Rep2"),
                    ("PageGroup", "abc"),
                    ("Rep", " 2 "),
                    ("PageComplete", "Y"),
                    ("Loop", "Y"),
                    ("GoToBookmark", "Start"),
                ],
            )
            .unwrap();

        let record = PageRecord::read(&tree, page).unwrap();
        assert_eq!(record.id.base(), "Pt1");
        assert_eq!(record.page_group, None);
        assert_eq!(record.rep, 2);
        assert!(record.complete);
        assert!(record.looped);
        assert!(!record.segment_required);
        assert_eq!(record.go_to_bookmark, Some(ReferenceId::from("Start")));
    }

    #[test]
    fn test_malformed_rep_is_fatal() {
        let mut tree = ElementTree::new("Session");
        let root = tree.root();
        let page = tree.add_child(root, "Page", &[("ID", "Pt1"), ("Rep", "one")]).unwrap();

        let err = PageRecord::read(&tree, page).unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidAttribute {
                element: "Page".into(),
                attribute: "Rep".into(),
                value: "one".into(),
            }
        );
    }

    #[test]
    fn test_page_node_out_of_range() {
        let tree = ElementTree::new("Session");
        assert!(matches!(page_node(&tree, 0), Err(QuizError::Structure(_))));
    }
}
