//! Backward search through the pages a user has already passed.
//!
//! "History" follows the navigation list in its current order, so after a
//! randomized shuffle the most recent match is the one the user actually saw
//! last, not the one that comes last in the document.

use crate::error::QuizError;
use crate::model::{PageRecord, page_node};
use crate::navigation::NavigationList;
use log::debug;
use quizflow_traits::{DocumentStore, NodeId};
use quizflow_types::{FIXED_PAGE_GROUP, attr, tag};

/// A matching element and the navigation index of the page it was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryMatch {
    pub index: usize,
    pub node: NodeId,
}

/// Which elements to test, relative to each `Page`, and the attribute value to look for.
///
/// An empty `path` tests the `Page` itself; `["Image"]` tests the page's images.
#[derive(Debug, Clone, Copy)]
pub struct AttributeQuery<'a> {
    pub path: &'a [&'a str],
    pub attribute: &'a str,
    pub value: &'a str,
}

impl<'a> AttributeQuery<'a> {
    pub fn new(path: &'a [&'a str], attribute: &'a str, value: &'a str) -> Self {
        Self {
            path,
            attribute,
            value,
        }
    }
}

/// Finds the most recent element, strictly before `target_index` in navigation
/// order, whose attribute equals the query value.
pub fn find_most_recent_match(
    doc: &dyn DocumentStore,
    list: &NavigationList,
    target_index: usize,
    query: AttributeQuery<'_>,
) -> Result<Option<HistoryMatch>, QuizError> {
    search(doc, list, target_index, query, None)
}

/// Like [`find_most_recent_match`], but a match only counts when its page is in
/// the same page group as the page at `target_index`, or in group 0.
///
/// A target page without an explicit `PageGroup` has no group to stay within
/// and is searched like [`find_most_recent_match`].
pub fn find_most_recent_match_in_group(
    doc: &dyn DocumentStore,
    list: &NavigationList,
    target_index: usize,
    query: AttributeQuery<'_>,
) -> Result<Option<HistoryMatch>, QuizError> {
    let group = PageRecord::read_at(doc, list.entry(target_index)?.page_index)?.page_group;
    search(doc, list, target_index, query, group)
}

fn search(
    doc: &dyn DocumentStore,
    list: &NavigationList,
    target_index: usize,
    query: AttributeQuery<'_>,
    group: Option<u32>,
) -> Result<Option<HistoryMatch>, QuizError> {
    let end = target_index.min(list.len());
    let mut last_page = None;
    for index in (0..end).rev() {
        let entry = list.entry(index)?;
        // Consecutive question sets of one page share the same elements.
        if last_page == Some(entry.page_index) {
            continue;
        }
        last_page = Some(entry.page_index);

        let page = page_node(doc, entry.page_index)?;
        if let Some(group) = group {
            // Pages without an explicit PageGroup belong to no group.
            let candidate = PageRecord::read(doc, page)?.page_group;
            if candidate != Some(group) && candidate != Some(FIXED_PAGE_GROUP) {
                continue;
            }
        }

        let found = elements_at(doc, page, query.path)
            .into_iter()
            .rev()
            .find(|node| doc.attribute(*node, query.attribute) == Some(query.value));
        if let Some(node) = found {
            debug!(
                "History match for {}={} at navigation index {index}",
                query.attribute, query.value
            );
            return Ok(Some(HistoryMatch { index, node }));
        }
    }
    Ok(None)
}

fn elements_at(doc: &dyn DocumentStore, start: NodeId, path: &[&str]) -> Vec<NodeId> {
    let mut level = vec![start];
    for step in path {
        level = level
            .into_iter()
            .flat_map(|node| doc.children(node, step))
            .collect();
    }
    level
}

/// Resolves the `GoToBookmark` of the page at `index` to the navigation index of
/// the first question set of the most recent page carrying that `BookmarkID`.
pub fn resolve_bookmark(
    doc: &dyn DocumentStore,
    list: &NavigationList,
    index: usize,
) -> Result<Option<usize>, QuizError> {
    let record = PageRecord::read_at(doc, list.entry(index)?.page_index)?;
    let Some(bookmark) = record.go_to_bookmark else {
        return Ok(None);
    };
    let query = AttributeQuery::new(&[], attr::BOOKMARK_ID, bookmark.as_str());
    Ok(find_most_recent_match_in_group(doc, list, index, query)?.map(|m| list.page_start(m.index)))
}

/// For an image with `DisplayLabelMapID`, finds the label map saved by the most
/// recent image (same group, or group 0) carrying the matching `LabelMapID`.
pub fn linked_label_map_path(
    doc: &dyn DocumentStore,
    list: &NavigationList,
    index: usize,
    image: NodeId,
) -> Result<Option<String>, QuizError> {
    let Some(id) = doc.attribute(image, attr::DISPLAY_LABEL_MAP_ID) else {
        return Ok(None);
    };
    let query = AttributeQuery::new(&[tag::IMAGE], attr::LABEL_MAP_ID, id);
    let Some(found) = find_most_recent_match_in_group(doc, list, index, query)? else {
        return Ok(None);
    };
    Ok(doc
        .last_child(found.node, tag::LABEL_MAP_PATH)
        .and_then(|p| doc.text(p))
        .map(str::to_string))
}
