//! The flattened navigation sequence.
//!
//! Every `QuestionSet` of every `Page` becomes one [`NavigationEntry`]. The list is
//! derived from the document and rebuilt after any structural change; page
//! indices in it are positions, not identities.

use crate::error::QuizError;
use crate::model::{PageRecord, pages, question_sets};
use itertools::Itertools;
use log::debug;
use quizflow_traits::DocumentStore;
use quizflow_types::{NavigationEntry, attr, tag};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationList {
    entries: Vec<NavigationEntry>,
}

impl NavigationList {
    pub fn new(entries: Vec<NavigationEntry>) -> Self {
        Self { entries }
    }

    /// Walks the pages in document order and emits one entry per question set.
    ///
    /// A page without question sets still gets one entry (question set 0) so
    /// image-only pages can be visited. A missing or non-numeric `PageGroup`
    /// falls back to `page_index + 1`, unique per page, so ungrouped pages
    /// never share a group.
    pub fn build(doc: &dyn DocumentStore) -> Result<Self, QuizError> {
        let mut entries = Vec::new();
        for (page_index, page) in pages(doc).into_iter().enumerate() {
            let record = PageRecord::read(doc, page)?;
            let group = record.page_group.unwrap_or(page_index as u32 + 1);
            let count = question_sets(doc, page).len().max(1);
            entries.extend(
                (0..count).map(|qs| NavigationEntry::new(page_index, qs, group, record.rep)),
            );
        }
        debug!("Built navigation list with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NavigationEntry> {
        self.entries.get(index)
    }

    /// Like [`get`](Self::get) but reports an out-of-range cursor as an error.
    pub fn entry(&self, index: usize) -> Result<&NavigationEntry, QuizError> {
        self.entries.get(index).ok_or(QuizError::NavigationOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NavigationEntry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn last_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    /// Distinct page groups in ascending order.
    pub fn unique_page_groups(&self) -> Vec<u32> {
        self.entries
            .iter()
            .map(|e| e.page_group)
            .unique()
            .sorted()
            .collect()
    }

    /// Index of the first entry for the page at `page_index` with repetition `rep`.
    pub fn position_of(&self, page_index: usize, rep: u32) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.page_index == page_index && e.rep == rep)
    }

    /// Index of the first question set of the page shown at `index`.
    pub fn page_start(&self, index: usize) -> usize {
        let Some(page) = self.entries.get(index).map(|e| e.page_index) else {
            return index;
        };
        let mut start = index;
        while start > 0 && self.entries[start - 1].page_index == page {
            start -= 1;
        }
        start
    }

    /// True when `index` shows the final question set of its page.
    pub fn is_last_question_set(&self, index: usize) -> bool {
        match (self.entries.get(index), self.entries.get(index + 1)) {
            (Some(current), Some(next)) => current.page_index != next.page_index,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

impl<'a> IntoIterator for &'a NavigationList {
    type Item = &'a NavigationEntry;
    type IntoIter = std::slice::Iter<'a, NavigationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Brings every page up to the shape navigation expects: at least one
/// `QuestionSet` (a blank one is appended) and a `Rep` attribute (`"0"`).
///
/// Returns the number of pages that were changed. Does not save.
pub fn normalize_pages(doc: &mut dyn DocumentStore) -> Result<usize, QuizError> {
    let mut changed = 0;
    for page in pages(doc) {
        let mut touched = false;
        if question_sets(doc, page).is_empty() {
            let blank = doc.create_element(tag::QUESTION_SET, &[]);
            doc.append_element(page, blank)?;
            touched = true;
        }
        if doc.attribute(page, attr::REP).is_none() {
            doc.update_attributes(page, &[(attr::REP, "0")])?;
            touched = true;
        }
        if touched {
            changed += 1;
        }
    }
    if changed > 0 {
        debug!("Normalized {changed} pages");
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizflow_traits::ElementTree;

    fn entries(list: &NavigationList) -> Vec<[usize; 4]> {
        list.iter()
            .map(|e| {
                [
                    e.page_index,
                    e.question_set_index,
                    e.page_group as usize,
                    e.rep as usize,
                ]
            })
            .collect()
    }

    fn quiz(pages: &[(&str, Option<&str>, usize)]) -> ElementTree {
        let mut tree = ElementTree::new("Session");
        let root = tree.root();
        for (id, group, question_sets) in pages {
            let mut attrs = vec![("ID", *id)];
            if let Some(group) = group {
                attrs.push(("PageGroup", *group));
            }
            let page = tree.add_child(root, "Page", &attrs).unwrap();
            for _ in 0..*question_sets {
                tree.add_child(page, "QuestionSet", &[]).unwrap();
            }
        }
        tree
    }

    #[test]
    fn test_build_one_entry_per_question_set() {
        let tree = quiz(&[("Pt1", Some("1"), 2), ("Pt2", Some("2"), 1), ("Pt3", Some("2"), 2)]);
        let list = NavigationList::build(&tree).unwrap();
        assert_eq!(
            entries(&list),
            vec![[0, 0, 1, 0], [0, 1, 1, 0], [1, 0, 2, 0], [2, 0, 2, 0], [2, 1, 2, 0]]
        );
    }

    #[test]
    fn test_image_only_page_still_navigates() {
        let tree = quiz(&[("Pt1", Some("1"), 0)]);
        let list = NavigationList::build(&tree).unwrap();
        assert_eq!(entries(&list), vec![[0, 0, 1, 0]]);
    }

    #[test]
    fn test_missing_or_bad_group_gets_unique_fallback() {
        let tree = quiz(&[("Pt1", None, 1), ("Pt2", Some("x"), 1), ("Pt3", None, 1)]);
        let list = NavigationList::build(&tree).unwrap();
        assert_eq!(list.unique_page_groups(), vec![1, 2, 3]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let tree = quiz(&[("Pt1", Some("0"), 1), ("Pt2", Some("1"), 3)]);
        let first = NavigationList::build(&tree).unwrap();
        let second = NavigationList::build(&tree).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_page_boundaries() {
        let tree = quiz(&[("Pt1", Some("1"), 1), ("Pt2", Some("1"), 3)]);
        let list = NavigationList::build(&tree).unwrap();
        assert_eq!(list.page_start(3), 1);
        assert_eq!(list.page_start(0), 0);
        assert!(list.is_last_question_set(0));
        assert!(!list.is_last_question_set(1));
        assert!(list.is_last_question_set(3));
        assert!(!list.is_last_question_set(4));
        assert_eq!(list.position_of(1, 0), Some(1));
        assert_eq!(list.position_of(1, 1), None);
    }

    #[test]
    fn test_out_of_range_entry() {
        let list = NavigationList::default();
        assert_eq!(
            list.entry(0),
            Err(QuizError::NavigationOutOfRange { index: 0, len: 0 })
        );
        assert_eq!(list.last_index(), None);
    }

    #[test]
    fn test_normalize_adds_blank_question_set_and_rep() {
        let mut tree = quiz(&[("Pt1", Some("1"), 0), ("Pt2", Some("1"), 1)]);
        let changed = normalize_pages(&mut tree).unwrap();
        assert_eq!(changed, 2);

        let pages = pages(&tree);
        assert_eq!(question_sets(&tree, pages[0]).len(), 1);
        assert_eq!(question_sets(&tree, pages[1]).len(), 1);
        assert_eq!(tree.attribute(pages[0], "Rep"), Some("0"));

        assert_eq!(normalize_pages(&mut tree).unwrap(), 0);
    }
}
