//! Repetitions of looped pages.
//!
//! A repetition is a deep copy of the current page, stripped of the user's
//! work and inserted right after the last existing repetition, so all
//! repetitions of a page stay contiguous in document order.

use crate::error::QuizError;
use crate::model::{PageRecord, page_node, pages};
use crate::navigation::NavigationList;
use crate::randomizer::rebuild_navigation;
use log::{debug, info};
use quizflow_traits::DocumentStore;
use quizflow_types::{NO, PageId, attr, tag};

/// Elements the user produced on a page; a repetition starts without them.
const USER_ARTIFACTS: [&str; 3] = [tag::LABEL_MAP_PATH, tag::MARKUP_LINE_PATH, tag::RESPONSE];

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatOutcome {
    /// Navigation rebuilt after the insertion.
    pub navigation: NavigationList,
    /// Index of the new page's first question set.
    pub index: usize,
    pub page_index: usize,
    pub page_id: PageId,
    pub rep: u32,
}

/// Inserts a repetition of the page at navigation index `current_index`,
/// rebuilds navigation and saves.
///
/// The new page goes in front of the next page with `Rep="0"` after the
/// current one (or at the end of the session). Its `Rep` is one more than that
/// of the page it follows, and its ID is `<base>-Rep<n>`. Any malformed `Rep`
/// aborts before the document is changed.
pub fn create_repeated_page(
    doc: &mut dyn DocumentStore,
    list: &NavigationList,
    current_index: usize,
) -> Result<RepeatOutcome, QuizError> {
    let page_index = list.entry(current_index)?.page_index;
    let original = page_node(doc, page_index)?;
    let all_pages = pages(doc);

    let mut insertion = all_pages.len();
    for (i, page) in all_pages.iter().enumerate().skip(page_index + 1) {
        if PageRecord::read(doc, *page)?.rep == 0 {
            insertion = i;
            break;
        }
    }
    let previous = PageRecord::read(doc, all_pages[insertion - 1])?;
    let rep = previous.rep + 1;
    let page_id = previous.id.with_rep(rep);
    debug!(
        "Repeating page {} as {} at page index {insertion}",
        previous.id, page_id
    );

    let root = doc.root();
    let position = match all_pages.get(insertion) {
        Some(next) => doc.child_position(*next),
        None => doc.child_position(all_pages[insertion - 1]).map(|p| p + 1),
    }
    .ok_or_else(|| QuizError::structure("page is not attached to the session"))?;

    let copy = doc.copy_element(original)?;
    for artifact in USER_ARTIFACTS {
        doc.remove_all_elements(copy, artifact)?;
    }
    let rep_text = rep.to_string();
    doc.update_attributes(
        copy,
        &[
            (attr::ID, page_id.as_str()),
            (attr::REP, rep_text.as_str()),
            (attr::PAGE_COMPLETE, NO),
        ],
    )?;
    doc.insert_element_before_index(root, copy, position)?;

    let navigation = rebuild_navigation(doc)?;
    let index = navigation.position_of(insertion, rep).ok_or_else(|| {
        QuizError::structure(format!("repeated page {page_id} is missing from navigation"))
    })?;
    doc.save()?;
    info!("Created repeated page {page_id} at navigation index {index}");

    Ok(RepeatOutcome {
        navigation,
        index,
        page_index: insertion,
        page_id,
        rep,
    })
}
