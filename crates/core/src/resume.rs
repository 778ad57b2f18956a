//! Where a returning user lands.

use crate::completion::question_set_answered;
use crate::error::QuizError;
use crate::model::{PageRecord, is_quiz_complete, page_node, question_sets};
use crate::navigation::NavigationList;
use log::info;
use quizflow_traits::{ANY_TAG, DocumentStore, NodeId};
use quizflow_types::attr;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePoint {
    pub index: usize,
    /// The user has been here before; strict answer gating is relaxed.
    pub resuming: bool,
    /// The whole quiz was already finished; the caller offers a read-only review.
    pub quiz_complete: bool,
}

/// Resolves the navigation index a session should open at.
///
/// A finished quiz opens at index 0 flagged complete. Otherwise the user lands
/// on the first page in navigation order that is not marked complete, at its
/// first unanswered question set (or its last question set when all are
/// answered). When every page is complete but the quiz was never finished the
/// last index is used.
pub fn resolve_resume_index(
    doc: &dyn DocumentStore,
    list: &NavigationList,
) -> Result<ResumePoint, QuizError> {
    if list.is_empty() {
        return Err(QuizError::structure("quiz has no pages to navigate"));
    }
    if is_quiz_complete(doc) {
        info!("Quiz already complete; opening for review");
        return Ok(ResumePoint {
            index: 0,
            resuming: true,
            quiz_complete: true,
        });
    }

    let mut index = list.last_index().unwrap_or_default();
    for (i, entry) in list.iter().enumerate() {
        // The first entry seen for a page is its page start.
        if i != list.page_start(i) {
            continue;
        }
        if !PageRecord::read_at(doc, entry.page_index)?.complete {
            index = first_unanswered_question_set(doc, list, i)?;
            break;
        }
    }

    let resuming = index != 0 || has_login_history(doc, page_node(doc, list.entry(0)?.page_index)?);
    if resuming {
        info!("Resuming at navigation index {index}");
    }
    Ok(ResumePoint {
        index,
        resuming,
        quiz_complete: false,
    })
}

fn first_unanswered_question_set(
    doc: &dyn DocumentStore,
    list: &NavigationList,
    start: usize,
) -> Result<usize, QuizError> {
    let page_index = list.entry(start)?.page_index;
    let sets = question_sets(doc, page_node(doc, page_index)?);
    let mut index = start;
    while list.get(index).is_some_and(|e| e.page_index == page_index) {
        let qs = list.entry(index)?.question_set_index;
        if sets.get(qs).is_some_and(|node| !question_set_answered(doc, *node)) {
            return Ok(index);
        }
        if list.is_last_question_set(index) {
            break;
        }
        index += 1;
    }
    Ok(index)
}

/// True when anything on the page carries a `LoginTime`: a response or an
/// image state was recorded during an earlier login.
pub fn has_login_history(doc: &dyn DocumentStore, page: NodeId) -> bool {
    doc.descendants(page, ANY_TAG)
        .into_iter()
        .any(|node| doc.attribute(node, attr::LOGIN_TIME).is_some())
}
