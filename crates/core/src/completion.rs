//! Per-page completion requirements and the `PageComplete` / `QuizComplete` flags.
//!
//! A page is complete when every question set is answered, every image that
//! asks for markup lines has enough of them, and a required segmentation
//! exists. The flag is only ever set by an explicit advance from the page's last
//! question set; leaving any other way can only clear it.

use crate::error::QuizError;
use crate::model::question_sets;
use log::{debug, info};
use quizflow_traits::{DocumentStore, NodeId};
use quizflow_types::{INFO_BOX_TYPE, NO, YES, attr, is_yes, tag};
use std::collections::HashMap;

/// The user action that triggered a completion update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Next,
    Previous,
    Finish,
    Repeat,
    GoToBookmark,
    Exit,
}

impl PageAction {
    /// Actions that move the user forward and may therefore complete a page.
    pub fn is_advance(&self) -> bool {
        matches!(
            self,
            PageAction::Next | PageAction::Finish | PageAction::Repeat | PageAction::GoToBookmark
        )
    }
}

/// Markup-line requirement of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRequirement {
    pub image_id: String,
    pub required: usize,
    pub found: usize,
}

impl MarkupRequirement {
    pub fn is_met(&self) -> bool {
        self.found >= self.required
    }
}

/// Requirement lists for one page, refreshed on every page turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequirements {
    /// One flag per question set: all answer-requiring questions answered.
    pub question_sets: Vec<bool>,
    pub markup_lines: Vec<MarkupRequirement>,
    /// `None` when the page does not require a segmentation.
    pub segmentation: Option<bool>,
}

impl PageRequirements {
    /// Reads the current state of `page` from the document.
    pub fn collect(doc: &dyn DocumentStore, page: NodeId) -> Self {
        let question_sets = question_sets(doc, page)
            .into_iter()
            .map(|qs| question_set_answered(doc, qs))
            .collect();

        let images = doc.children(page, tag::IMAGE);
        let markup_lines = images
            .iter()
            .filter_map(|image| {
                let required = doc
                    .attribute(*image, attr::MIN_MARKUP_LINES)
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .filter(|n| *n > 0)?;
                Some(MarkupRequirement {
                    image_id: doc.attribute(*image, attr::ID).unwrap_or_default().to_string(),
                    required,
                    found: doc.children(*image, tag::MARKUP_LINE_PATH).len(),
                })
            })
            .collect();

        let segmentation = is_yes(doc.attribute(page, attr::SEGMENT_REQUIRED)).then(|| {
            images
                .iter()
                .any(|image| !doc.children(*image, tag::LABEL_MAP_PATH).is_empty())
        });

        Self {
            question_sets,
            markup_lines,
            segmentation,
        }
    }

    pub fn question_set_answered(&self, index: usize) -> bool {
        self.question_sets.get(index).copied().unwrap_or(true)
    }

    pub fn all_met(&self) -> bool {
        self.question_sets.iter().all(|answered| *answered)
            && self.markup_lines.iter().all(MarkupRequirement::is_met)
            && self.segmentation.unwrap_or(true)
    }

    /// One line per unmet requirement; empty when everything is satisfied.
    pub fn unmet_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .question_sets
            .iter()
            .enumerate()
            .filter(|(_, answered)| !**answered)
            .map(|(i, _)| format!("Question set {} has unanswered questions.", i + 1))
            .collect();
        messages.extend(self.markup_lines.iter().filter(|m| !m.is_met()).map(|m| {
            format!(
                "Image '{}' needs {} markup line(s), found {}.",
                m.image_id, m.required, m.found
            )
        }));
        if self.segmentation == Some(false) {
            messages.push("A segmentation is required on this page.".to_string());
        }
        messages
    }
}

/// A question needs an answer unless it is an info box; it is answered once
/// any of its options holds a `Response`.
pub fn question_answered(doc: &dyn DocumentStore, question: NodeId) -> bool {
    if doc.attribute(question, attr::TYPE) == Some(INFO_BOX_TYPE) {
        return true;
    }
    doc.children(question, tag::OPTION)
        .into_iter()
        .any(|option| !doc.children(option, tag::RESPONSE).is_empty())
}

pub fn question_set_answered(doc: &dyn DocumentStore, question_set: NodeId) -> bool {
    doc.children(question_set, tag::QUESTION)
        .into_iter()
        .all(|q| question_answered(doc, q))
}

/// True when some, but not all, answer-requiring questions of the set are answered.
pub fn question_set_partially_answered(doc: &dyn DocumentStore, question_set: NodeId) -> bool {
    let answered: Vec<bool> = doc
        .children(question_set, tag::QUESTION)
        .into_iter()
        .filter(|q| doc.attribute(*q, attr::TYPE) != Some(INFO_BOX_TYPE))
        .map(|q| question_answered(doc, q))
        .collect();
    answered.iter().any(|a| *a) && !answered.iter().all(|a| *a)
}

/// Outcome of [`CompletionTracker::update_completed_flags`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionStatus {
    pub all_requirements_met: bool,
    pub message: String,
    pub page_complete: bool,
}

/// Keeps the latest requirement lists per page element.
///
/// Keys are element handles rather than page indices, which shift whenever a
/// repeated page is inserted.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    requirements: HashMap<NodeId, PageRequirements>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-reads the requirement lists of `page`.
    pub fn update_completion_lists(&mut self, doc: &dyn DocumentStore, page: NodeId) -> &PageRequirements {
        let requirements = PageRequirements::collect(doc, page);
        debug!("Page {:?} requirements: {:?}", page, requirements);
        self.requirements.insert(page, requirements);
        &self.requirements[&page]
    }

    pub fn requirements(&self, page: NodeId) -> Option<&PageRequirements> {
        self.requirements.get(&page)
    }

    /// Applies the completion rules to the `PageComplete` flag of `page`.
    ///
    /// The flag is set only when all requirements are met and `action` is an
    /// advance from the page's last question set. When requirements are no
    /// longer met a previously complete page is reset, whatever the action.
    /// Does not save.
    pub fn update_completed_flags(
        &mut self,
        doc: &mut dyn DocumentStore,
        page: NodeId,
        action: PageAction,
        on_last_question_set: bool,
    ) -> Result<CompletionStatus, QuizError> {
        let requirements = match self.requirements.get(&page) {
            Some(r) => r.clone(),
            None => self.update_completion_lists(doc, page).clone(),
        };
        let all_met = requirements.all_met();
        let was_complete = is_yes(doc.attribute(page, attr::PAGE_COMPLETE));

        let page_complete = if all_met && action.is_advance() && on_last_question_set {
            if !was_complete {
                doc.update_attributes(page, &[(attr::PAGE_COMPLETE, YES)])?;
                info!("Page {} marked complete", page_label(doc, page));
            }
            true
        } else if !all_met && was_complete {
            doc.update_attributes(page, &[(attr::PAGE_COMPLETE, NO)])?;
            info!("Page {} no longer complete", page_label(doc, page));
            false
        } else {
            was_complete
        };

        Ok(CompletionStatus {
            all_requirements_met: all_met,
            message: requirements.unmet_messages().join("\n"),
            page_complete,
        })
    }
}

/// Sets `QuizComplete="Y"` on the session. Only an explicit Finish at the final
/// navigation index completes a quiz, and it is never unset.
///
/// Returns whether the flag is set after the call. Does not save.
pub fn mark_quiz_complete(
    doc: &mut dyn DocumentStore,
    action: PageAction,
    index: usize,
    last_index: usize,
) -> Result<bool, QuizError> {
    let root = doc.root();
    if is_yes(doc.attribute(root, attr::QUIZ_COMPLETE)) {
        return Ok(true);
    }
    if action != PageAction::Finish || index != last_index {
        return Ok(false);
    }
    doc.update_attributes(root, &[(attr::QUIZ_COMPLETE, YES)])?;
    info!("Quiz marked complete");
    Ok(true)
}

fn page_label(doc: &dyn DocumentStore, page: NodeId) -> String {
    doc.attribute(page, attr::ID).unwrap_or("?").to_string()
}
