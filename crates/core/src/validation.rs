//! Structural checks run before a session starts.

use crate::error::QuizError;
use crate::model::{integer_attribute, pages};
use log::warn;
use quizflow_traits::DocumentStore;
use quizflow_types::{FIXED_PAGE_GROUP, attr, tag};
use std::collections::HashSet;

/// Checks the quiz document, collecting every problem before failing.
///
/// With `randomize` set, each page must carry an integer `PageGroup` and at
/// least two distinct non-zero groups must exist; the latter is reported as
/// [`QuizError::InsufficientGroups`] once everything else is valid.
pub fn validate(doc: &dyn DocumentStore, randomize: bool) -> Result<(), QuizError> {
    let mut problems = Vec::new();
    let root = doc.root();
    if doc.tag(root) != Some(tag::SESSION) {
        problems.push(format!(
            "Root element must be <{}>, found <{}>",
            tag::SESSION,
            doc.tag(root).unwrap_or_default()
        ));
    }

    let all_pages = pages(doc);
    if all_pages.is_empty() {
        problems.push("The quiz has no pages".to_string());
    }

    let mut ids = HashSet::new();
    let mut bookmarks: HashSet<&str> = HashSet::new();
    let mut label_maps: HashSet<&str> = HashSet::new();
    let mut groups = HashSet::new();

    for (i, page) in all_pages.iter().enumerate() {
        let number = i + 1;
        match doc.attribute(*page, attr::ID).map(str::trim) {
            None | Some("") => problems.push(format!("Page {number} has no ID")),
            Some(id) => {
                if !ids.insert(id) {
                    problems.push(format!("Page {number}: duplicate ID '{id}'"));
                }
            }
        }

        if let Err(err) = integer_attribute(doc, *page, attr::REP) {
            problems.push(format!("Page {number}: {err}"));
        }

        if randomize {
            match integer_attribute(doc, *page, attr::PAGE_GROUP) {
                Ok(Some(group)) => {
                    groups.insert(group);
                }
                Ok(None) => problems.push(format!(
                    "Page {number}: {} is required when randomizing",
                    attr::PAGE_GROUP
                )),
                Err(err) => problems.push(format!("Page {number}: {err}")),
            }
        }

        // References must point backwards, so check before recording this page's targets.
        if let Some(target) = doc.attribute(*page, attr::GO_TO_BOOKMARK) {
            if !bookmarks.contains(target) {
                problems.push(format!(
                    "Page {number}: {}='{target}' has no matching {} on an earlier page",
                    attr::GO_TO_BOOKMARK,
                    attr::BOOKMARK_ID
                ));
            }
        }
        let images = doc.children(*page, tag::IMAGE);
        for image in &images {
            if let Some(target) = doc.attribute(*image, attr::DISPLAY_LABEL_MAP_ID) {
                if !label_maps.contains(target) {
                    problems.push(format!(
                        "Page {number}: {}='{target}' has no matching {} on an earlier page",
                        attr::DISPLAY_LABEL_MAP_ID,
                        attr::LABEL_MAP_ID
                    ));
                }
            }
        }

        if let Some(id) = doc.attribute(*page, attr::BOOKMARK_ID) {
            bookmarks.insert(id);
        }
        label_maps.extend(
            images
                .iter()
                .filter_map(|image| doc.attribute(*image, attr::LABEL_MAP_ID)),
        );
    }

    if !problems.is_empty() {
        for problem in &problems {
            warn!("{problem}");
        }
        return Err(QuizError::Validation(problems));
    }

    if randomize {
        let found = groups.iter().filter(|g| **g != FIXED_PAGE_GROUP).count();
        if found < 2 {
            warn!("Randomization requested with {found} non-zero page groups");
            return Err(QuizError::InsufficientGroups { found });
        }
    }
    Ok(())
}
