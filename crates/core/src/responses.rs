//! Recording what the user produced: answers, markup lines and segmentations.

use crate::error::QuizError;
use log::debug;
use quizflow_traits::{DocumentStore, NodeId};
use quizflow_types::{attr, tag, timestamp_now};

fn append_timestamped(
    doc: &mut dyn DocumentStore,
    parent: NodeId,
    element: &str,
    text: &str,
    login_time: &str,
) -> Result<NodeId, QuizError> {
    let now = timestamp_now();
    let node = doc.create_element(
        element,
        &[(attr::LOGIN_TIME, login_time), (attr::RESPONSE_TIME, now.as_str())],
    );
    doc.set_text(node, text)?;
    doc.append_element(parent, node)?;
    debug!("Recorded <{element}> under {parent:?}");
    Ok(node)
}

/// Appends a `Response` to an `Option`. Does not save.
pub fn record_response(
    doc: &mut dyn DocumentStore,
    option: NodeId,
    value: &str,
    login_time: &str,
) -> Result<NodeId, QuizError> {
    if doc.tag(option) != Some(tag::OPTION) {
        return Err(QuizError::structure(format!(
            "responses belong on <{}> elements",
            tag::OPTION
        )));
    }
    append_timestamped(doc, option, tag::RESPONSE, value, login_time)
}

/// Appends a `MarkupLinePath` to an `Image`. Does not save.
pub fn record_markup_line(
    doc: &mut dyn DocumentStore,
    image: NodeId,
    path: &str,
    login_time: &str,
) -> Result<NodeId, QuizError> {
    append_timestamped(doc, image, tag::MARKUP_LINE_PATH, path, login_time)
}

/// Appends a `LabelMapPath` to an `Image`. Does not save.
pub fn record_label_map(
    doc: &mut dyn DocumentStore,
    image: NodeId,
    path: &str,
    login_time: &str,
) -> Result<NodeId, QuizError> {
    append_timestamped(doc, image, tag::LABEL_MAP_PATH, path, login_time)
}
