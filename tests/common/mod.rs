pub mod fixtures;

use quizflow::{
    Destination, DocumentStore, NodeId, QuizSession, ViewRestore, Viewport, ViewportSnapshot,
};
use std::collections::HashMap;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A viewer that remembers what was shown and what the engine asked of it.
#[derive(Debug, Default)]
pub struct RecordingViewport {
    pub views: HashMap<String, ViewportSnapshot>,
    pub calls: Vec<String>,
}

impl RecordingViewport {
    pub fn show(&mut self, destination: &str, window: f64, level: f64, slice_offset: f64) {
        self.views.insert(
            destination.to_string(),
            ViewportSnapshot {
                window,
                level,
                slice_offset,
                frame: None,
            },
        );
    }

    pub fn view(&self, destination: &str) -> Option<ViewportSnapshot> {
        self.views.get(destination).copied()
    }
}

impl Viewport for RecordingViewport {
    fn snapshot(&self, destination: &Destination) -> Option<ViewportSnapshot> {
        self.views.get(destination.as_str()).copied()
    }

    fn fit_to_background(&mut self, destination: &Destination) {
        self.calls.push(format!("fit {destination}"));
    }

    fn apply(&mut self, destination: &Destination, restore: &ViewRestore) {
        self.calls.push(format!("apply {destination}"));
        let view = self
            .views
            .entry(destination.to_string())
            .or_insert(ViewportSnapshot {
                window: 0.0,
                level: 0.0,
                slice_offset: 0.0,
                frame: None,
            });
        view.window = restore.window.unwrap_or(view.window);
        view.level = restore.level.unwrap_or(view.level);
        view.slice_offset = restore.slice_offset.unwrap_or(view.slice_offset);
    }
}

/// IDs of all pages in document order.
pub fn page_ids(doc: &dyn DocumentStore) -> Vec<String> {
    doc.children(doc.root(), "Page")
        .into_iter()
        .map(|p| doc.attribute(p, "ID").unwrap_or_default().to_string())
        .collect()
}

/// Answers every question of the question set under the cursor with its first option.
pub fn answer_current(session: &mut QuizSession) -> TestResult {
    let qs = session
        .current_question_set()?
        .ok_or("no question set at the cursor")?;
    let options: Vec<NodeId> = {
        let doc = session.document();
        doc.children(qs, "Question")
            .into_iter()
            .filter(|q| doc.attribute(*q, "Type") != Some("InfoBox"))
            .filter_map(|q| doc.children(q, "Option").first().copied())
            .collect()
    };
    for option in options {
        session.record_response(option, "Yes")?;
    }
    Ok(())
}

/// ID of the page shown at navigation `index`.
pub fn page_id_at(session: &QuizSession, index: usize) -> String {
    let doc = session.document();
    let entry = session.navigation().get(index).copied();
    entry
        .and_then(|e| doc.children(doc.root(), "Page").get(e.page_index).copied())
        .and_then(|p| doc.attribute(p, "ID"))
        .unwrap_or_default()
        .to_string()
}
