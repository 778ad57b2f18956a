//! # quizflow
//!
//! Runs image-based quiz sessions against an XML results document.
//!
//! The engine lives in `quizflow-core`; this crate wires it to the file-backed
//! [`XmlDocument`] store and hosts the command-line tool.

pub mod error;

pub use error::QuizflowError;
pub use quizflow_core::{
    CompletionTracker, NPlanesLayout, NavigationList, PageAction, PageRequirements, PageTurn,
    QuizError, QuizSession, RestorePlan, ResumePoint, SessionConfig, SessionConfigBuilder,
    ViewMode, ViewRestore, Viewport,
};
pub use quizflow_document::{XmlDocument, backup_file};
pub use quizflow_traits::{DocumentError, DocumentStore, ElementTree, NodeId};
pub use quizflow_types::{
    Destination, ImageStateRecord, Layer, NavigationEntry, Orientation, PageId, Progress,
    ViewingMode, ViewportSnapshot,
};

// Re-export crates for advanced use
pub use quizflow_core as core;
pub use quizflow_document as document;
pub use quizflow_traits as traits;
pub use quizflow_types as types;

use std::path::Path;

/// Opens a results file and starts a session on it.
///
/// The configuration starts from the document's own defaults and is then
/// adjusted by `configure`. A backup is taken before the session touches the
/// file unless the configuration turns it off.
pub fn open_session<P, F>(path: P, configure: F) -> Result<QuizSession, QuizflowError>
where
    P: AsRef<Path>,
    F: FnOnce(SessionConfigBuilder) -> SessionConfigBuilder,
{
    let mut doc = XmlDocument::open(path, false)?;
    let config = configure(SessionConfig::from_document(&doc)).build();
    if config.backup_on_load {
        doc.take_backup()?;
    }
    Ok(QuizSession::start(Box::new(doc), config)?)
}
