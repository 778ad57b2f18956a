//! XML persistence for the quiz results document.
//!
//! - [`XmlDocument`]: a [`DocumentStore`](quizflow_traits::DocumentStore) parsed from
//!   XML text or a file, written back on `save`.
//! - [`backup`]: timestamped copies taken when a results file is opened.
//!
//! For convenience the in-memory [`ElementTree`] is re-exported from quizflow-traits.

pub mod backup;
mod xml;

pub use backup::backup_file;
pub use xml::XmlDocument;

pub use quizflow_traits::ElementTree;
