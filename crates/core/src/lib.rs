//! # quizflow-core
//!
//! Navigation and state engine for image-based quizzes.
//!
//! This crate turns a quiz results document into a navigable session:
//! - **navigation**: the flat list of question sets the user steps through
//! - **randomizer**: seeded page-group shuffles, persisted in the document
//! - **repeat**: contiguous repetitions of looped pages
//! - **resume**: where a returning user lands
//! - **completion**: page and quiz completion rules
//! - **image_state**: viewer state capture and restore
//! - **history**: backward search through visited pages
//! - **session**: the controller that runs page turns in order
//!
//! The engine only talks to the document through
//! [`DocumentStore`](quizflow_traits::DocumentStore), and to the viewers through
//! [`Viewport`](image_state::Viewport).

pub mod completion;
pub mod config;
pub mod error;
pub mod history;
pub mod image_state;
pub mod model;
pub mod navigation;
pub mod randomizer;
pub mod repeat;
pub mod responses;
pub mod resume;
pub mod session;
pub mod validation;

pub use completion::{CompletionStatus, CompletionTracker, PageAction, PageRequirements};
pub use config::{NPlanesLayout, SessionConfig, SessionConfigBuilder};
pub use error::QuizError;
pub use history::{AttributeQuery, HistoryMatch, find_most_recent_match, find_most_recent_match_in_group};
pub use image_state::{RestorePlan, ViewMode, ViewRestore, Viewport};
pub use navigation::{NavigationList, normalize_pages};
pub use randomizer::{randomize_navigation, randomize_page_groups, shuffle_navigation_list};
pub use repeat::{RepeatOutcome, create_repeated_page};
pub use resume::{ResumePoint, resolve_resume_index};
pub use session::{PageTurn, QuizSession};
pub use validation::validate;
