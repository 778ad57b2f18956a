//! Session configuration.

use quizflow_traits::DocumentStore;
use quizflow_types::{Destination, Orientation, attr, is_yes};

/// Viewer assignment for N-Planes mode: one destination per orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NPlanesLayout {
    pairs: Vec<(Orientation, Destination)>,
}

impl Default for NPlanesLayout {
    fn default() -> Self {
        Self {
            pairs: vec![
                (Orientation::Axial, Destination::new("Red")),
                (Orientation::Sagittal, Destination::new("Yellow")),
                (Orientation::Coronal, Destination::new("Green")),
            ],
        }
    }
}

impl NPlanesLayout {
    pub fn new(pairs: Vec<(Orientation, Destination)>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(Orientation, Destination)] {
        &self.pairs
    }
}

/// Options for a [`QuizSession`](crate::session::QuizSession).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub randomize_page_groups: bool,
    pub seed: Option<u64>,
    /// Block advancing past unanswered question sets and leaving half-answered ones.
    pub require_all_answers: bool,
    /// Only meaningful for file-backed documents; read by whoever opens the file.
    pub backup_on_load: bool,
    pub n_planes: NPlanesLayout,
    pub validate_on_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            randomize_page_groups: false,
            seed: None,
            require_all_answers: true,
            backup_on_load: true,
            n_planes: NPlanesLayout::default(),
            validate_on_start: true,
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// A builder pre-filled from the `Session` element; later builder calls win.
    pub fn from_document(doc: &dyn DocumentStore) -> SessionConfigBuilder {
        let randomize = is_yes(doc.attribute(doc.root(), attr::RANDOMIZE_PAGE_GROUPS));
        SessionConfigBuilder::default().randomize_page_groups(randomize)
    }
}

/// A builder for creating a [`SessionConfig`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn randomize_page_groups(mut self, enabled: bool) -> Self {
        self.config.randomize_page_groups = enabled;
        self
    }

    /// Fixes the shuffle seed so the group order is reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn require_all_answers(mut self, required: bool) -> Self {
        self.config.require_all_answers = required;
        self
    }

    pub fn backup_on_load(mut self, enabled: bool) -> Self {
        self.config.backup_on_load = enabled;
        self
    }

    pub fn n_planes(mut self, layout: NPlanesLayout) -> Self {
        self.config.n_planes = layout;
        self
    }

    pub fn validate_on_start(mut self, enabled: bool) -> Self {
        self.config.validate_on_start = enabled;
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}
