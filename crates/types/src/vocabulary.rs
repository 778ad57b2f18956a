//! Element and attribute names of the quiz results document, plus the typed
//! values that are stored in it as strings.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod tag {
    pub const SESSION: &str = "Session";
    pub const LOGIN: &str = "Login";
    pub const PAGE: &str = "Page";
    pub const QUESTION_SET: &str = "QuestionSet";
    pub const QUESTION: &str = "Question";
    pub const OPTION: &str = "Option";
    pub const RESPONSE: &str = "Response";
    pub const IMAGE: &str = "Image";
    pub const PATH: &str = "Path";
    pub const LAYER: &str = "Layer";
    pub const DESTINATION: &str = "Destination";
    pub const ORIENTATION: &str = "Orientation";
    pub const DEFAULT_SLICE_OFFSET: &str = "DefaultSliceOffset";
    pub const STATE: &str = "State";
    pub const LABEL_MAP_PATH: &str = "LabelMapPath";
    pub const MARKUP_LINE_PATH: &str = "MarkupLinePath";
    pub const RANDOMIZED_PAGE_GROUP_INDICES: &str = "RandomizedPageGroupIndices";
}

pub mod attr {
    pub const ID: &str = "ID";
    pub const PAGE_GROUP: &str = "PageGroup";
    pub const REP: &str = "Rep";
    pub const PAGE_COMPLETE: &str = "PageComplete";
    pub const QUIZ_COMPLETE: &str = "QuizComplete";
    pub const BOOKMARK_ID: &str = "BookmarkID";
    pub const GO_TO_BOOKMARK: &str = "GoToBookmark";
    pub const LOOP: &str = "Loop";
    pub const SEGMENT_REQUIRED: &str = "SegmentRequired";
    pub const RANDOMIZE_PAGE_GROUPS: &str = "RandomizePageGroups";
    pub const TYPE: &str = "Type";
    pub const MIN_MARKUP_LINES: &str = "MinMarkupLines";
    pub const LABEL_MAP_ID: &str = "LabelMapID";
    pub const DISPLAY_LABEL_MAP_ID: &str = "DisplayLabelMapID";
    pub const LOGIN_TIME: &str = "LoginTime";
    pub const LOGOUT_TIME: &str = "LogoutTime";
    pub const RESPONSE_TIME: &str = "ResponseTime";
    pub const ORIENTATION: &str = "Orientation";
    pub const DESTINATION: &str = "Destination";
    pub const VIEWING_MODE: &str = "ViewingMode";
    pub const WINDOW: &str = "Window";
    pub const LEVEL: &str = "Level";
    pub const SLICE_OFFSET: &str = "SliceOffset";
    pub const FRAME: &str = "Frame";
    pub const PAGE: &str = "Page";
}

/// Question type that never needs an answer.
pub const INFO_BOX_TYPE: &str = "InfoBox";

/// `"Y"`/absent flag encoding used by `PageComplete`, `QuizComplete`, `Loop`, ...
pub const YES: &str = "Y";
pub const NO: &str = "N";

/// Decodes a `"Y"` flag. Anything else, including a missing attribute, is false.
pub fn is_yes(value: Option<&str>) -> bool {
    value == Some(YES)
}

/// Slice orientation of a 2D viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Axial,
    Sagittal,
    Coronal,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [Orientation::Axial, Orientation::Sagittal, Orientation::Coronal];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Axial" => Some(Orientation::Axial),
            "Sagittal" => Some(Orientation::Sagittal),
            "Coronal" => Some(Orientation::Coronal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Axial => "Axial",
            Orientation::Sagittal => "Sagittal",
            Orientation::Coronal => "Coronal",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which layer of a viewer an image is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Background,
    Foreground,
    Label,
    Segmentation,
}

impl Layer {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Background" => Some(Layer::Background),
            "Foreground" => Some(Layer::Foreground),
            "Label" => Some(Layer::Label),
            "Segmentation" => Some(Layer::Segmentation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Background => "Background",
            Layer::Foreground => "Foreground",
            Layer::Label => "Label",
            Layer::Segmentation => "Segmentation",
        }
    }

    /// Label and segmentation layers follow the background's view.
    pub fn carries_view_state(&self) -> bool {
        matches!(self, Layer::Background | Layer::Foreground)
    }
}

/// Viewer layout the state was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewingMode {
    #[default]
    Default,
    NPlanes,
}

impl ViewingMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Default" => Some(ViewingMode::Default),
            "NPlanes" => Some(ViewingMode::NPlanes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewingMode::Default => "Default",
            ViewingMode::NPlanes => "NPlanes",
        }
    }
}

impl fmt::Display for ViewingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the viewer an image is displayed in (`Red`, `Yellow`, `Green`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination(String);

impl Destination {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Destination {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
