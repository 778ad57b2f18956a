//! Newtype wrappers for identifiers stored in the quiz document
//!
//! These types keep page identifiers and cross-page reference ids from being
//! mixed up with arbitrary attribute strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Literal suffix appended to the id of a repeated page, followed by the rep number.
pub const REP_SUFFIX: &str = "-Rep";

/// The `ID` attribute of a `Page`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PageId(Arc<str>);

impl PageId {
    /// Creates a new PageId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this page ID
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id without a trailing `-Rep<n>` suffix.
    ///
    /// Only a suffix whose tail is entirely digits is stripped, so an authored id
    /// such as `Liver-Report` is left alone.
    pub fn base(&self) -> &str {
        match self.0.rfind(REP_SUFFIX) {
            Some(pos) => {
                let digits = &self.0[pos + REP_SUFFIX.len()..];
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    &self.0[..pos]
                } else {
                    &self.0
                }
            }
            None => &self.0,
        }
    }

    /// Builds the id for repetition `rep` of this page's logical base.
    pub fn with_rep(&self, rep: u32) -> PageId {
        PageId::new(format!("{}{}{}", self.base(), REP_SUFFIX, rep))
    }
}

impl From<String> for PageId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named cross-page reference (`BookmarkID`, `LabelMapID`).
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ReferenceId(Arc<str>);

impl ReferenceId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReferenceId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
