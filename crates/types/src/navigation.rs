use serde::{Deserialize, Serialize};

/// Page group reserved for pages that are never randomized and always come first.
pub const FIXED_PAGE_GROUP: u32 = 0;

/// One stop in the flattened navigation sequence.
///
/// `page_index` is the position of the `Page` element in the document at the
/// time the list was built. It shifts whenever a page is inserted, so it must
/// never be stored across a structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    pub page_index: usize,
    pub question_set_index: usize,
    pub page_group: u32,
    pub rep: u32,
}

impl NavigationEntry {
    pub fn new(page_index: usize, question_set_index: usize, page_group: u32, rep: u32) -> Self {
        Self {
            page_index,
            question_set_index,
            page_group,
            rep,
        }
    }
}

impl From<[usize; 4]> for NavigationEntry {
    fn from(v: [usize; 4]) -> Self {
        Self::new(v[0], v[1], v[2] as u32, v[3] as u32)
    }
}

/// Aggregated view of where the user is, for progress display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub index: usize,
    pub total: usize,
    pub page_id: String,
    pub question_set: usize,
}
