//! Value types shared by every quizflow crate: navigation entries, the
//! document's element/attribute vocabulary, persisted image state and ids.

pub mod ids;
pub mod image_state;
pub mod navigation;
pub mod time;
pub mod vocabulary;

pub use ids::{PageId, REP_SUFFIX, ReferenceId};
pub use image_state::{ImageStateRecord, ViewportSnapshot};
pub use navigation::{FIXED_PAGE_GROUP, NavigationEntry, Progress};
pub use time::{TIMESTAMP_FORMAT, timestamp_now};
pub use vocabulary::{
    Destination, INFO_BOX_TYPE, Layer, NO, Orientation, ViewingMode, YES, attr, is_yes, tag,
};
