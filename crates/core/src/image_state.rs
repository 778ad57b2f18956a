//! Viewer state per image: captured on every page turn, restored on arrival.
//!
//! Each capture appends a `State` child to the `Image` element. Restoring
//! walks the pages already visited, newest first, and matches images by their
//! `Path`, so a volume shown on several pages keeps its window/level and slice
//! position across them.

use crate::config::NPlanesLayout;
use crate::error::QuizError;
use crate::model::{PageRecord, page_node};
use crate::navigation::NavigationList;
use log::debug;
use quizflow_traits::{DocumentStore, NodeId};
use quizflow_types::{
    Destination, ImageStateRecord, Layer, Orientation, ViewingMode, ViewportSnapshot, tag,
    timestamp_now,
};

/// The viewer collaborator the engine reads from and restores into.
pub trait Viewport {
    /// Current view of a destination, or `None` when nothing is displayed there.
    fn snapshot(&self, destination: &Destination) -> Option<ViewportSnapshot>;

    /// Resets the destination's field of view to its background volume.
    fn fit_to_background(&mut self, destination: &Destination);

    fn apply(&mut self, destination: &Destination, restore: &ViewRestore);
}

/// How images are laid out across viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Each image is shown in its own destination and orientation.
    #[default]
    Default,
    /// One image is shown in every orientation of the N-Planes layout.
    NPlanes { image: NodeId },
}

impl ViewMode {
    pub fn viewing_mode(&self) -> ViewingMode {
        match self {
            ViewMode::Default => ViewingMode::Default,
            ViewMode::NPlanes { .. } => ViewingMode::NPlanes,
        }
    }
}

/// The parts of an `Image` element that drive state capture.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub node: NodeId,
    pub path: String,
    pub layer: Layer,
    pub destination: Option<Destination>,
    pub orientation: Option<Orientation>,
    pub default_slice_offset: Option<f64>,
}

impl ImageRecord {
    /// Reads an image. A missing `Layer` means `Background`.
    pub fn read(doc: &dyn DocumentStore, node: NodeId) -> Self {
        let child = |name: &str| doc.last_child(node, name).and_then(|c| doc.text(c));
        Self {
            node,
            path: child(tag::PATH).unwrap_or_default().to_string(),
            layer: child(tag::LAYER)
                .and_then(Layer::parse)
                .unwrap_or(Layer::Background),
            destination: child(tag::DESTINATION).map(Destination::from),
            orientation: child(tag::ORIENTATION).and_then(Orientation::parse),
            default_slice_offset: child(tag::DEFAULT_SLICE_OFFSET)
                .and_then(|v| v.trim().parse().ok()),
        }
    }

    pub fn on_page(doc: &dyn DocumentStore, page: NodeId) -> Vec<Self> {
        doc.children(page, tag::IMAGE)
            .into_iter()
            .map(|node| Self::read(doc, node))
            .collect()
    }
}

/// One image shown in one orientation in one destination.
#[derive(Debug, Clone)]
struct Target {
    image: ImageRecord,
    orientation: Orientation,
    destination: Destination,
}

fn targets(
    doc: &dyn DocumentStore,
    page: NodeId,
    mode: ViewMode,
    layout: &NPlanesLayout,
) -> Vec<Target> {
    match mode {
        ViewMode::Default => ImageRecord::on_page(doc, page)
            .into_iter()
            .filter(|image| image.layer.carries_view_state())
            .filter_map(|image| {
                let (Some(orientation), Some(destination)) =
                    (image.orientation, image.destination.clone())
                else {
                    debug!("Image '{}' has no orientation or destination", image.path);
                    return None;
                };
                Some(Target {
                    image,
                    orientation,
                    destination,
                })
            })
            .collect(),
        ViewMode::NPlanes { image } => {
            let image = ImageRecord::read(doc, image);
            if !image.layer.carries_view_state() {
                return Vec::new();
            }
            layout
                .pairs()
                .iter()
                .map(|(orientation, destination)| Target {
                    image: image.clone(),
                    orientation: *orientation,
                    destination: destination.clone(),
                })
                .collect()
        }
    }
}

/// Writes a `State` for every displayed image of `page`. Label and
/// segmentation layers are skipped. Returns the number of states written.
/// Does not save.
pub fn capture_image_state(
    doc: &mut dyn DocumentStore,
    page: NodeId,
    mode: ViewMode,
    layout: &NPlanesLayout,
    viewport: &dyn Viewport,
    login_time: &str,
) -> Result<usize, QuizError> {
    let page_id = PageRecord::read(doc, page)?.id;
    let mut written = 0;
    for target in targets(doc, page, mode, layout) {
        let Some(snapshot) = viewport.snapshot(&target.destination) else {
            debug!("Nothing displayed in {}, skipping capture", target.destination);
            continue;
        };
        let record = ImageStateRecord {
            orientation: target.orientation,
            destination: target.destination,
            viewing_mode: mode.viewing_mode(),
            window: snapshot.window,
            level: snapshot.level,
            slice_offset: snapshot.slice_offset,
            frame: snapshot.frame,
            page: page_id.to_string(),
            login_time: login_time.to_string(),
            response_time: timestamp_now(),
        };
        let attrs = record.to_attributes();
        let attrs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let state = doc.create_element(tag::STATE, &attrs);
        doc.append_element(target.image.node, state)?;
        written += 1;
    }
    debug!("Captured {written} image states on page {page_id}");
    Ok(written)
}

/// Values to push into one destination. `None` leaves the viewer's own value.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRestore {
    pub destination: Destination,
    pub orientation: Orientation,
    pub layer: Layer,
    pub window: Option<f64>,
    pub level: Option<f64>,
    pub slice_offset: Option<f64>,
    pub frame: Option<u32>,
    /// Page the slice position was captured on; `None` for a first visit.
    pub source_page: Option<String>,
}

/// Restores split by timing.
///
/// Background restores whose state comes from another page are deferred: the
/// viewer must first fit the new volume, or the restored slice offset would be
/// overwritten by the load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestorePlan {
    pub immediate: Vec<ViewRestore>,
    pub deferred: Vec<ViewRestore>,
}

impl RestorePlan {
    pub fn is_empty(&self) -> bool {
        self.immediate.is_empty() && self.deferred.is_empty()
    }

    pub fn execute(&self, viewport: &mut dyn Viewport) {
        for restore in &self.immediate {
            viewport.apply(&restore.destination, restore);
        }
        for restore in &self.deferred {
            viewport.fit_to_background(&restore.destination);
            viewport.apply(&restore.destination, restore);
        }
    }
}

/// Plans the view restore for navigation entry `index`.
///
/// For each displayed image and orientation, window/level come from the most
/// recent state of that image in any orientation and the slice offset from the
/// most recent state in the same orientation. Without history the image's
/// `DefaultSliceOffset` is used, if any.
pub fn plan_restore(
    doc: &dyn DocumentStore,
    list: &NavigationList,
    index: usize,
    mode: ViewMode,
    layout: &NPlanesLayout,
) -> Result<RestorePlan, QuizError> {
    let page = page_node(doc, list.entry(index)?.page_index)?;
    let page_id = PageRecord::read(doc, page)?.id;
    let history = visited_pages(doc, list, index)?;

    let mut plan = RestorePlan::default();
    for target in targets(doc, page, mode, layout) {
        let (latest, same_orientation) =
            latest_states(doc, &history, &target.image.path, target.orientation);
        if same_orientation.is_none() {
            debug!(
                "No stored {} state for '{}', using defaults",
                target.orientation, target.image.path
            );
        }
        let restore = ViewRestore {
            destination: target.destination,
            orientation: target.orientation,
            layer: target.image.layer,
            window: latest.as_ref().map(|r| r.window),
            level: latest.as_ref().map(|r| r.level),
            slice_offset: same_orientation
                .as_ref()
                .map(|r| r.slice_offset)
                .or(target.image.default_slice_offset),
            frame: same_orientation.as_ref().and_then(|r| r.frame),
            source_page: same_orientation.map(|r| r.page),
        };
        let from_elsewhere = restore
            .source_page
            .as_deref()
            .is_some_and(|p| p != page_id.as_str());
        if restore.layer == Layer::Background && from_elsewhere {
            plan.deferred.push(restore);
        } else {
            plan.immediate.push(restore);
        }
    }
    Ok(plan)
}

/// Pages shown up to and including `index`, newest first.
fn visited_pages(
    doc: &dyn DocumentStore,
    list: &NavigationList,
    index: usize,
) -> Result<Vec<NodeId>, QuizError> {
    let mut pages: Vec<NodeId> = Vec::new();
    let mut last = None;
    for i in (0..=index).rev() {
        let page_index = list.entry(i)?.page_index;
        if last != Some(page_index) {
            pages.push(page_node(doc, page_index)?);
            last = Some(page_index);
        }
    }
    Ok(pages)
}

/// Newest state of any orientation and newest state of `orientation`.
fn latest_states(
    doc: &dyn DocumentStore,
    history: &[NodeId],
    path: &str,
    orientation: Orientation,
) -> (Option<ImageStateRecord>, Option<ImageStateRecord>) {
    let mut latest = None;
    let mut same_orientation = None;
    for page in history {
        for image in doc.children(*page, tag::IMAGE).into_iter().rev() {
            if ImageRecord::read(doc, image).path != path {
                continue;
            }
            for state in doc.children(image, tag::STATE).into_iter().rev() {
                let Some(record) = ImageStateRecord::from_attributes(|k| doc.attribute(state, k))
                else {
                    continue;
                };
                if same_orientation.is_none() && record.orientation == orientation {
                    same_orientation = Some(record.clone());
                }
                if latest.is_none() {
                    latest = Some(record);
                }
                if same_orientation.is_some() {
                    return (latest, same_orientation);
                }
            }
        }
    }
    (latest, same_orientation)
}
