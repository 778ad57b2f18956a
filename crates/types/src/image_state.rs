use crate::vocabulary::{Destination, Orientation, ViewingMode, attr};
use serde::{Deserialize, Serialize};

/// Window/level and slice position read from one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    pub window: f64,
    pub level: f64,
    pub slice_offset: f64,
    pub frame: Option<u32>,
}

/// A persisted `State` child of an `Image` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStateRecord {
    pub orientation: Orientation,
    pub destination: Destination,
    pub viewing_mode: ViewingMode,
    pub window: f64,
    pub level: f64,
    pub slice_offset: f64,
    pub frame: Option<u32>,
    /// `ID` of the page the state was captured on.
    pub page: String,
    pub login_time: String,
    pub response_time: String,
}

impl ImageStateRecord {
    /// Attribute list in on-disk order.
    pub fn to_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            (attr::ORIENTATION, self.orientation.as_str().to_string()),
            (attr::DESTINATION, self.destination.as_str().to_string()),
            (attr::VIEWING_MODE, self.viewing_mode.as_str().to_string()),
            (attr::WINDOW, self.window.to_string()),
            (attr::LEVEL, self.level.to_string()),
            (attr::SLICE_OFFSET, self.slice_offset.to_string()),
        ];
        if let Some(frame) = self.frame {
            attrs.push((attr::FRAME, frame.to_string()));
        }
        attrs.push((attr::PAGE, self.page.clone()));
        attrs.push((attr::LOGIN_TIME, self.login_time.clone()));
        attrs.push((attr::RESPONSE_TIME, self.response_time.clone()));
        attrs
    }

    /// Decodes a record from an attribute lookup.
    ///
    /// Returns `None` when orientation or the numeric window/level/offset values are
    /// missing or unparsable; such records are skipped during lookup.
    pub fn from_attributes<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Option<Self> {
        let number = |name: &str| get(name).and_then(|v| v.trim().parse::<f64>().ok());
        Some(Self {
            orientation: Orientation::parse(get(attr::ORIENTATION)?)?,
            destination: Destination::from(get(attr::DESTINATION).unwrap_or_default()),
            viewing_mode: get(attr::VIEWING_MODE)
                .and_then(ViewingMode::parse)
                .unwrap_or_default(),
            window: number(attr::WINDOW)?,
            level: number(attr::LEVEL)?,
            slice_offset: number(attr::SLICE_OFFSET)?,
            frame: get(attr::FRAME).and_then(|v| v.trim().parse().ok()),
            page: get(attr::PAGE).unwrap_or_default().to_string(),
            login_time: get(attr::LOGIN_TIME).unwrap_or_default().to_string(),
            response_time: get(attr::RESPONSE_TIME).unwrap_or_default().to_string(),
        })
    }
}
