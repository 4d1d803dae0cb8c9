use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Which way the active camera faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    #[default]
    Front,
    Back,
}

impl CameraPosition {
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    /// Front-facing previews are shown mirrored.
    pub fn is_mirrored(self) -> bool {
        matches!(self, Self::Front)
    }
}

/// Camera permission as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Denied,
    Restricted,
    Authorized,
}

impl AuthorizationStatus {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
}

/// Physical orientation of the device when a still is requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Hardware outputs a session can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureOutput {
    Photo,
    VideoFrames,
}

/// A camera device attached (or attachable) as session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub name: String,
    pub position: CameraPosition,
}

/// Parameters for one still-capture call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StillRequest {
    pub request_id: u64,
    pub flash: FlashMode,
    pub orientation: DeviceOrientation,
}

/// Consistent view of the session, published only between configuration
/// transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub running: bool,
    pub position: CameraPosition,
    pub authorization: AuthorizationStatus,
    pub input: Option<CameraDevice>,
    pub outputs: Vec<CaptureOutput>,
    pub last_error: Option<CaptureError>,
}

impl SessionSnapshot {
    pub fn new(position: CameraPosition) -> Self {
        Self {
            running: false,
            position,
            authorization: AuthorizationStatus::NotDetermined,
            input: None,
            outputs: Vec::new(),
            last_error: None,
        }
    }
}

/// Counters for debugging the preview and capture paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionDiagnostics {
    pub frames_received: u64,
    pub frames_rendered: u64,
    pub frames_dropped: u64,
    pub render_fallbacks: u64,
    pub captures_requested: u64,
    pub captures_completed: u64,
    pub captures_empty: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_position() {
        assert_eq!(CameraPosition::Front.opposite(), CameraPosition::Back);
        assert_eq!(CameraPosition::Back.opposite(), CameraPosition::Front);
        assert!(CameraPosition::Front.is_mirrored());
        assert!(!CameraPosition::Back.is_mirrored());
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&AuthorizationStatus::NotDetermined).unwrap();
        assert_eq!(json, "\"not_determined\"");
        let pos: CameraPosition = serde_json::from_str("\"back\"").unwrap();
        assert_eq!(pos, CameraPosition::Back);
    }
}
