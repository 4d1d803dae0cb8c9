use thiserror::Error;

/// Errors that can occur while driving a capture session.
///
/// Hardware failures are normally absorbed at the component boundary and
/// turned into empty results; these values surface through `Result`s on
/// user intents and through `BoothDelegate::on_error`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("decode failed: {0}")]
    DecodeFailed(String),

    #[error("render failed: {0}")]
    RenderFailed(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("slot {index} out of range (layout has {count} slots)")]
    SlotOutOfRange { index: usize, count: usize },

    #[error("session closed")]
    SessionClosed,

    #[error("unknown error: {0}")]
    Unknown(String),
}
