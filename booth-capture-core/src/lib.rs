//! # booth-capture-core
//!
//! Platform-agnostic live camera capture core for a photo booth.
//!
//! Drives a multi-pose layout: a live filtered preview, a countdown per
//! slot, a still capture when it expires, and automatic advance to the next
//! empty slot. Camera hardware plugs in through the `CameraBackend` trait;
//! `SyntheticCamera` stands in where no camera exists.
//!
//! ## Architecture
//!
//! ```text
//! booth-capture-core (this crate)
//! ├── traits/       ← CameraBackend, RenderSurface, BoothDelegate
//! ├── models/       ← CaptureError, SlotState, BoothConfiguration, CapturedPhoto, etc.
//! ├── processing/   ← filter catalog, aspect-fill render, frame mailbox, placeholders
//! ├── session/      ← CaptureSessionManager, PhotoCaptureDelegatePool
//! ├── pipeline/     ← LiveFramePipeline, SoftwareSurface
//! ├── booth/        ← SlotMachine, Countdown, BoothController
//! └── simulator/    ← SyntheticCamera
//! ```

pub mod booth;
pub mod models;
pub mod pipeline;
pub mod processing;
pub mod session;
pub mod simulator;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use booth::controller::BoothController;
pub use booth::slot_machine::SlotMachine;
pub use models::camera_models::{
    AuthorizationStatus, CameraDevice, CameraPosition, DeviceOrientation, FlashMode, SessionDiagnostics,
    SessionSnapshot,
};
pub use models::config::BoothConfiguration;
pub use models::error::CaptureError;
pub use models::frame::VideoFrame;
pub use models::photo::{CapturedPhoto, PhotoMetadata, PhotoSource};
pub use models::slot::{CaptureSlot, Layout};
pub use models::state::SlotState;
pub use pipeline::live_preview::LiveFramePipeline;
pub use pipeline::software_surface::{PreviewHandle, SoftwareSurface};
pub use processing::filters::{apply_filter, FilterKind};
pub use session::manager::CaptureSessionManager;
pub use simulator::synthetic_camera::{SyntheticCamera, SyntheticCameraOptions};
pub use traits::booth_delegate::BoothDelegate;
pub use traits::camera_backend::{CameraBackend, FrameSink, StillCallback};
pub use traits::render_surface::RenderSurface;
