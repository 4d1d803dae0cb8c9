use std::sync::Arc;

use crate::models::camera_models::{
    AuthorizationStatus, CameraDevice, CameraPosition, CaptureOutput, StillRequest,
};
use crate::models::error::CaptureError;
use crate::models::frame::VideoFrame;

/// Callback invoked for every live video frame.
///
/// Fires on the backend's own capture thread; keep the work minimal and hand
/// the frame off.
pub type FrameSink = Arc<dyn Fn(VideoFrame) + Send + Sync + 'static>;

/// One-shot completion for a still capture, carrying encoded image bytes.
///
/// May fire on any thread. Backends must call it exactly once per
/// `capture_still`.
pub type StillCallback = Box<dyn FnOnce(Result<Vec<u8>, CaptureError>) + Send + 'static>;

/// Camera hardware capability.
///
/// Implemented by:
/// - `SyntheticCamera` (simulators, tests, machines without a camera)
/// - `NativeCamera` in `booth-capture-native`
///
/// A backend is owned by exactly one session thread, so methods take
/// `&mut self` and are never called concurrently.
pub trait CameraBackend: Send + 'static {
    /// Current permission state, without prompting.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompt for permission; blocks until the platform decides.
    fn request_authorization(&mut self) -> AuthorizationStatus;

    /// Whether a camera exists at `position`.
    fn has_device(&self, position: CameraPosition) -> bool;

    /// Open a configuration transaction. Pairs with `commit_configuration`.
    fn begin_configuration(&mut self);

    /// Apply everything changed since `begin_configuration` atomically.
    fn commit_configuration(&mut self);

    /// Attach the camera at `position` as the session input.
    fn attach_input(&mut self, position: CameraPosition) -> Result<CameraDevice, CaptureError>;

    /// Remove the current input, if any.
    fn detach_input(&mut self);

    fn has_output(&self, output: CaptureOutput) -> bool;

    fn add_output(&mut self, output: CaptureOutput) -> Result<(), CaptureError>;

    fn is_running(&self) -> bool;

    /// Start streaming; frames are delivered to `sink` until `stop_running`.
    fn start_running(&mut self, sink: FrameSink) -> Result<(), CaptureError>;

    fn stop_running(&mut self);

    /// Issue one still capture. `done` must eventually fire exactly once.
    fn capture_still(&mut self, request: StillRequest, done: StillCallback);
}
