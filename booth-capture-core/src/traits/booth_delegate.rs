use crate::models::camera_models::SessionSnapshot;
use crate::models::error::CaptureError;
use crate::models::photo::CapturedPhoto;
use crate::models::state::SlotState;

/// Event delegate for booth notifications.
///
/// The single subscription point for a presentation layer. Methods are
/// called from whichever booth thread produced the event, never while the
/// booth's internal lock is held, so implementations may call back into the
/// controller. Marshal to a UI thread if needed.
pub trait BoothDelegate: Send + Sync {
    /// Called whenever the slot state machine changes state.
    fn on_state_changed(&self, state: &SlotState);

    /// Called once per countdown tick with the seconds left.
    fn on_countdown_tick(&self, slot: usize, remaining: u32) {
        let _ = (slot, remaining);
    }

    /// Called after a slot receives a captured or imported photo.
    fn on_slot_filled(&self, slot: usize, photo: &CapturedPhoto);

    /// Called when a capture for `slot` resolved without an image.
    fn on_capture_empty(&self, slot: usize) {
        let _ = slot;
    }

    /// Called after every committed session change.
    fn on_session_changed(&self, snapshot: &SessionSnapshot) {
        let _ = snapshot;
    }

    fn on_error(&self, error: &CaptureError);
}
