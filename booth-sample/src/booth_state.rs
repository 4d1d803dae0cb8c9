use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;

use booth_capture_core::{
    BoothDelegate, CaptureError, CaptureSlot, CapturedPhoto, PhotoMetadata, SessionDiagnostics,
    SessionSnapshot, SlotState,
};

/// BoothDelegate that prints every event as a JSON line, standing in for a
/// UI that would redraw on each one.
pub struct ConsoleDelegate {
    settled: Mutex<Option<SlotState>>,
    changed: Condvar,
}

impl ConsoleDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            settled: Mutex::new(None),
            changed: Condvar::new(),
        })
    }

    /// Block until the booth stops on its own (all slots done, or back to
    /// idle after an empty capture), or `timeout` passes.
    pub fn wait_until_settled(&self, timeout: Duration) -> Option<SlotState> {
        let deadline = Instant::now() + timeout;
        let mut settled = self.settled.lock();
        while settled.is_none() {
            if self.changed.wait_until(&mut settled, deadline).timed_out() {
                break;
            }
        }
        *settled
    }

    fn emit<T: Serialize>(&self, event: &str, payload: T) {
        let line = EventLine { event, payload };
        match serde_json::to_string(&line) {
            Ok(json) => println!("{}", json),
            Err(e) => log::warn!("Could not serialize {} event: {}", event, e),
        }
    }
}

// -- Event payloads --

#[derive(Serialize)]
struct EventLine<'a, T> {
    event: &'a str,
    payload: T,
}

#[derive(Serialize)]
struct StateChangedPayload {
    state: &'static str,
    slot: Option<usize>,
    remaining: Option<u32>,
}

#[derive(Serialize)]
struct TickPayload {
    slot: usize,
    remaining: u32,
}

#[derive(Serialize)]
struct SlotPayload {
    slot: usize,
    photo: Option<PhotoMetadata>,
}

#[derive(Serialize)]
struct SessionPayload {
    running: bool,
    camera: Option<String>,
    authorization: String,
}

#[derive(Serialize)]
struct ErrorPayload {
    message: String,
}

impl BoothDelegate for ConsoleDelegate {
    fn on_state_changed(&self, state: &SlotState) {
        self.emit(
            "booth://state-changed",
            StateChangedPayload {
                state: state.name(),
                slot: state.slot(),
                remaining: state.remaining(),
            },
        );
        if matches!(state, SlotState::Idle { .. } | SlotState::Done) {
            *self.settled.lock() = Some(*state);
            self.changed.notify_all();
        }
    }

    fn on_countdown_tick(&self, slot: usize, remaining: u32) {
        self.emit("booth://countdown", TickPayload { slot, remaining });
    }

    fn on_slot_filled(&self, slot: usize, photo: &CapturedPhoto) {
        self.emit(
            "booth://slot-filled",
            SlotPayload {
                slot,
                photo: Some(photo.metadata()),
            },
        );
    }

    fn on_capture_empty(&self, slot: usize) {
        self.emit("booth://capture-empty", SlotPayload { slot, photo: None });
    }

    fn on_session_changed(&self, snapshot: &SessionSnapshot) {
        self.emit(
            "booth://session-changed",
            SessionPayload {
                running: snapshot.running,
                camera: snapshot.input.as_ref().map(|d| d.name.clone()),
                authorization: format!("{:?}", snapshot.authorization),
            },
        );
    }

    fn on_error(&self, error: &CaptureError) {
        self.emit(
            "booth://error",
            ErrorPayload {
                message: error.to_string(),
            },
        );
    }
}

/// What the sample prints once the layout settles.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    pub layout: String,
    pub final_state: String,
    pub slots: Vec<SlotSummary>,
    pub diagnostics: SessionDiagnostics,
    pub previews_presented: u64,
    pub generated_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub index: usize,
    pub photo: Option<PhotoMetadata>,
}

impl From<&CaptureSlot> for SlotSummary {
    fn from(slot: &CaptureSlot) -> Self {
        Self {
            index: slot.index,
            photo: slot.photo.as_ref().map(CapturedPhoto::metadata),
        }
    }
}
