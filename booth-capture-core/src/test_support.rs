//! Scriptable collaborators shared by the crate's unit tests.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::RgbaImage;
use parking_lot::Mutex;

use crate::models::camera_models::{
    AuthorizationStatus, CameraDevice, CameraPosition, CaptureOutput, SessionSnapshot, StillRequest,
};
use crate::models::error::CaptureError;
use crate::models::photo::CapturedPhoto;
use crate::models::state::SlotState;
use crate::processing::placeholder::{encode_png, placeholder_panel};
use crate::processing::render::RenderTransform;
use crate::traits::booth_delegate::BoothDelegate;
use crate::traits::camera_backend::{CameraBackend, FrameSink, StillCallback};
use crate::traits::render_surface::RenderSurface;

/// How the mock answers still captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StillMode {
    /// Reply from a helper thread with a decodable PNG.
    Succeed,
    /// Reply from a helper thread with undecodable bytes.
    Garbage,
    /// Reply from a helper thread with a hardware error.
    Fail,
    /// Keep the callback until the test releases it.
    Hold,
}

pub struct MockState {
    pub authorization: AuthorizationStatus,
    pub grant_on_request: AuthorizationStatus,
    pub authorization_requests: usize,
    pub devices: Vec<CameraPosition>,
    pub attach_error: Option<CaptureError>,
    pub in_configuration: bool,
    pub configurations: usize,
    pub inputs: Vec<CameraDevice>,
    pub max_inputs: usize,
    pub attached_outside_configuration: bool,
    pub outputs: Vec<CaptureOutput>,
    pub running: bool,
    pub start_calls: usize,
    pub sink: Option<FrameSink>,
    pub still_mode: StillMode,
    pub requests: Vec<StillRequest>,
    pub held: Vec<StillCallback>,
}

/// In-memory camera backend whose state tests can inspect and steer.
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState {
            authorization: AuthorizationStatus::Authorized,
            grant_on_request: AuthorizationStatus::Authorized,
            authorization_requests: 0,
            devices: vec![CameraPosition::Front, CameraPosition::Back],
            attach_error: None,
            in_configuration: false,
            configurations: 0,
            inputs: Vec::new(),
            max_inputs: 0,
            attached_outside_configuration: false,
            outputs: Vec::new(),
            running: false,
            start_calls: 0,
            sink: None,
            still_mode: StillMode::Succeed,
            requests: Vec::new(),
            held: Vec::new(),
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

/// Fire every held still callback with a successful PNG.
pub fn release_held(state: &Arc<Mutex<MockState>>) -> usize {
    let held: Vec<_> = state.lock().held.drain(..).collect();
    let count = held.len();
    for callback in held {
        callback(Ok(still_png()));
    }
    count
}

pub fn still_png() -> Vec<u8> {
    encode_png(&placeholder_panel(24, 16, 1, "")).unwrap()
}

impl CameraBackend for MockBackend {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.state.lock().authorization
    }

    fn request_authorization(&mut self) -> AuthorizationStatus {
        let mut s = self.state.lock();
        s.authorization_requests += 1;
        s.authorization = s.grant_on_request;
        s.authorization
    }

    fn has_device(&self, position: CameraPosition) -> bool {
        self.state.lock().devices.contains(&position)
    }

    fn begin_configuration(&mut self) {
        let mut s = self.state.lock();
        assert!(!s.in_configuration, "nested configuration");
        s.in_configuration = true;
    }

    fn commit_configuration(&mut self) {
        let mut s = self.state.lock();
        assert!(s.in_configuration, "commit without begin");
        s.in_configuration = false;
        s.configurations += 1;
    }

    fn attach_input(&mut self, position: CameraPosition) -> Result<CameraDevice, CaptureError> {
        let mut s = self.state.lock();
        if !s.in_configuration {
            s.attached_outside_configuration = true;
        }
        if let Some(e) = s.attach_error.clone() {
            return Err(e);
        }
        let device = CameraDevice {
            id: format!("mock-{:?}", position).to_lowercase(),
            name: format!("Mock {:?} Camera", position),
            position,
        };
        s.inputs.push(device.clone());
        s.max_inputs = s.max_inputs.max(s.inputs.len());
        Ok(device)
    }

    fn detach_input(&mut self) {
        self.state.lock().inputs.clear();
    }

    fn has_output(&self, output: CaptureOutput) -> bool {
        self.state.lock().outputs.contains(&output)
    }

    fn add_output(&mut self, output: CaptureOutput) -> Result<(), CaptureError> {
        self.state.lock().outputs.push(output);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }

    fn start_running(&mut self, sink: FrameSink) -> Result<(), CaptureError> {
        let mut s = self.state.lock();
        s.running = true;
        s.start_calls += 1;
        s.sink = Some(sink);
        Ok(())
    }

    fn stop_running(&mut self) {
        let mut s = self.state.lock();
        s.running = false;
        s.sink = None;
    }

    fn capture_still(&mut self, request: StillRequest, done: StillCallback) {
        let mut s = self.state.lock();
        s.requests.push(request);
        let mode = s.still_mode;
        let reply: Result<Vec<u8>, CaptureError> = match mode {
            StillMode::Hold => {
                s.held.push(done);
                return;
            }
            StillMode::Succeed => Ok(still_png()),
            StillMode::Garbage => Ok(vec![0xde, 0xad, 0xbe, 0xef]),
            StillMode::Fail => Err(CaptureError::CaptureFailed("mock sensor error".into())),
        };
        drop(s);
        thread::spawn(move || done(reply));
    }
}

/// Surface that records what it was asked to present.
pub struct RecordingSurface {
    pub size: (u32, u32),
    pub fail_accelerated: bool,
    /// Delay inside each accelerated present, to widen race windows.
    pub present_delay: Duration,
    pub log: Arc<Mutex<SurfaceLog>>,
}

#[derive(Default)]
pub struct SurfaceLog {
    /// Accelerated presents entered, including ones still in progress.
    pub started: usize,
    pub accelerated: Vec<(RgbaImage, RenderTransform)>,
    pub direct: Vec<RgbaImage>,
}

impl RecordingSurface {
    pub fn new(size: (u32, u32)) -> (Self, Arc<Mutex<SurfaceLog>>) {
        let log = Arc::new(Mutex::new(SurfaceLog::default()));
        (
            Self {
                size,
                fail_accelerated: false,
                present_delay: Duration::ZERO,
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl RenderSurface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn present_accelerated(
        &mut self,
        frame: &RgbaImage,
        transform: &RenderTransform,
    ) -> Result<(), CaptureError> {
        self.log.lock().started += 1;
        if !self.present_delay.is_zero() {
            thread::sleep(self.present_delay);
        }
        if self.fail_accelerated {
            return Err(CaptureError::RenderFailed("mock gpu lost".into()));
        }
        self.log.lock().accelerated.push((frame.clone(), *transform));
        Ok(())
    }

    fn present_direct(&mut self, frame: RgbaImage) {
        self.log.lock().direct.push(frame);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoothEvent {
    State(SlotState),
    Tick(usize, u32),
    Filled(usize),
    Empty(usize),
    Session(bool),
    Error(CaptureError),
}

/// Delegate that records every event in order.
#[derive(Default)]
pub struct RecordingDelegate {
    pub events: Mutex<Vec<BoothEvent>>,
}

impl RecordingDelegate {
    pub fn states(&self) -> Vec<SlotState> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                BoothEvent::State(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}

impl BoothDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: &SlotState) {
        self.events.lock().push(BoothEvent::State(*state));
    }

    fn on_countdown_tick(&self, slot: usize, remaining: u32) {
        self.events.lock().push(BoothEvent::Tick(slot, remaining));
    }

    fn on_slot_filled(&self, slot: usize, _photo: &CapturedPhoto) {
        self.events.lock().push(BoothEvent::Filled(slot));
    }

    fn on_capture_empty(&self, slot: usize) {
        self.events.lock().push(BoothEvent::Empty(slot));
    }

    fn on_session_changed(&self, snapshot: &SessionSnapshot) {
        self.events.lock().push(BoothEvent::Session(snapshot.running));
    }

    fn on_error(&self, error: &CaptureError) {
        self.events.lock().push(BoothEvent::Error(error.clone()));
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
