use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::camera_models::{
    AuthorizationStatus, CameraDevice, CameraPosition, CaptureOutput, DeviceOrientation, FlashMode,
    SessionSnapshot, StillRequest,
};
use crate::models::error::CaptureError;
use crate::session::delegate_pool::{PhotoCaptureDelegatePool, PhotoCompletion, RequestId, Resolution};
use crate::traits::camera_backend::{CameraBackend, FrameSink};

/// Called on the session thread after every committed change.
pub type SessionObserver = Arc<dyn Fn(&SessionSnapshot) + Send + Sync + 'static>;

const REQUIRED_OUTPUTS: [CaptureOutput; 2] = [CaptureOutput::Photo, CaptureOutput::VideoFrames];

enum SessionCommand {
    Configure,
    SwitchCamera,
    Start,
    Stop,
    SetOrientation(DeviceOrientation),
    CapturePhoto {
        flash: FlashMode,
        completion: PhotoCompletion,
    },
    StillFinished {
        request_id: RequestId,
        result: Result<Vec<u8>, CaptureError>,
    },
    Flush(mpsc::Sender<()>),
    Shutdown,
}

/// Capture counters kept by the session thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureCounts {
    pub requested: u64,
    pub completed: u64,
    pub empty: u64,
}

/// State readable from any thread, written only by the session thread.
struct SessionShared {
    snapshot: SessionSnapshot,
    in_flight: usize,
    counts: CaptureCounts,
}

/// Owner of the camera hardware session.
///
/// Every session mutation runs on one dedicated thread, one command at a
/// time, in the order the commands were issued:
/// ```text
/// caller ─┐
///         ├→ [command queue] → [session thread] → CameraBackend
/// still ──┘        ↑                   │
/// callbacks ───────┴─── StillFinished ←┘
/// ```
/// Public methods only enqueue and return immediately. `snapshot()` reflects
/// the last committed configuration, never a half-applied one.
pub struct CaptureSessionManager {
    commands: mpsc::Sender<SessionCommand>,
    shared: Arc<Mutex<SessionShared>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CaptureSessionManager {
    /// Move `backend` onto a new session thread.
    ///
    /// `frame_sink` receives the live video stream once the session runs.
    /// The session is idle until `configure()` is called.
    pub fn new<B: CameraBackend>(
        backend: B,
        position: CameraPosition,
        frame_sink: FrameSink,
        observer: Option<SessionObserver>,
    ) -> Result<Self, CaptureError> {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(Mutex::new(SessionShared {
            snapshot: SessionSnapshot::new(position),
            in_flight: 0,
            counts: CaptureCounts::default(),
        }));

        let worker = SessionWorker {
            backend,
            position,
            orientation: DeviceOrientation::default(),
            authorization: AuthorizationStatus::NotDetermined,
            input: None,
            last_error: None,
            pool: PhotoCaptureDelegatePool::new(),
            frame_sink,
            commands: tx.clone(),
            shared: Arc::clone(&shared),
            observer,
        };

        let handle = thread::Builder::new()
            .name("booth-session".into())
            .spawn(move || worker.run(rx))
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn session thread: {}", e)))?;

        Ok(Self {
            commands: tx,
            shared,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Request authorization if needed, then (re)build the session inputs
    /// and outputs in one configuration transaction and start it.
    pub fn configure(&self) {
        self.send(SessionCommand::Configure);
    }

    /// Flip between front and back cameras and reconfigure.
    ///
    /// Ignored while a still capture is in flight.
    pub fn switch_camera(&self) {
        self.send(SessionCommand::SwitchCamera);
    }

    pub fn start(&self) {
        self.send(SessionCommand::Start);
    }

    pub fn stop(&self) {
        self.send(SessionCommand::Stop);
    }

    /// Orientation tagged onto subsequent still requests.
    pub fn set_orientation(&self, orientation: DeviceOrientation) {
        self.send(SessionCommand::SetOrientation(orientation));
    }

    /// Issue one still capture.
    ///
    /// `completion` fires exactly once, on the session thread, with the
    /// decoded photo or `None` if the capture failed for any reason.
    pub fn capture_photo(&self, flash: FlashMode, completion: PhotoCompletion) {
        if let Err(mpsc::SendError(command)) = self
            .commands
            .send(SessionCommand::CapturePhoto { flash, completion })
        {
            log::warn!("Capture requested after session shutdown");
            if let SessionCommand::CapturePhoto { completion, .. } = command {
                completion(None);
            }
        }
    }

    /// The last committed session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.lock().snapshot.clone()
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().snapshot.running
    }

    /// Still captures issued but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.shared.lock().in_flight
    }

    pub fn capture_counts(&self) -> CaptureCounts {
        self.shared.lock().counts
    }

    /// Block until every command queued before this call has run.
    ///
    /// Must not be called from the session thread itself (for example from
    /// a `SessionObserver`).
    pub fn flush(&self) -> Result<(), CaptureError> {
        let (tx, rx) = mpsc::channel();
        self.commands
            .send(SessionCommand::Flush(tx))
            .map_err(|_| CaptureError::SessionClosed)?;
        rx.recv().map_err(|_| CaptureError::SessionClosed)
    }

    /// Stop the session, resolve outstanding captures as empty, and join the
    /// session thread. Idempotent.
    pub fn shutdown(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = self.commands.send(SessionCommand::Shutdown);
            if handle.thread().id() == thread::current().id() {
                // Last owner dropped from a completion; the loop exits on its own.
                return;
            }
            if handle.join().is_err() {
                log::error!("Session thread panicked");
            }
        }
    }

    fn send(&self, command: SessionCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("Session command dropped: session already shut down");
        }
    }
}

impl Drop for CaptureSessionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Session-thread half. Exclusively owns the backend and the delegate pool.
struct SessionWorker<B: CameraBackend> {
    backend: B,
    position: CameraPosition,
    orientation: DeviceOrientation,
    authorization: AuthorizationStatus,
    input: Option<CameraDevice>,
    last_error: Option<CaptureError>,
    pool: PhotoCaptureDelegatePool,
    frame_sink: FrameSink,
    commands: mpsc::Sender<SessionCommand>,
    shared: Arc<Mutex<SessionShared>>,
    observer: Option<SessionObserver>,
}

impl<B: CameraBackend> SessionWorker<B> {
    fn run(mut self, rx: mpsc::Receiver<SessionCommand>) {
        log::debug!("Session thread started");
        while let Ok(command) = rx.recv() {
            match command {
                SessionCommand::Configure => self.configure(),
                SessionCommand::SwitchCamera => self.switch_camera(),
                SessionCommand::Start => {
                    self.start_running();
                    self.publish();
                }
                SessionCommand::Stop => {
                    self.stop_running();
                    self.publish();
                }
                SessionCommand::SetOrientation(orientation) => self.orientation = orientation,
                SessionCommand::CapturePhoto { flash, completion } => {
                    self.capture_photo(flash, completion)
                }
                SessionCommand::StillFinished { request_id, result } => {
                    self.finish_still(request_id, result)
                }
                SessionCommand::Flush(done) => {
                    let _ = done.send(());
                }
                SessionCommand::Shutdown => break,
            }
        }
        self.teardown();
        log::debug!("Session thread exiting");
    }

    fn configure(&mut self) {
        self.authorization = self.backend.authorization_status();
        if self.authorization == AuthorizationStatus::NotDetermined {
            log::info!("Requesting camera authorization");
            self.authorization = self.backend.request_authorization();
        }

        if !self.authorization.is_authorized() {
            log::warn!("Camera access is {:?}; session will not run", self.authorization);
            self.stop_running();
            self.last_error = Some(CaptureError::PermissionDenied);
            self.publish();
            return;
        }

        log::debug!("Begin session configuration ({:?})", self.position);
        self.backend.begin_configuration();

        self.backend.detach_input();
        self.input = None;
        self.last_error = None;

        match self.select_position() {
            Some(position) => match self.backend.attach_input(position) {
                Ok(device) => {
                    log::info!("Attached camera '{}' ({:?})", device.name, device.position);
                    self.position = device.position;
                    self.input = Some(device);
                }
                Err(e) => {
                    log::warn!("Could not create camera input for {:?}: {}", position, e);
                    self.last_error = Some(e);
                }
            },
            None => {
                log::warn!("No camera device available at either position");
                self.last_error = Some(CaptureError::DeviceNotAvailable);
            }
        }

        for output in REQUIRED_OUTPUTS {
            if self.backend.has_output(output) {
                continue;
            }
            if let Err(e) = self.backend.add_output(output) {
                log::warn!("Could not add {:?} output: {}", output, e);
                self.last_error.get_or_insert(e);
            }
        }

        self.backend.commit_configuration();
        log::debug!("Committed session configuration");

        self.start_running();
        self.publish();
    }

    /// Preferred position, falling back to the opposite camera.
    fn select_position(&self) -> Option<CameraPosition> {
        if self.backend.has_device(self.position) {
            Some(self.position)
        } else if self.backend.has_device(self.position.opposite()) {
            log::info!(
                "No {:?} camera; falling back to {:?}",
                self.position,
                self.position.opposite()
            );
            Some(self.position.opposite())
        } else {
            None
        }
    }

    fn switch_camera(&mut self) {
        if !self.pool.is_empty() {
            log::info!("Ignoring camera switch while {} capture(s) in flight", self.pool.len());
            return;
        }
        self.position = self.position.opposite();
        log::info!("Switching camera to {:?}", self.position);
        self.configure();
    }

    fn start_running(&mut self) {
        if self.backend.is_running() || !self.authorization.is_authorized() {
            return;
        }
        if let Err(e) = self.backend.start_running(Arc::clone(&self.frame_sink)) {
            log::error!("Failed to start capture session: {}", e);
            self.last_error = Some(e);
        } else {
            log::info!("Capture session running");
        }
    }

    fn stop_running(&mut self) {
        if self.backend.is_running() {
            self.backend.stop_running();
            log::info!("Capture session stopped");
        }
    }

    fn capture_photo(&mut self, flash: FlashMode, completion: PhotoCompletion) {
        let request_id = self.pool.register(self.position, completion);
        self.shared.lock().counts.requested += 1;

        if !self.backend.is_running() || self.input.is_none() {
            self.finish_still(
                request_id,
                Err(CaptureError::CaptureFailed("session has no running input".into())),
            );
            return;
        }

        let request = StillRequest {
            request_id,
            flash,
            orientation: self.orientation,
        };
        log::debug!("Issuing still capture {} ({:?}, {:?})", request_id, flash, self.orientation);

        let commands = self.commands.clone();
        self.backend.capture_still(
            request,
            Box::new(move |result| {
                // After shutdown nobody is listening; the pool already
                // resolved this request.
                let _ = commands.send(SessionCommand::StillFinished { request_id, result });
            }),
        );
        self.sync_in_flight();
    }

    fn finish_still(&mut self, request_id: RequestId, result: Result<Vec<u8>, CaptureError>) {
        let resolution = self.pool.resolve(request_id, result);
        {
            let mut shared = self.shared.lock();
            match resolution {
                Resolution::Photo => shared.counts.completed += 1,
                Resolution::Empty => {
                    shared.counts.completed += 1;
                    shared.counts.empty += 1;
                }
                Resolution::Unknown => {}
            }
        }
        self.sync_in_flight();
    }

    fn sync_in_flight(&self) {
        self.shared.lock().in_flight = self.pool.len();
    }

    fn teardown(&mut self) {
        self.stop_running();
        let abandoned = self.pool.drain();
        if abandoned > 0 {
            log::info!("Resolved {} in-flight capture(s) as empty on teardown", abandoned);
            let mut shared = self.shared.lock();
            shared.counts.completed += abandoned as u64;
            shared.counts.empty += abandoned as u64;
        }
        self.sync_in_flight();
        self.publish();
    }

    fn publish(&self) {
        let snapshot = SessionSnapshot {
            running: self.backend.is_running(),
            position: self.position,
            authorization: self.authorization,
            input: self.input.clone(),
            outputs: REQUIRED_OUTPUTS
                .into_iter()
                .filter(|o| self.backend.has_output(*o))
                .collect(),
            last_error: self.last_error.clone(),
        };
        self.shared.lock().snapshot = snapshot.clone();
        if let Some(observer) = &self.observer {
            observer(&snapshot);
        }
    }
}
