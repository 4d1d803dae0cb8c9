//! Camera backend with no hardware behind it.
//!
//! Streams a moving test pattern and answers still captures with a
//! placeholder panel stamped with the capture time. Used on simulators,
//! headless machines, and anywhere a real camera is unavailable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use parking_lot::Mutex;

use crate::models::camera_models::{
    AuthorizationStatus, CameraDevice, CameraPosition, CaptureOutput, StillRequest,
};
use crate::models::error::CaptureError;
use crate::models::frame::VideoFrame;
use crate::processing::placeholder::{caption_for, encode_png, placeholder_panel, test_pattern};
use crate::traits::camera_backend::{CameraBackend, FrameSink, StillCallback};

#[derive(Debug, Clone)]
pub struct SyntheticCameraOptions {
    /// Reported authorization; prompts resolve to this immediately.
    pub authorization: AuthorizationStatus,
    /// Positions that have a "device".
    pub positions: Vec<CameraPosition>,
    pub frame_size: (u32, u32),
    /// Frames per second of the preview stream.
    pub frame_rate: u32,
    pub still_size: (u32, u32),
}

impl Default for SyntheticCameraOptions {
    fn default() -> Self {
        Self {
            authorization: AuthorizationStatus::Authorized,
            positions: vec![CameraPosition::Front, CameraPosition::Back],
            frame_size: (320, 240),
            frame_rate: 30,
            still_size: (640, 480),
        }
    }
}

pub struct SyntheticCamera {
    options: SyntheticCameraOptions,
    input: Option<CameraDevice>,
    outputs: Vec<CaptureOutput>,
    running: Arc<AtomicBool>,
    stream_handle: Mutex<Option<thread::JoinHandle<()>>>,
    /// Device and sink the current stream was started with.
    streaming: Option<(CameraDevice, FrameSink)>,
}

impl SyntheticCamera {
    pub fn new(options: SyntheticCameraOptions) -> Self {
        Self {
            options,
            input: None,
            outputs: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            stream_handle: Mutex::new(None),
            streaming: None,
        }
    }

    fn spawn_stream(&mut self, device: CameraDevice, sink: FrameSink) -> Result<(), CaptureError> {
        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let (width, height) = self.options.frame_size;
        let interval = Duration::from_secs(1) / self.options.frame_rate.max(1);
        let position = device.position;
        let thread_sink = Arc::clone(&sink);

        let handle = thread::Builder::new()
            .name("synthetic-camera-stream".into())
            .spawn(move || {
                let started = Instant::now();
                let mut sequence = 0u64;
                while running.load(Ordering::SeqCst) {
                    let image = test_pattern(width, height, sequence);
                    thread_sink(VideoFrame::new(sequence, started.elapsed(), position, image));
                    sequence += 1;
                    thread::sleep(interval);
                }
                log::debug!("Synthetic stream stopped after {} frames", sequence);
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                CaptureError::Unknown(format!("failed to spawn stream thread: {}", e))
            })?;

        log::debug!("Synthetic stream started for {:?}", position);
        *self.stream_handle.lock() = Some(handle);
        self.streaming = Some((device, sink));
        Ok(())
    }

    fn stop_stream(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.stream_handle.lock().take() {
            let _ = handle.join();
        }
        self.streaming = None;
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(SyntheticCameraOptions::default())
    }
}

impl CameraBackend for SyntheticCamera {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.options.authorization
    }

    fn request_authorization(&mut self) -> AuthorizationStatus {
        if self.options.authorization == AuthorizationStatus::NotDetermined {
            self.options.authorization = AuthorizationStatus::Authorized;
        }
        self.options.authorization
    }

    fn has_device(&self, position: CameraPosition) -> bool {
        self.options.positions.contains(&position)
    }

    fn begin_configuration(&mut self) {}

    fn commit_configuration(&mut self) {
        // A running stream follows the input: stopped without one, reopened
        // when the input changed.
        let Some((streamed, sink)) = self.streaming.clone() else {
            return;
        };
        match self.input.clone() {
            None => self.stop_stream(),
            Some(input) if input != streamed => {
                self.stop_stream();
                if let Err(e) = self.spawn_stream(input, sink) {
                    log::error!("Could not restart synthetic stream: {}", e);
                }
            }
            Some(_) => {}
        }
    }

    fn attach_input(&mut self, position: CameraPosition) -> Result<CameraDevice, CaptureError> {
        if !self.has_device(position) {
            return Err(CaptureError::DeviceNotAvailable);
        }
        let device = CameraDevice {
            id: format!("synthetic-{:?}", position).to_lowercase(),
            name: format!("Synthetic {:?} Camera", position),
            position,
        };
        self.input = Some(device.clone());
        Ok(device)
    }

    fn detach_input(&mut self) {
        self.input = None;
    }

    fn has_output(&self, output: CaptureOutput) -> bool {
        self.outputs.contains(&output)
    }

    fn add_output(&mut self, output: CaptureOutput) -> Result<(), CaptureError> {
        if !self.outputs.contains(&output) {
            self.outputs.push(output);
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn start_running(&mut self, sink: FrameSink) -> Result<(), CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }
        let Some(device) = self.input.clone() else {
            return Err(CaptureError::DeviceNotAvailable);
        };
        self.spawn_stream(device, sink)
    }

    fn stop_running(&mut self) {
        self.stop_stream();
    }

    /// Answers with a placeholder panel whose color depends only on the
    /// request id. The caption is the local wall-clock time of the capture,
    /// so two stills match pixel for pixel only when taken in the same second.
    fn capture_still(&mut self, request: StillRequest, done: StillCallback) {
        let (width, height) = self.options.still_size;
        let pending = Arc::new(Mutex::new(Some(done)));
        let worker_pending = Arc::clone(&pending);
        let spawned = thread::Builder::new()
            .name(format!("synthetic-still-{}", request.request_id))
            .spawn(move || {
                let caption = caption_for(&Local::now());
                let panel = placeholder_panel(width, height, request.request_id, &caption);
                if let Some(done) = worker_pending.lock().take() {
                    done(encode_png(&panel));
                }
            });
        if let Err(e) = spawned {
            log::error!("Failed to spawn still capture thread: {}", e);
            if let Some(done) = pending.lock().take() {
                done(Err(CaptureError::CaptureFailed(e.to_string())));
            }
        }
    }
}

impl Drop for SyntheticCamera {
    fn drop(&mut self) {
        self.stop_stream();
    }
}
