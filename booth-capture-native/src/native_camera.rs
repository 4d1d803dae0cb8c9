//! `CameraBackend` over the platform camera API via `nokhwa`.
//!
//! nokhwa's `Camera` is not `Send`, so the session never touches it
//! directly: the camera is opened inside a dedicated stream thread that
//! pushes preview frames to the sink and answers still requests from the
//! next frame it grabs.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use image::{imageops, DynamicImage, ImageFormat, RgbImage};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use booth_capture_core::models::camera_models::{
    AuthorizationStatus, CameraDevice, CameraPosition, CaptureOutput, DeviceOrientation, FlashMode,
    StillRequest,
};
use booth_capture_core::models::error::CaptureError;
use booth_capture_core::models::frame::VideoFrame;
use booth_capture_core::traits::camera_backend::{CameraBackend, FrameSink, StillCallback};

use crate::permissions;

const OPEN_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
struct NativeDevice {
    index: CameraIndex,
    id: String,
    name: String,
    position: CameraPosition,
}

impl NativeDevice {
    fn describe(&self) -> CameraDevice {
        CameraDevice {
            id: self.id.clone(),
            name: self.name.clone(),
            position: self.position,
        }
    }
}

struct PendingStill {
    request: StillRequest,
    done: StillCallback,
}

/// The running stream thread and how to reach it.
struct StreamHandle {
    device_id: String,
    sink: FrameSink,
    running: Arc<AtomicBool>,
    stills: mpsc::Sender<PendingStill>,
    handle: thread::JoinHandle<()>,
}

/// Hardware camera backend.
///
/// The first enumerated camera is treated as the front camera, the second
/// as the back camera; any others are ignored.
pub struct NativeCamera {
    devices: Vec<NativeDevice>,
    authorization: AuthorizationStatus,
    input: Option<NativeDevice>,
    outputs: Vec<CaptureOutput>,
    stream: Option<StreamHandle>,
}

impl NativeCamera {
    /// Enumerate cameras. An empty list is not an error; the session will
    /// report the device as unavailable.
    pub fn discover() -> Result<Self, CaptureError> {
        let infos = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| CaptureError::ConfigurationFailed(format!("camera query failed: {}", e)))?;

        let devices: Vec<NativeDevice> = infos
            .into_iter()
            .zip([CameraPosition::Front, CameraPosition::Back])
            .map(|(info, position)| NativeDevice {
                index: info.index().clone(),
                id: format!("native-{:?}", position).to_lowercase(),
                name: info.human_name(),
                position,
            })
            .collect();

        for device in &devices {
            log::info!("Found camera '{}' as {:?}", device.name, device.position);
        }

        Ok(Self {
            devices,
            authorization: permissions::authorization_status(),
            input: None,
            outputs: Vec::new(),
            stream: None,
        })
    }

    fn device_at(&self, position: CameraPosition) -> Option<&NativeDevice> {
        self.devices.iter().find(|d| d.position == position)
    }

    fn spawn_stream(&self, device: NativeDevice, sink: FrameSink) -> Result<StreamHandle, CaptureError> {
        let running = Arc::new(AtomicBool::new(true));
        let (still_tx, still_rx) = mpsc::channel::<PendingStill>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), CaptureError>>();

        let thread_running = Arc::clone(&running);
        let thread_sink = Arc::clone(&sink);
        let device_id = device.id.clone();
        let handle = thread::Builder::new()
            .name("native-camera-stream".into())
            .spawn(move || stream_loop(device, thread_running, still_rx, thread_sink, ready_tx))
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn camera thread: {}", e)))?;

        match ready_rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(Ok(())) => Ok(StreamHandle {
                device_id,
                sink,
                running,
                stills: still_tx,
                handle,
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                running.store(false, Ordering::SeqCst);
                Err(CaptureError::ConfigurationFailed("camera did not open in time".into()))
            }
        }
    }

    fn stop_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.running.store(false, Ordering::SeqCst);
            drop(stream.stills);
            if stream.handle.join().is_err() {
                log::error!("Camera stream thread panicked");
            }
        }
    }
}

impl CameraBackend for NativeCamera {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.authorization
    }

    fn request_authorization(&mut self) -> AuthorizationStatus {
        self.authorization = permissions::request_authorization();
        self.authorization
    }

    fn has_device(&self, position: CameraPosition) -> bool {
        self.device_at(position).is_some()
    }

    fn begin_configuration(&mut self) {}

    fn commit_configuration(&mut self) {
        // A stream still bound to the old input is reopened on the new one.
        let stale = match (&self.stream, &self.input) {
            (Some(stream), Some(input)) => stream.device_id != input.id,
            (Some(_), None) => true,
            _ => false,
        };
        if !stale {
            return;
        }
        let sink = self.stream.as_ref().map(|s| Arc::clone(&s.sink));
        self.stop_stream();
        if let (Some(sink), Some(input)) = (sink, self.input.clone()) {
            match self.spawn_stream(input, sink) {
                Ok(stream) => self.stream = Some(stream),
                Err(e) => log::error!("Could not reopen camera stream: {}", e),
            }
        }
    }

    fn attach_input(&mut self, position: CameraPosition) -> Result<CameraDevice, CaptureError> {
        let device = self
            .device_at(position)
            .cloned()
            .ok_or(CaptureError::DeviceNotAvailable)?;
        let described = device.describe();
        self.input = Some(device);
        Ok(described)
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
        self.stream
            .as_ref()
            .is_some_and(|s| s.running.load(Ordering::SeqCst))
    }

    fn start_running(&mut self, sink: FrameSink) -> Result<(), CaptureError> {
        if self.is_running() {
            return Ok(());
        }
        self.stop_stream();
        let input = self.input.clone().ok_or(CaptureError::DeviceNotAvailable)?;
        self.stream = Some(self.spawn_stream(input, sink)?);
        Ok(())
    }

    fn stop_running(&mut self) {
        self.stop_stream();
    }

    fn capture_still(&mut self, request: StillRequest, done: StillCallback) {
        let Some(stream) = &self.stream else {
            done(Err(CaptureError::CaptureFailed("camera is not streaming".into())));
            return;
        };
        if request.flash != FlashMode::Off {
            log::debug!("Flash {:?} requested; webcams have no flash unit", request.flash);
        }
        if let Err(mpsc::SendError(pending)) = stream.stills.send(PendingStill { request, done }) {
            (pending.done)(Err(CaptureError::CaptureFailed("camera stream has stopped".into())));
        }
    }
}

impl Drop for NativeCamera {
    fn drop(&mut self) {
        self.stop_stream();
    }
}

fn stream_loop(
    device: NativeDevice,
    running: Arc<AtomicBool>,
    stills: mpsc::Receiver<PendingStill>,
    sink: FrameSink,
    ready: mpsc::Sender<Result<(), CaptureError>>,
) {
    let mut camera = match open_camera(&device) {
        Ok(camera) => camera,
        Err(e) => {
            running.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(e));
            return;
        }
    };
    if ready.send(Ok(())).is_err() {
        let _ = camera.stop_stream();
        return;
    }
    log::info!("Camera '{}' streaming", device.name);

    let started = Instant::now();
    let mut sequence = 0u64;
    while running.load(Ordering::SeqCst) {
        let image = match grab_frame(&mut camera) {
            Ok(image) => image,
            Err(e) => {
                log::debug!("Camera frame error: {}", e);
                thread::sleep(RETRY_DELAY);
                continue;
            }
        };

        while let Ok(still) = stills.try_recv() {
            let bytes = encode_still(&image, still.request.orientation);
            (still.done)(bytes);
        }

        let rgba = DynamicImage::ImageRgb8(image).into_rgba8();
        sink(VideoFrame::new(sequence, started.elapsed(), device.position, rgba));
        sequence += 1;
    }

    if let Err(e) = camera.stop_stream() {
        log::warn!("Failed to stop camera stream: {}", e);
    }
    while let Ok(still) = stills.try_recv() {
        (still.done)(Err(CaptureError::CaptureFailed("camera stream stopped".into())));
    }
    log::info!("Camera '{}' stopped after {} frames", device.name, sequence);
}

fn open_camera(device: &NativeDevice) -> Result<Camera, CaptureError> {
    let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera = Camera::new(device.index.clone(), format)
        .map_err(|e| CaptureError::ConfigurationFailed(format!("cannot open '{}': {}", device.name, e)))?;
    camera
        .open_stream()
        .map_err(|e| CaptureError::ConfigurationFailed(format!("cannot stream '{}': {}", device.name, e)))?;
    Ok(camera)
}

fn grab_frame(camera: &mut Camera) -> Result<RgbImage, CaptureError> {
    let buffer = camera
        .frame()
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CaptureError::DecodeFailed(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());
    RgbImage::from_raw(width, height, decoded.into_raw())
        .ok_or_else(|| CaptureError::DecodeFailed("frame buffer size mismatch".into()))
}

/// Rotate to the device orientation and encode as JPEG.
fn encode_still(image: &RgbImage, orientation: DeviceOrientation) -> Result<Vec<u8>, CaptureError> {
    let oriented = match orientation {
        DeviceOrientation::Portrait => image.clone(),
        DeviceOrientation::PortraitUpsideDown => imageops::rotate180(image),
        DeviceOrientation::LandscapeLeft => imageops::rotate90(image),
        DeviceOrientation::LandscapeRight => imageops::rotate270(image),
    };
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(oriented)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .map_err(|e| CaptureError::CaptureFailed(format!("jpeg encode failed: {}", e)))?;
    Ok(bytes)
}
