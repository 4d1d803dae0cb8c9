//! Live filtered camera preview.
//!
//! ```text
//! [backend capture thread] → FrameSink → [FrameMailbox] → [render thread]
//!                                                             │ filter
//!                                                             │ aspect-fill / mirror
//!                                                             ↓
//!                                                       RenderSurface
//! ```
//! The mailbox holds at most one frame, so a slow renderer drops late frames
//! instead of queueing them. Frame arrival is the only thing that schedules a
//! redraw; the render thread never polls the camera.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::frame::VideoFrame;
use crate::processing::filters::{apply_filter, FilterKind};
use crate::processing::frame_mailbox::FrameMailbox;
use crate::processing::render::{render_direct, RenderTransform};
use crate::traits::camera_backend::FrameSink;
use crate::traits::render_surface::RenderSurface;

/// How long the render thread waits for a frame before rechecking shutdown.
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Which render path a frame took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Accelerated,
    Fallback,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_received: u64,
    pub frames_rendered: u64,
    pub frames_dropped: u64,
    pub frames_skipped: u64,
    pub render_fallbacks: u64,
}

/// State the render thread reads at the start of every frame.
struct PreviewControls {
    filter: FilterKind,
    preview_slot: Option<usize>,
}

pub struct LiveFramePipeline {
    mailbox: Arc<FrameMailbox<VideoFrame>>,
    controls: Arc<Mutex<PreviewControls>>,
    stats: Arc<Mutex<PipelineStats>>,
    running: Arc<AtomicBool>,
    render_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl LiveFramePipeline {
    /// Spawn the render thread drawing into `surface`, at most one redraw
    /// per `min_frame_interval`.
    pub fn start<S: RenderSurface>(
        surface: S,
        min_frame_interval: Duration,
    ) -> Result<Self, CaptureError> {
        let mailbox = Arc::new(FrameMailbox::new());
        let controls = Arc::new(Mutex::new(PreviewControls {
            filter: FilterKind::None,
            preview_slot: None,
        }));
        let stats = Arc::new(Mutex::new(PipelineStats::default()));
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let mailbox = Arc::clone(&mailbox);
            let controls = Arc::clone(&controls);
            let stats = Arc::clone(&stats);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("booth-preview".into())
                .spawn(move || {
                    render_loop(surface, mailbox, controls, stats, running, min_frame_interval)
                })
                .map_err(|e| {
                    CaptureError::Unknown(format!("failed to spawn preview thread: {}", e))
                })?
        };

        Ok(Self {
            mailbox,
            controls,
            stats,
            running,
            render_handle: Mutex::new(Some(handle)),
        })
    }

    /// Callback to hand to the camera backend.
    pub fn frame_sink(&self) -> FrameSink {
        let mailbox = Arc::clone(&self.mailbox);
        Arc::new(move |frame: VideoFrame| {
            mailbox.push(frame);
        })
    }

    /// Takes effect from the next frame whose render has not started yet.
    pub fn select_filter(&self, filter: FilterKind) {
        self.controls.lock().filter = filter;
        log::debug!("Preview filter set to {:?}", filter);
    }

    pub fn selected_filter(&self) -> FilterKind {
        self.controls.lock().filter
    }

    /// Slot currently receiving the preview; `None` pauses drawing.
    pub fn set_preview_slot(&self, slot: Option<usize>) {
        self.controls.lock().preview_slot = slot;
    }

    pub fn preview_slot(&self) -> Option<usize> {
        self.controls.lock().preview_slot
    }

    pub fn stats(&self) -> PipelineStats {
        let mut stats = *self.stats.lock();
        stats.frames_received = self.mailbox.pushed();
        stats.frames_dropped = self.mailbox.dropped();
        stats
    }

    /// Stop drawing and join the render thread. Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.mailbox.close();
        let handle = self.render_handle.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Preview render thread panicked");
            }
        }
    }
}

impl Drop for LiveFramePipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

fn render_loop<S: RenderSurface>(
    mut surface: S,
    mailbox: Arc<FrameMailbox<VideoFrame>>,
    controls: Arc<Mutex<PreviewControls>>,
    stats: Arc<Mutex<PipelineStats>>,
    running: Arc<AtomicBool>,
    min_frame_interval: Duration,
) {
    log::debug!("Preview render thread started");
    while running.load(Ordering::SeqCst) {
        let Some(frame) = mailbox.wait_take(IDLE_WAIT) else {
            continue;
        };
        let started = Instant::now();

        // One read per frame: a filter change mid-render applies to the next frame.
        let (filter, preview_slot) = {
            let c = controls.lock();
            (c.filter, c.preview_slot)
        };
        if preview_slot.is_none() {
            stats.lock().frames_skipped += 1;
            continue;
        }

        let outcome = render_frame(&mut surface, &frame, filter);
        {
            let mut s = stats.lock();
            s.frames_rendered += 1;
            if outcome == RenderOutcome::Fallback {
                s.render_fallbacks += 1;
            }
        }

        let elapsed = started.elapsed();
        if elapsed < min_frame_interval {
            thread::sleep(min_frame_interval - elapsed);
        }
    }
    log::debug!("Preview render thread exiting");
}

/// Filter `frame` and present it, falling back to the CPU path if the
/// accelerated present fails.
pub fn render_frame<S: RenderSurface + ?Sized>(
    surface: &mut S,
    frame: &VideoFrame,
    filter: FilterKind,
) -> RenderOutcome {
    let filtered = apply_filter(&frame.image, filter);
    let transform = RenderTransform::aspect_fill(
        filtered.dimensions(),
        surface.size(),
        frame.position.is_mirrored(),
    );

    match surface.present_accelerated(&filtered, &transform) {
        Ok(()) => RenderOutcome::Accelerated,
        Err(e) => {
            log::warn!("Accelerated render failed for frame {}: {}", frame.sequence, e);
            surface.present_direct(render_direct(&filtered, &transform));
            RenderOutcome::Fallback
        }
    }
}
