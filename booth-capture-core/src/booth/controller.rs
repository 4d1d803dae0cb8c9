use std::sync::{Arc, Weak};

use image::RgbaImage;
use parking_lot::Mutex;

use crate::booth::countdown::Countdown;
use crate::booth::slot_machine::SlotMachine;
use crate::models::camera_models::{DeviceOrientation, SessionDiagnostics, SessionSnapshot};
use crate::models::config::BoothConfiguration;
use crate::models::error::CaptureError;
use crate::models::photo::CapturedPhoto;
use crate::models::slot::{CaptureSlot, Layout};
use crate::models::state::SlotState;
use crate::pipeline::live_preview::LiveFramePipeline;
use crate::processing::filters::FilterKind;
use crate::session::manager::{CaptureSessionManager, SessionObserver};
use crate::traits::booth_delegate::BoothDelegate;
use crate::traits::camera_backend::CameraBackend;
use crate::traits::render_surface::RenderSurface;

/// Event queued under the booth lock and delivered after it is released.
enum Notification {
    State(SlotState),
    Tick { slot: usize, remaining: u32 },
    Filled { slot: usize, photo: CapturedPhoto },
    Empty { slot: usize },
}

/// Mutable booth state. Every slot mutation happens under this lock.
struct BoothInner {
    machine: SlotMachine,
    countdown: Option<Countdown>,
    generation: u64,
    shut_down: bool,
}

/// Shared by the controller, countdown threads, and capture completions.
/// Background work only holds a `Weak` to it.
struct BoothCore {
    inner: Mutex<BoothInner>,
    session: CaptureSessionManager,
    pipeline: LiveFramePipeline,
    delegate: Option<Arc<dyn BoothDelegate>>,
    config: BoothConfiguration,
}

/// Capture screen for one layout.
///
/// Wires the camera session, the live preview, and the slot state machine
/// together and exposes the user intents:
/// ```text
/// start_capture → countdown ticks → still capture → slot filled → next slot
///                      ↑ cancel                        (auto-advance)
/// ```
/// Dropping the controller tears everything down; a capture completing
/// afterwards is discarded.
pub struct BoothController {
    core: Arc<BoothCore>,
}

impl BoothController {
    pub fn new<B: CameraBackend, S: RenderSurface>(
        backend: B,
        surface: S,
        layout: &Layout,
        config: BoothConfiguration,
        delegate: Option<Arc<dyn BoothDelegate>>,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        layout.validate().map_err(CaptureError::ConfigurationFailed)?;

        let machine = SlotMachine::new(layout.poses, config.countdown_secs, config.auto_advance)?;
        let pipeline = LiveFramePipeline::start(surface, config.min_frame_interval())?;
        pipeline.set_preview_slot(machine.preview_slot());

        let observer = delegate.as_ref().map(|d| session_observer(Arc::clone(d)));
        let session = CaptureSessionManager::new(
            backend,
            config.preferred_position,
            pipeline.frame_sink(),
            observer,
        )?;
        session.configure();

        log::info!(
            "Booth ready: layout '{}' with {} slot(s), {}s countdown",
            layout.name,
            layout.poses,
            config.countdown_secs
        );

        Ok(Self {
            core: Arc::new(BoothCore {
                inner: Mutex::new(BoothInner {
                    machine,
                    countdown: None,
                    generation: 0,
                    shut_down: false,
                }),
                session,
                pipeline,
                delegate,
                config,
            }),
        })
    }

    /// Begin the countdown for the active slot. Returns the slot index.
    pub fn start_capture(&self) -> Result<usize, CaptureError> {
        let core = &self.core;
        let mut inner = core.inner.lock();
        core.ensure_open(&inner)?;

        let slot = inner.machine.start()?;
        if let Err(e) = core.begin_countdown(&mut inner) {
            let _ = inner.machine.cancel();
            core.finish(inner);
            return Err(e);
        }
        core.finish(inner);
        Ok(slot)
    }

    /// Stop a running countdown. The slot is left untouched.
    pub fn cancel(&self) -> Result<(), CaptureError> {
        let core = &self.core;
        let mut inner = core.inner.lock();
        core.ensure_open(&inner)?;

        inner.machine.cancel()?;
        if let Some(mut countdown) = inner.countdown.take() {
            countdown.cancel();
        }
        core.finish(inner);
        Ok(())
    }

    /// Flip cameras. Refused while a countdown or capture is in progress.
    pub fn switch_camera(&self) -> Result<(), CaptureError> {
        let inner = self.core.inner.lock();
        self.core.ensure_open(&inner)?;
        if !inner.machine.can_switch_camera() || self.core.session.in_flight() > 0 {
            return Err(CaptureError::InvalidTransition(format!(
                "cannot switch camera while {}",
                inner.machine.state().name()
            )));
        }
        self.core.session.switch_camera();
        Ok(())
    }

    pub fn select_filter(&self, filter: FilterKind) {
        self.core.pipeline.select_filter(filter);
    }

    /// Advance to the next filter in the catalog and return it.
    pub fn next_filter(&self) -> FilterKind {
        let next = self.core.pipeline.selected_filter().next();
        self.core.pipeline.select_filter(next);
        next
    }

    pub fn selected_filter(&self) -> FilterKind {
        self.core.pipeline.selected_filter()
    }

    /// Make `index` the active slot. Only while idle.
    pub fn select_slot(&self, index: usize) -> Result<(), CaptureError> {
        let core = &self.core;
        let mut inner = core.inner.lock();
        core.ensure_open(&inner)?;
        inner.machine.select_slot(index)?;
        core.finish(inner);
        Ok(())
    }

    /// Put an external image into the active slot without a countdown.
    pub fn import_image(&self, image: RgbaImage) -> Result<usize, CaptureError> {
        let core = &self.core;
        let mut inner = core.inner.lock();
        core.ensure_open(&inner)?;

        let photo = CapturedPhoto::imported(image);
        let slot = inner.machine.import(photo.clone())?;
        log::info!("Imported image into slot {}", slot);
        core.finish_with(inner, vec![Notification::Filled { slot, photo }]);
        Ok(slot)
    }

    pub fn set_orientation(&self, orientation: DeviceOrientation) {
        self.core.session.set_orientation(orientation);
    }

    pub fn state(&self) -> SlotState {
        self.core.inner.lock().machine.state()
    }

    pub fn slots(&self) -> Vec<CaptureSlot> {
        self.core.inner.lock().machine.slots().to_vec()
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.core.inner.lock().machine.active_slot()
    }

    /// Every slot's photo in order, once the layout is complete.
    pub fn completed_photos(&self) -> Option<Vec<CapturedPhoto>> {
        self.core.inner.lock().machine.completed_photos()
    }

    pub fn session_snapshot(&self) -> SessionSnapshot {
        self.core.session.snapshot()
    }

    pub fn diagnostics(&self) -> SessionDiagnostics {
        let preview = self.core.pipeline.stats();
        let captures = self.core.session.capture_counts();
        SessionDiagnostics {
            frames_received: preview.frames_received,
            frames_rendered: preview.frames_rendered,
            frames_dropped: preview.frames_dropped,
            render_fallbacks: preview.render_fallbacks,
            captures_requested: captures.requested,
            captures_completed: captures.completed,
            captures_empty: captures.empty,
        }
    }

    /// Still captures issued but not yet resolved.
    pub fn captures_in_flight(&self) -> usize {
        self.core.session.in_flight()
    }

    /// Dismiss the screen: cancel any countdown, stop the camera and the
    /// preview. A capture already issued runs to completion and its result
    /// is discarded. Idempotent.
    pub fn shutdown(&self) {
        let core = &self.core;
        {
            let mut inner = core.inner.lock();
            if inner.shut_down {
                return;
            }
            inner.shut_down = true;
            if let Some(mut countdown) = inner.countdown.take() {
                countdown.cancel();
            }
            if inner.machine.cancel().is_ok() {
                inner.machine.take_transitions();
            }
        }
        // Not under the booth lock: session teardown fires pending completions.
        core.session.shutdown();
        core.pipeline.stop();
        log::info!("Booth shut down");
    }
}

impl Drop for BoothController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl BoothCore {
    fn ensure_open(&self, inner: &BoothInner) -> Result<(), CaptureError> {
        if inner.shut_down {
            Err(CaptureError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn begin_countdown(self: &Arc<Self>, inner: &mut BoothInner) -> Result<(), CaptureError> {
        inner.generation += 1;
        let weak = Arc::downgrade(self);
        let countdown = Countdown::start(
            inner.generation,
            self.config.tick_interval(),
            self.config.countdown_secs,
            move |generation| {
                if let Some(core) = weak.upgrade() {
                    core.on_tick(generation);
                }
            },
        )?;
        inner.countdown = Some(countdown);
        Ok(())
    }

    fn on_tick(self: &Arc<Self>, generation: u64) {
        let mut inner = self.inner.lock();
        let live = inner.countdown.as_ref().map(Countdown::generation);
        if inner.shut_down || live != Some(generation) || !inner.machine.state().is_counting_down() {
            log::debug!("Ignoring stale countdown tick {}", generation);
            return;
        }

        let remaining = match inner.machine.tick() {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Countdown tick rejected: {}", e);
                return;
            }
        };
        let slot = inner.machine.active_slot().unwrap_or_default();
        log::info!("Countdown for slot {}: {}", slot, remaining);

        let mut capture = None;
        if remaining == 0 {
            inner.countdown = None;
            match inner.machine.expire() {
                Ok(slot) => capture = Some(slot),
                Err(e) => log::warn!("Countdown expiry rejected: {}", e),
            }
        }
        self.finish_with(inner, vec![Notification::Tick { slot, remaining }]);

        // Issued with the lock released: a closed session resolves the
        // completion inline.
        if let Some(slot) = capture {
            self.request_capture(slot);
        }
    }

    fn request_capture(self: &Arc<Self>, slot: usize) {
        log::info!("Capturing slot {}", slot);
        let weak: Weak<BoothCore> = Arc::downgrade(self);
        self.session.capture_photo(
            self.config.flash_mode,
            Box::new(move |photo| match weak.upgrade() {
                Some(core) => core.on_capture_resolved(photo),
                None => log::debug!("Capture for slot {} finished after teardown", slot),
            }),
        );
    }

    /// Runs on the session thread when a still capture completes.
    fn on_capture_resolved(self: &Arc<Self>, photo: Option<CapturedPhoto>) {
        let mut inner = self.inner.lock();
        if inner.shut_down || !inner.machine.state().is_capturing() {
            log::debug!("Discarding capture result; booth is no longer capturing");
            return;
        }

        let filled = photo.clone();
        let resolution = match inner.machine.resolve_capture(photo) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Capture result rejected: {}", e);
                return;
            }
        };

        let mut notifications = Vec::new();
        match filled {
            Some(photo) => {
                log::info!("Slot {} filled", resolution.slot);
                notifications.push(Notification::Filled {
                    slot: resolution.slot,
                    photo,
                });
            }
            None => {
                log::warn!("Capture for slot {} came back empty", resolution.slot);
                notifications.push(Notification::Empty {
                    slot: resolution.slot,
                });
            }
        }

        if resolution.next.is_counting_down() {
            if let Err(e) = self.begin_countdown(&mut inner) {
                log::error!("Could not start next countdown: {}", e);
                let _ = inner.machine.cancel();
            }
        } else {
            inner.countdown = None;
        }
        if resolution.next.is_terminal() {
            log::info!("All {} slot(s) filled", inner.machine.slot_count());
        }

        self.finish_with(inner, notifications);
    }

    /// Release the lock and deliver queued state transitions.
    fn finish(&self, inner: parking_lot::MutexGuard<'_, BoothInner>) {
        self.finish_with(inner, Vec::new());
    }

    fn finish_with(&self, mut inner: parking_lot::MutexGuard<'_, BoothInner>, mut leading: Vec<Notification>) {
        leading.extend(inner.machine.take_transitions().into_iter().map(Notification::State));
        self.sync_preview(&inner);
        drop(inner);
        self.dispatch(leading);
    }

    fn sync_preview(&self, inner: &BoothInner) {
        self.pipeline.set_preview_slot(inner.machine.preview_slot());
    }

    fn dispatch(&self, notifications: Vec<Notification>) {
        let Some(delegate) = &self.delegate else {
            return;
        };
        for notification in notifications {
            match notification {
                Notification::State(state) => delegate.on_state_changed(&state),
                Notification::Tick { slot, remaining } => delegate.on_countdown_tick(slot, remaining),
                Notification::Filled { slot, photo } => delegate.on_slot_filled(slot, &photo),
                Notification::Empty { slot } => delegate.on_capture_empty(slot),
            }
        }
    }
}

/// Forward committed session snapshots to the delegate, reporting each new
/// session error once.
fn session_observer(delegate: Arc<dyn BoothDelegate>) -> SessionObserver {
    let last_error: Mutex<Option<CaptureError>> = Mutex::new(None);
    Arc::new(move |snapshot: &SessionSnapshot| {
        delegate.on_session_changed(snapshot);
        let changed = {
            let mut last = last_error.lock();
            let changed = *last != snapshot.last_error;
            last.clone_from(&snapshot.last_error);
            changed
        };
        if changed {
            if let Some(error) = &snapshot.last_error {
                delegate.on_error(error);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::camera_models::{AuthorizationStatus, CameraPosition};
    use crate::models::photo::PhotoSource;
    use crate::simulator::synthetic_camera::SyntheticCamera;
    use crate::test_support::{
        release_held, wait_until, BoothEvent, MockBackend, MockState, RecordingDelegate, RecordingSurface,
        StillMode,
    };
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    fn config(countdown_secs: u32, tick_interval_ms: u64) -> BoothConfiguration {
        BoothConfiguration {
            countdown_secs,
            tick_interval_ms,
            ..BoothConfiguration::default()
        }
    }

    fn make_booth(
        poses: usize,
        config: BoothConfiguration,
        mode: StillMode,
    ) -> (BoothController, Arc<Mutex<MockState>>, Arc<RecordingDelegate>) {
        let (backend, state) = MockBackend::new();
        state.lock().still_mode = mode;
        let (surface, _log) = RecordingSurface::new((32, 24));
        let delegate = Arc::new(RecordingDelegate::default());
        let controller = BoothController::new(
            backend,
            surface,
            &Layout::new("test", poses),
            config,
            Some(delegate.clone() as Arc<dyn BoothDelegate>),
        )
        .unwrap();
        (controller, state, delegate)
    }

    fn events(delegate: &RecordingDelegate) -> Vec<BoothEvent> {
        delegate.events.lock().clone()
    }

    #[test]
    fn rejects_invalid_setup() {
        let (backend, _) = MockBackend::new();
        let (surface, _) = RecordingSurface::new((8, 8));
        let err = BoothController::new(backend, surface, &Layout::new("none", 0), BoothConfiguration::default(), None);
        assert!(matches!(err, Err(CaptureError::ConfigurationFailed(_))));

        let (backend, _) = MockBackend::new();
        let (surface, _) = RecordingSurface::new((8, 8));
        let err = BoothController::new(backend, surface, &Layout::new("one", 1), config(0, 10), None);
        assert!(matches!(err, Err(CaptureError::ConfigurationFailed(_))));
    }

    #[test]
    fn fills_every_slot_in_order() {
        let (booth, state, delegate) = make_booth(3, config(2, 5), StillMode::Succeed);

        assert_eq!(booth.start_capture().unwrap(), 0);
        assert!(wait_until(WAIT, || booth.state().is_terminal()));

        let photos = booth.completed_photos().unwrap();
        assert_eq!(photos.len(), 3);
        assert_eq!(state.lock().requests.len(), 3);

        let filled: Vec<_> = events(&delegate)
            .into_iter()
            .filter_map(|e| match e {
                BoothEvent::Filled(i) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(filled, vec![0, 1, 2]);

        // Counters are bumped right after the completion runs.
        assert!(wait_until(WAIT, || booth.diagnostics().captures_completed == 3));
        let diagnostics = booth.diagnostics();
        assert_eq!(diagnostics.captures_requested, 3);
        assert_eq!(diagnostics.captures_empty, 0);
        assert!(booth.start_capture().is_err());
    }

    #[test]
    fn countdown_reports_every_tick() {
        let (booth, _state, delegate) = make_booth(1, config(3, 5), StillMode::Succeed);
        booth.start_capture().unwrap();
        assert!(wait_until(WAIT, || booth.state().is_terminal()));

        let ticks: Vec<_> = events(&delegate)
            .into_iter()
            .filter(|e| matches!(e, BoothEvent::Tick(..)))
            .collect();
        assert_eq!(
            ticks,
            vec![BoothEvent::Tick(0, 2), BoothEvent::Tick(0, 1), BoothEvent::Tick(0, 0)]
        );
    }

    #[test]
    fn cancel_during_auto_countdown_keeps_first_photo() {
        let (booth, state, _delegate) = make_booth(3, config(2, 100), StillMode::Hold);

        booth.start_capture().unwrap();
        assert!(wait_until(WAIT, || state.lock().held.len() == 1));
        assert_eq!(booth.state(), SlotState::Capturing { slot: 0 });
        assert!(booth.cancel().is_err());

        release_held(&state);
        assert!(wait_until(WAIT, || booth.state().is_counting_down()));
        assert_eq!(booth.active_slot(), Some(1));

        booth.cancel().unwrap();
        assert_eq!(booth.state(), SlotState::Idle { slot: 1 });

        // Give a stale tick the chance to fire.
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(booth.state(), SlotState::Idle { slot: 1 });
        assert_eq!(state.lock().requests.len(), 1);

        let slots = booth.slots();
        assert!(slots[0].is_filled());
        assert!(!slots[1].is_filled());
        assert!(!slots[2].is_filled());
    }

    #[test]
    fn empty_capture_leaves_slot_unfilled_and_moves_on() {
        let (booth, state, delegate) = make_booth(2, config(1, 5), StillMode::Fail);

        booth.start_capture().unwrap();
        assert!(wait_until(WAIT, || events(&delegate).contains(&BoothEvent::Empty(1))));

        let evs = events(&delegate);
        assert!(evs.contains(&BoothEvent::Empty(0)));
        assert!(!evs.iter().any(|e| matches!(e, BoothEvent::Filled(_))));
        assert_eq!(booth.state(), SlotState::Idle { slot: 0 });
        assert!(booth.slots().iter().all(|s| !s.is_filled()));
        assert_eq!(state.lock().requests.len(), 2);
        assert!(wait_until(WAIT, || booth.diagnostics().captures_empty == 2));
    }

    #[test]
    fn import_fills_slot_without_countdown() {
        let (booth, state, delegate) = make_booth(2, config(5, 1000), StillMode::Succeed);

        assert_eq!(booth.import_image(RgbaImage::new(4, 4)).unwrap(), 0);
        assert_eq!(booth.state(), SlotState::Idle { slot: 1 });
        assert_eq!(booth.core.pipeline.preview_slot(), Some(1));
        assert!(state.lock().requests.is_empty());
        assert!(!events(&delegate).iter().any(|e| matches!(e, BoothEvent::Tick(..))));

        booth.select_slot(0).unwrap();
        assert!(matches!(
            booth.import_image(RgbaImage::new(4, 4)),
            Err(CaptureError::InvalidTransition(_))
        ));
        assert!(booth.start_capture().is_err());
        assert_eq!(booth.core.pipeline.preview_slot(), None);

        booth.select_slot(1).unwrap();
        booth.import_image(RgbaImage::new(4, 4)).unwrap();
        assert_eq!(booth.state(), SlotState::Done);
        assert!(booth.completed_photos().is_some());
    }

    #[test]
    fn select_slot_checks_range() {
        let (booth, _state, _delegate) = make_booth(2, config(5, 1000), StillMode::Succeed);
        assert_eq!(
            booth.select_slot(2),
            Err(CaptureError::SlotOutOfRange { index: 2, count: 2 })
        );
        booth.select_slot(1).unwrap();
        assert_eq!(booth.active_slot(), Some(1));
    }

    #[test]
    fn camera_switch_refused_while_counting_down() {
        let (booth, _state, _delegate) = make_booth(2, config(5, 1000), StillMode::Succeed);

        booth.start_capture().unwrap();
        assert!(matches!(booth.switch_camera(), Err(CaptureError::InvalidTransition(_))));

        booth.cancel().unwrap();
        booth.switch_camera().unwrap();
        booth.core.session.flush().unwrap();
        assert_eq!(booth.session_snapshot().position, CameraPosition::Back);
    }

    #[test]
    fn completion_after_shutdown_is_discarded() {
        let (booth, state, delegate) = make_booth(2, config(1, 5), StillMode::Hold);

        booth.start_capture().unwrap();
        assert!(wait_until(WAIT, || state.lock().held.len() == 1));

        booth.shutdown();
        release_held(&state);
        std::thread::sleep(Duration::from_millis(50));

        let evs = events(&delegate);
        assert!(!evs.iter().any(|e| matches!(e, BoothEvent::Filled(_) | BoothEvent::Empty(_))));
        assert!(booth.slots().iter().all(|s| !s.is_filled()));
        assert_eq!(booth.start_capture(), Err(CaptureError::SessionClosed));
        assert_eq!(booth.captures_in_flight(), 0);

        // Second shutdown and drop are no-ops.
        booth.shutdown();
    }

    #[test]
    fn permission_denied_is_reported_once() {
        let (backend, state) = MockBackend::new();
        {
            let mut s = state.lock();
            s.authorization = AuthorizationStatus::NotDetermined;
            s.grant_on_request = AuthorizationStatus::Denied;
        }
        let (surface, _) = RecordingSurface::new((8, 8));
        let delegate = Arc::new(RecordingDelegate::default());
        let booth = BoothController::new(
            backend,
            surface,
            &Layout::new("denied", 1),
            config(1, 5),
            Some(delegate.clone() as Arc<dyn BoothDelegate>),
        )
        .unwrap();
        booth.core.session.flush().unwrap();

        let errors: Vec<_> = events(&delegate)
            .into_iter()
            .filter(|e| matches!(e, BoothEvent::Error(_)))
            .collect();
        assert_eq!(errors, vec![BoothEvent::Error(CaptureError::PermissionDenied)]);
        assert_eq!(
            booth.session_snapshot().last_error,
            Some(CaptureError::PermissionDenied)
        );
        assert!(!booth.session_snapshot().running);
    }

    #[test]
    fn synthetic_camera_fills_layout() {
        let (surface, _log) = RecordingSurface::new((32, 24));
        let delegate = Arc::new(RecordingDelegate::default());
        let booth = BoothController::new(
            SyntheticCamera::default(),
            surface,
            &Layout::new("simulated", 2),
            config(1, 5),
            Some(delegate.clone() as Arc<dyn BoothDelegate>),
        )
        .unwrap();
        booth.core.session.flush().unwrap();
        assert!(booth.session_snapshot().running);
        assert!(booth.session_snapshot().last_error.is_none());

        booth.start_capture().unwrap();
        assert!(wait_until(WAIT, || booth.state().is_terminal()));

        let photos = booth.completed_photos().unwrap();
        assert_eq!(photos.len(), 2);
        for photo in &photos {
            assert_eq!(photo.image.dimensions(), (640, 480));
            assert_eq!(
                photo.source,
                PhotoSource::Camera {
                    position: CameraPosition::Front
                }
            );
        }
        let filled: Vec<_> = events(&delegate)
            .into_iter()
            .filter(|e| matches!(e, BoothEvent::Filled(_) | BoothEvent::Empty(_)))
            .collect();
        assert_eq!(filled, vec![BoothEvent::Filled(0), BoothEvent::Filled(1)]);
    }

    #[test]
    fn synthetic_camera_switch_stops_mirroring_preview() {
        let (surface, log) = RecordingSurface::new((32, 24));
        let booth = BoothController::new(
            SyntheticCamera::default(),
            surface,
            &Layout::new("simulated", 1),
            config(5, 1000),
            None,
        )
        .unwrap();

        assert!(wait_until(WAIT, || log.lock().accelerated.len() >= 2));
        assert!(log.lock().accelerated.iter().all(|(_, t)| t.mirror));

        booth.switch_camera().unwrap();
        booth.core.session.flush().unwrap();
        assert_eq!(booth.session_snapshot().position, CameraPosition::Back);
        assert!(booth.session_snapshot().running);

        // At most one frame rendering and one queued can predate the switch.
        log.lock().accelerated.clear();
        assert!(wait_until(WAIT, || log.lock().accelerated.len() >= 3));
        let log = log.lock();
        assert!(log.accelerated.iter().skip(2).all(|(_, t)| !t.mirror));
        assert!(!log.accelerated[log.accelerated.len() - 1].1.mirror);
    }

    #[test]
    fn next_filter_cycles_through_catalog() {
        let (booth, _state, _delegate) = make_booth(1, config(5, 1000), StillMode::Succeed);
        assert_eq!(booth.selected_filter(), FilterKind::None);
        let next = booth.next_filter();
        assert_eq!(next, FilterKind::None.next());
        assert_eq!(booth.selected_filter(), next);

        booth.select_filter(FilterKind::Sepia);
        assert_eq!(booth.selected_filter(), FilterKind::Sepia);
    }
}
