use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::models::error::CaptureError;

/// Ticker for one countdown attempt.
///
/// Calls `on_tick(generation)` once per interval, `ticks` times, on its own
/// thread. Cancelling (or dropping) wakes the thread at once and no further
/// ticks fire from it. The thread is detached: a tick handler may itself
/// drop the `Countdown` that drives it. Handlers should still compare the
/// generation, since a tick already in progress can race a cancel.
pub struct Countdown {
    generation: u64,
    cancel: Option<mpsc::Sender<()>>,
}

impl Countdown {
    pub fn start<F>(generation: u64, interval: Duration, ticks: u32, on_tick: F) -> Result<Self, CaptureError>
    where
        F: Fn(u64) + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name(format!("booth-countdown-{}", generation))
            .spawn(move || {
                for _ in 0..ticks {
                    match cancel_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => on_tick(generation),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            log::debug!("Countdown {} cancelled", generation);
                            return;
                        }
                    }
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn countdown thread: {}", e)))?;

        log::info!("Countdown {} started ({} x {:?})", generation, ticks, interval);
        Ok(Self {
            generation,
            cancel: Some(cancel_tx),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&mut self) {
        // Dropping the sender disconnects the channel and wakes the ticker.
        self.cancel.take();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
