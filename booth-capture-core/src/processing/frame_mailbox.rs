use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

struct Slot<T> {
    value: Option<T>,
    closed: bool,
    pushed: u64,
    dropped: u64,
}

/// Single-slot, latest-wins handoff between a producer and a consumer thread.
///
/// Overflow behavior: a push over an unconsumed value replaces it and counts
/// a drop, so the consumer always sees the newest value and never a backlog.
/// Share as `Arc<FrameMailbox<T>>`.
pub struct FrameMailbox<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> FrameMailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                closed: false,
                pushed: 0,
                dropped: 0,
            }),
            ready: Condvar::new(),
        }
    }

    /// Publish a value, replacing any unconsumed one.
    ///
    /// Returns `true` if an older value was discarded. Pushing to a closed
    /// mailbox is a no-op.
    pub fn push(&self, value: T) -> bool {
        let mut slot = self.slot.lock();
        if slot.closed {
            return false;
        }
        let replaced = slot.value.replace(value).is_some();
        slot.pushed += 1;
        if replaced {
            slot.dropped += 1;
        }
        drop(slot);
        self.ready.notify_one();
        replaced
    }

    /// Wait up to `timeout` for a value.
    ///
    /// Returns `None` on timeout or once the mailbox is closed.
    pub fn wait_take(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        loop {
            if slot.closed {
                return None;
            }
            if let Some(value) = slot.value.take() {
                return Some(value);
            }
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot.value.take();
            }
        }
    }

    /// Close the mailbox, discarding any pending value and waking waiters.
    pub fn close(&self) {
        let mut slot = self.slot.lock();
        slot.closed = true;
        slot.value = None;
        drop(slot);
        self.ready.notify_all();
    }

    /// Total values pushed since creation.
    pub fn pushed(&self) -> u64 {
        self.slot.lock().pushed
    }

    /// Values replaced before the consumer took them.
    pub fn dropped(&self) -> u64 {
        self.slot.lock().dropped
    }
}

impl<T> Default for FrameMailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
