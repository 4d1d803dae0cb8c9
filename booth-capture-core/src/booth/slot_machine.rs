use crate::models::error::CaptureError;
use crate::models::photo::CapturedPhoto;
use crate::models::slot::CaptureSlot;
use crate::models::state::SlotState;

/// Synchronous capture-slot state machine.
///
/// Holds the slot array and the current `SlotState`; knows nothing about
/// threads, timers, or hardware. `BoothController` drives it from countdown
/// ticks and capture completions.
#[derive(Debug, Clone)]
pub struct SlotMachine {
    slots: Vec<CaptureSlot>,
    state: SlotState,
    countdown_secs: u32,
    auto_advance: bool,
    transitions: Vec<SlotState>,
}

/// What a resolved capture did to the slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureResolution {
    pub slot: usize,
    pub filled: bool,
    pub next: SlotState,
}

impl SlotMachine {
    pub fn new(slot_count: usize, countdown_secs: u32, auto_advance: bool) -> Result<Self, CaptureError> {
        if slot_count == 0 {
            return Err(CaptureError::ConfigurationFailed("layout needs at least one slot".into()));
        }
        if countdown_secs == 0 {
            return Err(CaptureError::ConfigurationFailed("countdown must be at least one second".into()));
        }
        Ok(Self {
            slots: (0..slot_count).map(CaptureSlot::empty).collect(),
            state: SlotState::Idle { slot: 0 },
            countdown_secs,
            auto_advance,
            transitions: Vec::new(),
        })
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn slots(&self) -> &[CaptureSlot] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn countdown_secs(&self) -> u32 {
        self.countdown_secs
    }

    /// The slot the state is bound to, filled or not.
    pub fn active_slot(&self) -> Option<usize> {
        self.state.slot()
    }

    /// The slot that should receive the live preview: the active slot, if
    /// it is still empty.
    pub fn preview_slot(&self) -> Option<usize> {
        self.active_slot().filter(|i| !self.slots[*i].is_filled())
    }

    /// Camera switches are only allowed when no countdown or capture runs.
    pub fn can_switch_camera(&self) -> bool {
        self.state.is_idle()
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_filled()).count()
    }

    /// All photos in slot order, once every slot is filled.
    pub fn completed_photos(&self) -> Option<Vec<CapturedPhoto>> {
        if !self.is_complete() {
            return None;
        }
        self.slots.iter().map(|s| s.photo.clone()).collect()
    }

    /// States entered since the last call, oldest first.
    pub fn take_transitions(&mut self) -> Vec<SlotState> {
        std::mem::take(&mut self.transitions)
    }

    /// `Idle(i) → CountingDown(i, n)` for an empty active slot.
    pub fn start(&mut self) -> Result<usize, CaptureError> {
        let SlotState::Idle { slot } = self.state else {
            return Err(self.invalid("start"));
        };
        if self.slots[slot].is_filled() {
            return Err(CaptureError::InvalidTransition(format!("slot {} is already filled", slot)));
        }
        self.set_state(SlotState::CountingDown {
            slot,
            remaining: self.countdown_secs,
        });
        Ok(slot)
    }

    /// One elapsed second. Returns the seconds left.
    pub fn tick(&mut self) -> Result<u32, CaptureError> {
        match self.state {
            SlotState::CountingDown { slot, remaining } if remaining > 0 => {
                let remaining = remaining - 1;
                self.set_state(SlotState::CountingDown { slot, remaining });
                Ok(remaining)
            }
            _ => Err(self.invalid("tick")),
        }
    }

    /// `CountingDown(i, 0) → Capturing(i)`.
    pub fn expire(&mut self) -> Result<usize, CaptureError> {
        match self.state {
            SlotState::CountingDown { slot, remaining: 0 } => {
                self.set_state(SlotState::Capturing { slot });
                Ok(slot)
            }
            _ => Err(self.invalid("expire")),
        }
    }

    /// Record the outcome of the capture for the capturing slot and advance.
    ///
    /// An empty result leaves the slot unfilled; it is not retried.
    pub fn resolve_capture(
        &mut self,
        photo: Option<CapturedPhoto>,
    ) -> Result<CaptureResolution, CaptureError> {
        let SlotState::Capturing { slot } = self.state else {
            return Err(self.invalid("resolve capture"));
        };
        let filled = photo.is_some();
        if let Some(photo) = photo {
            self.slots[slot].photo = Some(photo);
        }
        self.set_state(SlotState::Advancing);
        let next = self.advance(slot, self.auto_advance);
        Ok(CaptureResolution { slot, filled, next })
    }

    /// Fill the active slot with an imported image, skipping the countdown.
    pub fn import(&mut self, photo: CapturedPhoto) -> Result<usize, CaptureError> {
        let SlotState::Idle { slot } = self.state else {
            return Err(self.invalid("import"));
        };
        if self.slots[slot].is_filled() {
            return Err(CaptureError::InvalidTransition(format!("slot {} is already filled", slot)));
        }
        self.slots[slot].photo = Some(photo);
        self.set_state(SlotState::Advancing);
        self.advance(slot, false);
        Ok(slot)
    }

    /// Retarget the active slot. Only valid while idle.
    pub fn select_slot(&mut self, index: usize) -> Result<(), CaptureError> {
        if !self.state.is_idle() {
            return Err(self.invalid("select slot"));
        }
        if index >= self.slots.len() {
            return Err(CaptureError::SlotOutOfRange {
                index,
                count: self.slots.len(),
            });
        }
        if self.state != (SlotState::Idle { slot: index }) {
            self.set_state(SlotState::Idle { slot: index });
        }
        Ok(())
    }

    /// Abandon a countdown. Valid from `Idle` (no-op) and `CountingDown`.
    pub fn cancel(&mut self) -> Result<(), CaptureError> {
        match self.state {
            SlotState::Idle { .. } => Ok(()),
            SlotState::CountingDown { slot, .. } => {
                self.set_state(SlotState::Idle { slot });
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// Leave `Advancing` after `from` was handled: the next empty slot after
    /// it, else an earlier empty slot (without a countdown), else `Done`.
    fn advance(&mut self, from: usize, auto_continue: bool) -> SlotState {
        let next_after = (from + 1..self.slots.len()).find(|i| !self.slots[*i].is_filled());
        let next = match next_after {
            Some(slot) if auto_continue => SlotState::CountingDown {
                slot,
                remaining: self.countdown_secs,
            },
            Some(slot) => SlotState::Idle { slot },
            None => match self.slots.iter().position(|s| !s.is_filled()) {
                Some(slot) => SlotState::Idle { slot },
                None => SlotState::Done,
            },
        };
        self.set_state(next);
        next
    }

    fn set_state(&mut self, state: SlotState) {
        log::debug!("Slot state {:?} → {:?}", self.state, state);
        self.state = state;
        self.transitions.push(state);
    }

    fn invalid(&self, action: &str) -> CaptureError {
        CaptureError::InvalidTransition(format!("cannot {} while {}", action, self.state.name()))
    }
}
