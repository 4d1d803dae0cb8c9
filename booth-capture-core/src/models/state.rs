/// Capture slot state machine.
///
/// State transitions:
/// ```text
/// Idle(i) → CountingDown(i, n) → … → CountingDown(i, 0) → Capturing(i)
///    ↑             │ cancel                                   │ resolved
///    └─────────────┘                                          ↓
///                         CountingDown(j, n) ← Advancing → Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle { slot: usize },
    CountingDown { slot: usize, remaining: u32 },
    Capturing { slot: usize },
    Advancing,
    Done,
}

impl SlotState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle { .. })
    }

    pub fn is_counting_down(&self) -> bool {
        matches!(self, Self::CountingDown { .. })
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The slot this state is bound to, if any.
    pub fn slot(&self) -> Option<usize> {
        match self {
            Self::Idle { slot } | Self::CountingDown { slot, .. } | Self::Capturing { slot } => {
                Some(*slot)
            }
            Self::Advancing | Self::Done => None,
        }
    }

    /// Seconds left on the countdown, if one is running.
    pub fn remaining(&self) -> Option<u32> {
        match self {
            Self::CountingDown { remaining, .. } => Some(*remaining),
            _ => None,
        }
    }

    /// Short lowercase name, used in logs and by hosts that serialize state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "idle",
            Self::CountingDown { .. } => "counting_down",
            Self::Capturing { .. } => "capturing",
            Self::Advancing => "advancing",
            Self::Done => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_accessor() {
        assert_eq!(SlotState::Idle { slot: 2 }.slot(), Some(2));
        assert_eq!(SlotState::CountingDown { slot: 1, remaining: 3 }.slot(), Some(1));
        assert_eq!(SlotState::Capturing { slot: 0 }.slot(), Some(0));
        assert_eq!(SlotState::Advancing.slot(), None);
        assert_eq!(SlotState::Done.slot(), None);
    }

    #[test]
    fn predicates() {
        assert!(SlotState::Idle { slot: 0 }.is_idle());
        assert!(SlotState::CountingDown { slot: 0, remaining: 5 }.is_counting_down());
        assert!(SlotState::Capturing { slot: 0 }.is_capturing());
        assert!(SlotState::Done.is_terminal());
        assert!(!SlotState::Advancing.is_terminal());
        assert_eq!(SlotState::CountingDown { slot: 0, remaining: 4 }.remaining(), Some(4));
        assert_eq!(SlotState::Idle { slot: 0 }.remaining(), None);
    }
}
