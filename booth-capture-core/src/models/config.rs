use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::camera_models::{CameraPosition, FlashMode};

/// Configuration for a booth capture screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfiguration {
    /// Countdown length in ticks (default: 5).
    pub countdown_secs: u32,

    /// Time between countdown ticks in milliseconds (default: 1000).
    pub tick_interval_ms: u64,

    /// Upper bound on preview redraws per second (default: 60).
    pub max_refresh_rate: u32,

    /// Camera to open first (default: front).
    pub preferred_position: CameraPosition,

    /// Flash mode used for every still (default: off).
    pub flash_mode: FlashMode,

    /// Start the next empty slot's countdown after a capture resolves (default: true).
    pub auto_advance: bool,
}

impl BoothConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.countdown_secs == 0 {
            return Err("countdown must be at least one second".into());
        }
        if self.tick_interval_ms == 0 {
            return Err("tick interval must be positive".into());
        }
        if self.max_refresh_rate == 0 {
            return Err("max refresh rate must be positive".into());
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Shortest allowed gap between two preview redraws.
    pub fn min_frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.max_refresh_rate.max(1)
    }
}

impl Default for BoothConfiguration {
    fn default() -> Self {
        Self {
            countdown_secs: 5,
            tick_interval_ms: 1000,
            max_refresh_rate: 60,
            preferred_position: CameraPosition::Front,
            flash_mode: FlashMode::Off,
            auto_advance: true,
        }
    }
}
