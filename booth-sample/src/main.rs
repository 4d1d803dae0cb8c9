//! Drives one multi-pose layout end to end without a UI.
//!
//! Usage: `booth-sample [poses]` (default 3). Build with `--features native`
//! to use the real camera instead of the synthetic one.

mod booth_state;

use std::time::Duration;

use booth_capture_core::{
    BoothConfiguration, BoothController, BoothDelegate, CaptureError, FilterKind, Layout, SoftwareSurface,
};

use booth_state::{ConsoleDelegate, LayoutSummary, SlotSummary};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("Booth sample failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CaptureError> {
    let poses = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(3);
    let layout = Layout::new("sample strip", poses);
    let config = BoothConfiguration {
        countdown_secs: 3,
        tick_interval_ms: 300,
        ..BoothConfiguration::default()
    };

    let (surface, preview) = SoftwareSurface::new(480, 360);
    let delegate = ConsoleDelegate::new();
    let booth = BoothController::new(
        camera()?,
        surface,
        &layout,
        config,
        Some(delegate.clone() as std::sync::Arc<dyn BoothDelegate>),
    )?;

    booth.select_filter(FilterKind::Warm);
    log::info!("Preview filter: {}", booth.selected_filter().display_name());

    booth.start_capture()?;
    let Some(final_state) = delegate.wait_until_settled(SETTLE_TIMEOUT) else {
        booth.shutdown();
        return Err(CaptureError::Unknown("layout did not settle in time".into()));
    };

    let summary = LayoutSummary {
        layout: layout.name.clone(),
        final_state: final_state.name().to_string(),
        slots: booth.slots().iter().map(SlotSummary::from).collect(),
        diagnostics: booth.diagnostics(),
        previews_presented: preview.presented(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    };
    booth.shutdown();

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Could not serialize summary: {}", e),
    }
    Ok(())
}

#[cfg(feature = "native")]
fn camera() -> Result<booth_capture_native::NativeCamera, CaptureError> {
    booth_capture_native::NativeCamera::discover()
}

#[cfg(not(feature = "native"))]
fn camera() -> Result<booth_capture_core::SyntheticCamera, CaptureError> {
    Ok(booth_capture_core::SyntheticCamera::default())
}
