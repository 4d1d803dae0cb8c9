pub mod live_preview;
pub mod software_surface;
