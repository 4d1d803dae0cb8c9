pub mod booth_delegate;
pub mod camera_backend;
pub mod render_surface;
