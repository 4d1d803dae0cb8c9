//! # booth-capture-native
//!
//! Hardware camera backend for booth-capture-core, built on `nokhwa`.
//!
//! Provides:
//! - `NativeCamera`: `CameraBackend` over the platform camera API
//! - `permissions`: camera access check and prompt
//!
//! Everything is behind the `native` feature; without it the crate is empty
//! and hosts fall back to `SyntheticCamera`.
//!
//! ## Usage
//! ```ignore
//! use booth_capture_core::{BoothConfiguration, BoothController, Layout, SoftwareSurface};
//! use booth_capture_native::NativeCamera;
//!
//! let camera = NativeCamera::discover()?;
//! let (surface, preview) = SoftwareSurface::new(640, 480);
//! let booth = BoothController::new(camera, surface, &Layout::new("strip", 4), BoothConfiguration::default(), None)?;
//! ```

#[cfg(feature = "native")]
pub mod native_camera;
#[cfg(feature = "native")]
pub mod permissions;

#[cfg(feature = "native")]
pub use native_camera::NativeCamera;
