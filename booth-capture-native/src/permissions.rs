//! Camera access permission.
//!
//! macOS gates cameras behind a per-app consent prompt; other platforms
//! report access as granted once a device can be opened.

use std::sync::mpsc;
use std::time::Duration;

use booth_capture_core::models::camera_models::AuthorizationStatus;

/// How long to wait for the user to answer the system prompt.
const PROMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Current access state, without prompting.
pub fn authorization_status() -> AuthorizationStatus {
    if nokhwa::nokhwa_check() {
        AuthorizationStatus::Authorized
    } else {
        AuthorizationStatus::NotDetermined
    }
}

/// Show the system prompt and block until it is answered.
pub fn request_authorization() -> AuthorizationStatus {
    let (tx, rx) = mpsc::channel();
    nokhwa::nokhwa_initialize(move |granted| {
        let _ = tx.send(granted);
    });

    match rx.recv_timeout(PROMPT_TIMEOUT) {
        Ok(true) => AuthorizationStatus::Authorized,
        Ok(false) => {
            log::warn!("Camera access denied by user");
            AuthorizationStatus::Denied
        }
        Err(_) => {
            log::warn!("Camera permission prompt did not answer");
            AuthorizationStatus::NotDetermined
        }
    }
}
