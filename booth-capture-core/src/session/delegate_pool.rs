use std::collections::HashMap;
use std::time::Instant;

use crate::models::camera_models::CameraPosition;
use crate::models::error::CaptureError;
use crate::models::photo::CapturedPhoto;

/// Identifies one outstanding still capture.
pub type RequestId = u64;

/// Caller completion for a still capture. `None` means the capture failed
/// or its data could not be decoded.
pub type PhotoCompletion = Box<dyn FnOnce(Option<CapturedPhoto>) + Send + 'static>;

struct PendingCapture {
    completion: PhotoCompletion,
    position: CameraPosition,
    issued_at: Instant,
}

/// How a pending request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The completion fired with a photo.
    Photo,
    /// The completion fired with an empty result.
    Empty,
    /// No request with that id was in flight; nothing fired.
    Unknown,
}

/// In-flight still-capture requests, keyed by request id.
///
/// Keeps each caller completion alive from the moment the hardware call is
/// issued until the hardware reports back, then fires it and drops it.
/// Owned by the session thread; never shared.
#[derive(Default)]
pub struct PhotoCaptureDelegatePool {
    next_id: RequestId,
    in_flight: HashMap<RequestId, PendingCapture>,
}

impl PhotoCaptureDelegatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain `completion` and return the id the hardware result must carry.
    pub fn register(&mut self, position: CameraPosition, completion: PhotoCompletion) -> RequestId {
        self.next_id += 1;
        let id = self.next_id;
        self.in_flight.insert(
            id,
            PendingCapture {
                completion,
                position,
                issued_at: Instant::now(),
            },
        );
        id
    }

    /// Decode the hardware result for `id`, fire its completion, and forget it.
    pub fn resolve(&mut self, id: RequestId, result: Result<Vec<u8>, CaptureError>) -> Resolution {
        let Some(pending) = self.in_flight.remove(&id) else {
            log::debug!("Ignoring result for unknown capture request {}", id);
            return Resolution::Unknown;
        };

        let photo = match result {
            Ok(bytes) => match decode_still(&bytes) {
                Ok(image) => Some(CapturedPhoto::from_camera(image, pending.position)),
                Err(e) => {
                    log::warn!("Capture request {} returned undecodable data: {}", id, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Capture request {} failed: {}", id, e);
                None
            }
        };

        log::debug!(
            "Capture request {} resolved after {:?} ({})",
            id,
            pending.issued_at.elapsed(),
            if photo.is_some() { "photo" } else { "empty" }
        );

        let resolution = if photo.is_some() {
            Resolution::Photo
        } else {
            Resolution::Empty
        };
        (pending.completion)(photo);
        resolution
    }

    /// Resolve every outstanding request as empty. Used on teardown.
    pub fn drain(&mut self) -> usize {
        let pending: Vec<_> = self.in_flight.drain().collect();
        let count = pending.len();
        for (id, capture) in pending {
            log::debug!("Abandoning capture request {} on teardown", id);
            (capture.completion)(None);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

fn decode_still(bytes: &[u8]) -> Result<image::RgbaImage, CaptureError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| CaptureError::DecodeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::placeholder::{encode_png, placeholder_panel};
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Outcomes = Arc<Mutex<Vec<(u32, Option<(u32, u32)>)>>>;

    fn completion(tag: u32, outcomes: &Outcomes) -> PhotoCompletion {
        let outcomes = Arc::clone(outcomes);
        Box::new(move |photo| {
            outcomes
                .lock()
                .push((tag, photo.map(|p| p.image.dimensions())));
        })
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode_png(&placeholder_panel(width, height, 0, "")).unwrap()
    }

    #[test]
    fn successful_capture_fires_once_and_is_removed() {
        let outcomes = Outcomes::default();
        let mut pool = PhotoCaptureDelegatePool::new();

        let id = pool.register(CameraPosition::Front, completion(1, &outcomes));
        assert_eq!(pool.len(), 1);

        assert_eq!(pool.resolve(id, Ok(png(16, 9))), Resolution::Photo);
        assert!(pool.is_empty());
        assert_eq!(*outcomes.lock(), vec![(1, Some((16, 9)))]);

        // A duplicate hardware callback must not fire the completion again.
        assert_eq!(pool.resolve(id, Ok(png(16, 9))), Resolution::Unknown);
        assert_eq!(outcomes.lock().len(), 1);
    }

    #[test]
    fn failures_resolve_empty() {
        let outcomes = Outcomes::default();
        let mut pool = PhotoCaptureDelegatePool::new();

        let bad_data = pool.register(CameraPosition::Back, completion(1, &outcomes));
        let hw_error = pool.register(CameraPosition::Back, completion(2, &outcomes));

        assert_eq!(pool.resolve(bad_data, Ok(vec![1, 2, 3])), Resolution::Empty);
        assert_eq!(
            pool.resolve(hw_error, Err(CaptureError::CaptureFailed("sensor".into()))),
            Resolution::Empty
        );
        assert!(pool.is_empty());
        assert_eq!(*outcomes.lock(), vec![(1, None), (2, None)]);
    }

    #[test]
    fn overlapping_requests_return_to_baseline() {
        let outcomes = Outcomes::default();
        let mut pool = PhotoCaptureDelegatePool::new();

        let ids: Vec<_> = (0..5)
            .map(|tag| pool.register(CameraPosition::Front, completion(tag, &outcomes)))
            .collect();
        assert_eq!(pool.len(), 5);

        // Resolve out of order with a mix of outcomes.
        pool.resolve(ids[3], Ok(png(4, 4)));
        pool.resolve(ids[0], Err(CaptureError::Unknown("x".into())));
        pool.resolve(ids[4], Ok(Vec::new()));
        pool.resolve(ids[1], Ok(png(2, 2)));
        pool.resolve(ids[2], Ok(png(3, 3)));

        assert_eq!(pool.len(), 0);
        assert_eq!(outcomes.lock().len(), 5);
    }

    #[test]
    fn drain_fires_every_pending_completion() {
        let outcomes = Outcomes::default();
        let mut pool = PhotoCaptureDelegatePool::new();
        pool.register(CameraPosition::Front, completion(1, &outcomes));
        pool.register(CameraPosition::Front, completion(2, &outcomes));

        assert_eq!(pool.drain(), 2);
        assert!(pool.is_empty());
        let mut fired = outcomes.lock().clone();
        fired.sort();
        assert_eq!(fired, vec![(1, None), (2, None)]);
    }

    #[test]
    fn ids_are_unique() {
        let outcomes = Outcomes::default();
        let mut pool = PhotoCaptureDelegatePool::new();
        let a = pool.register(CameraPosition::Front, completion(1, &outcomes));
        pool.resolve(a, Ok(Vec::new()));
        let b = pool.register(CameraPosition::Front, completion(2, &outcomes));
        assert_ne!(a, b);
    }
}
