use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::camera_models::CameraPosition;

/// Where a slot image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PhotoSource {
    Camera { position: CameraPosition },
    Imported,
}

/// A still image held by a capture slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPhoto {
    pub id: Uuid,
    pub image: RgbaImage,
    pub captured_at: DateTime<Utc>,
    pub source: PhotoSource,
}

impl CapturedPhoto {
    pub fn from_camera(image: RgbaImage, position: CameraPosition) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            captured_at: Utc::now(),
            source: PhotoSource::Camera { position },
        }
    }

    pub fn imported(image: RgbaImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            captured_at: Utc::now(),
            source: PhotoSource::Imported,
        }
    }

    pub fn metadata(&self) -> PhotoMetadata {
        PhotoMetadata {
            id: self.id.to_string(),
            width: self.image.width(),
            height: self.image.height(),
            source: self.source,
            captured_at: self.captured_at.to_rfc3339(),
        }
    }
}

/// Serializable description of a photo, for hosts that hand results on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub source: PhotoSource,
    pub captured_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_reflects_image() {
        let photo = CapturedPhoto::from_camera(RgbaImage::new(8, 6), CameraPosition::Back);
        let meta = photo.metadata();
        assert_eq!(meta.width, 8);
        assert_eq!(meta.height, 6);
        assert_eq!(meta.source, PhotoSource::Camera { position: CameraPosition::Back });

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["source"]["kind"], "camera");
        assert_eq!(json["source"]["position"], "back");
    }
}
