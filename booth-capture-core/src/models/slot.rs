use serde::{Deserialize, Serialize};

use super::photo::CapturedPhoto;

/// A multi-pose layout the user picked; one slot per pose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub name: String,
    pub poses: usize,
}

impl Layout {
    pub fn new(name: impl Into<String>, poses: usize) -> Self {
        Self {
            name: name.into(),
            poses,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.poses == 0 {
            return Err(format!("layout '{}' has no poses", self.name));
        }
        Ok(())
    }
}

/// One position in the layout awaiting an image.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSlot {
    pub index: usize,
    pub photo: Option<CapturedPhoto>,
}

impl CaptureSlot {
    pub fn empty(index: usize) -> Self {
        Self { index, photo: None }
    }

    pub fn is_filled(&self) -> bool {
        self.photo.is_some()
    }
}
