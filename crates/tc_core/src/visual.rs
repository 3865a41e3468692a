//! Screen image and fog-of-war extraction.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::grid::Grid;
use crate::message::{ImagePayload, RgbImage};

/// Visual observation decoded from the latest frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisualState {
    /// Top-left corner of the screen in pixels. `[0, 0]` is the map's top-left.
    pub screen_position: [i32; 2],
    /// Walk-tile visibility levels.
    pub visibility: Grid<u8>,
    /// RGB screen buffer.
    pub image: RgbImage,
}

impl VisualState {
    /// Validate an image payload.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::MissingImage`] when there is no payload, or
    /// [`StateError::ImageSizeMismatch`] when a buffer disagrees with its
    /// declared size.
    pub fn decode(payload: Option<&ImagePayload>) -> Result<Self> {
        let payload = payload.ok_or(StateError::MissingImage)?;

        if !payload.visibility.is_consistent() {
            return Err(StateError::ImageSizeMismatch {
                what: "visibility",
                expected: payload.visibility.expected_len(),
                actual: payload.visibility.cells().len(),
            });
        }
        let expected = payload.image.expected_len();
        if payload.image.data.len() != expected || expected == 0 {
            return Err(StateError::ImageSizeMismatch {
                what: "image",
                expected,
                actual: payload.image.data.len(),
            });
        }

        Ok(Self {
            screen_position: payload.screen_position,
            visibility: payload.visibility.clone(),
            image: payload.image.clone(),
        })
    }

    /// `[width, height]` of the screen image.
    #[must_use]
    pub const fn image_size(&self) -> [u32; 2] {
        [self.image.width, self.image.height]
    }

    /// RGB triple at pixel `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.image.width || y >= self.image.height {
            return None;
        }
        let idx = 3 * ((y as usize) * (self.image.width as usize) + (x as usize));
        let rgb = self.image.data.get(idx..idx + 3)?;
        Some([rgb[0], rgb[1], rgb[2]])
    }
}
