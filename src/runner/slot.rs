//! Latest published output image

use image::RgbImage;
use std::sync::Arc;

/// Holds the most recent output image and the job that produced it
///
/// Replacing the image drops the previous one once no reader still holds it.
#[derive(Debug, Default)]
pub struct OutputSlot {
    generation: u64,
    image: Option<Arc<RgbImage>>,
}

impl OutputSlot {
    /// Id of the job whose image is currently published, 0 if none
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image(&self) -> Option<Arc<RgbImage>> {
        self.image.clone()
    }

    /// Publish `image` if `generation` is newer than the current one
    pub fn publish(&mut self, generation: u64, image: Arc<RgbImage>) -> bool {
        if generation <= self.generation {
            return false;
        }
        self.generation = generation;
        self.image = Some(image);
        true
    }
}
