use std::path::PathBuf;

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::still_source::StillSource;
use crate::shared::frame::Frame;

/// Serves a still image from disk, decoded to RGB with the `image` crate.
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StillSource for ImageFileSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let img = image::open(&self.path)
            .map_err(|source| CaptureError::Decode {
                path: self.path.clone(),
                source,
            })?
            .to_rgb8();
        let (width, height) = img.dimensions();
        Ok(Frame::new(img.into_raw(), width, height, 3, 0))
    }
}
