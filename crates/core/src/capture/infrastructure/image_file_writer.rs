use std::path::Path;

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Writes an RGB frame with the `image` crate, creating parent directories.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), CaptureError> {
        if frame.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }
        if frame.channels() != 3 {
            return Err(CaptureError::UnsupportedChannels(frame.channels()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CaptureError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or(CaptureError::EmptyFrame)?;
        img.save(path).map_err(|source| CaptureError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}
