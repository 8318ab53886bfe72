use std::path::Path;

use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::Frame;

/// Writes a single frame to an image file. The format follows the
/// path's extension.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), CaptureError>;
}
