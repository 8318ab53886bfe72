use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::Frame;

/// Produces one still RGB frame on demand (a camera snapshot, a file).
pub trait StillSource: Send {
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}
