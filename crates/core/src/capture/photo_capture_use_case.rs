use std::path::Path;

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::image_writer::ImageWriter;
use crate::capture::domain::still_source::StillSource;
use crate::session::domain::phase::Phase;
use crate::shared::frame::Frame;

/// Photo fallback: grab one still and store it for manual review.
///
/// Only allowed once the live challenge was abandoned (the unsupported
/// phase), unless `force` is set. The still is mirrored by default so it
/// matches the selfie preview the user saw.
pub struct PhotoCaptureUseCase {
    source: Box<dyn StillSource>,
    writer: Box<dyn ImageWriter>,
    mirror: bool,
}

impl PhotoCaptureUseCase {
    pub fn new(source: Box<dyn StillSource>, writer: Box<dyn ImageWriter>) -> Self {
        Self {
            source,
            writer,
            mirror: true,
        }
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn execute(&mut self, phase: Phase, output_path: &Path, force: bool) -> Result<Frame, CaptureError> {
        if phase != Phase::Unsupported && !force {
            return Err(CaptureError::NotRequired(phase));
        }

        let frame = self.source.capture()?;
        if frame.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }
        let frame = if self.mirror { mirror(frame)? } else { frame };

        self.writer.write(output_path, &frame)?;
        log::info!(
            "Fallback photo {}x{} written to {}",
            frame.width(),
            frame.height(),
            output_path.display()
        );
        Ok(frame)
    }
}

fn mirror(frame: Frame) -> Result<Frame, CaptureError> {
    if frame.channels() != 3 {
        return Err(CaptureError::UnsupportedChannels(frame.channels()));
    }
    let (width, height, index) = (frame.width(), frame.height(), frame.index());
    let img = image::RgbImage::from_raw(width, height, frame.data().to_vec()).ok_or(CaptureError::EmptyFrame)?;
    let flipped = image::imageops::flip_horizontal(&img);
    Ok(Frame::new(flipped.into_raw(), width, height, 3, index).with_timestamp(frame.timestamp_ms()))
}
