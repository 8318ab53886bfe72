use thiserror::Error;

use crate::detection::domain::landmark_set::LandmarkSet;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("landmark detector initialization failed: {0}")]
    Initialization(String),
    #[error("landmark detector not initialized")]
    NotInitialized,
    #[error("landmark detection failed: {0}")]
    Inference(String),
}

/// Domain interface for the face-landmark detector.
///
/// Returns at most one landmark set per frame (single-face mode).
/// Implementations may be stateful (e.g. video-mode tracking), hence `&mut self`.
pub trait LandmarkSource: Send {
    /// Loads models or opens the underlying engine. Called once before the
    /// first `detect`. Default: nothing to load.
    fn initialize(&mut self) -> Result<(), DetectionError> {
        Ok(())
    }

    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, DetectionError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
