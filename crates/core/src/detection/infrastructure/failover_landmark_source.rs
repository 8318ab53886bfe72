use crate::detection::domain::landmark_set::LandmarkSet;
use crate::detection::domain::landmark_source::{DetectionError, LandmarkSource};
use crate::shared::frame::Frame;

/// Decorator that prefers a primary detector and switches to a secondary one
/// when the primary fails to initialize.
///
/// The choice is made once, at initialization. Per-frame detection errors
/// are passed through unchanged; the session treats them as "no face".
pub struct FailoverLandmarkSource {
    primary: Box<dyn LandmarkSource>,
    secondary: Box<dyn LandmarkSource>,
    active: Option<Active>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Active {
    Primary,
    Secondary,
}

impl FailoverLandmarkSource {
    pub fn new(primary: Box<dyn LandmarkSource>, secondary: Box<dyn LandmarkSource>) -> Self {
        Self {
            primary,
            secondary,
            active: None,
        }
    }

    /// Name of the detector in use, or `None` before initialization.
    pub fn active_name(&self) -> Option<&str> {
        match self.active? {
            Active::Primary => Some(self.primary.name()),
            Active::Secondary => Some(self.secondary.name()),
        }
    }
}

impl LandmarkSource for FailoverLandmarkSource {
    fn initialize(&mut self) -> Result<(), DetectionError> {
        match self.primary.initialize() {
            Ok(()) => {
                self.active = Some(Active::Primary);
                return Ok(());
            }
            Err(e) => log::warn!(
                "Primary detector '{}' unavailable ({e}); trying '{}'",
                self.primary.name(),
                self.secondary.name()
            ),
        }

        match self.secondary.initialize() {
            Ok(()) => {
                self.active = Some(Active::Secondary);
                Ok(())
            }
            Err(e) => Err(DetectionError::Initialization(format!(
                "both detectors failed; last error: {e}"
            ))),
        }
    }

    fn detect(&mut self, frame: &Frame) -> Result<Option<LandmarkSet>, DetectionError> {
        match self.active {
            Some(Active::Primary) => self.primary.detect(frame),
            Some(Active::Secondary) => self.secondary.detect(frame),
            None => Err(DetectionError::NotInitialized),
        }
    }

    fn name(&self) -> &str {
        self.active_name().unwrap_or("failover")
    }
}
