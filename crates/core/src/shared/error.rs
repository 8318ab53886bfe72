use thiserror::Error;

/// Liveness-path error taxonomy.
///
/// `NoFaceDetected` and `LandmarksInvalid` are transient, per-frame
/// conditions. `ConsecutiveDegradationExceeded` switches the session to the
/// photo fallback. `DetectorInitializationFailed` puts the session in the
/// error phase. `StorageUnavailable` is reported but never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LivenessError {
    #[error("no face detected")]
    NoFaceDetected,
    #[error("landmarks invalid: yaw could not be estimated")]
    LandmarksInvalid,
    #[error("landmarks invalid for {frames} consecutive frames; photo fallback required")]
    ConsecutiveDegradationExceeded { frames: u32 },
    #[error("landmark detector failed to initialize: {0}")]
    DetectorInitializationFailed(String),
    #[error("progress storage unavailable: {0}")]
    StorageUnavailable(String),
}
