use crate::shared::device::DeviceClass;
use crate::shared::error::LivenessError;

/// What the detector and estimator made of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameQuality {
    /// No face found (or the detector errored).
    NoFace,
    /// A face was found but yaw could not be estimated from its landmarks.
    InvalidLandmarks,
    Valid,
}

/// Consecutive-failure tracking.
///
/// `no_face_frames` only feeds the user-facing notice. `invalid_yaw_frames`
/// counts on mobile clients, where some browsers hand out corrupted
/// landmarks indefinitely; once it passes the limit the live challenge is
/// abandoned for the photo fallback. Missing-face frames leave the
/// invalid streak untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegradationMonitor {
    device: DeviceClass,
    limit: u32,
    no_face_frames: u32,
    invalid_yaw_frames: u32,
}

impl DegradationMonitor {
    pub fn new(device: DeviceClass, limit: u32) -> Self {
        Self {
            device,
            limit,
            no_face_frames: 0,
            invalid_yaw_frames: 0,
        }
    }

    /// Records one frame. Returns `ConsecutiveDegradationExceeded` on the
    /// frame that pushes the invalid streak past the limit.
    pub fn observe(&mut self, quality: FrameQuality) -> Result<(), LivenessError> {
        match quality {
            FrameQuality::NoFace => {
                self.no_face_frames = self.no_face_frames.saturating_add(1);
            }
            FrameQuality::InvalidLandmarks => {
                self.no_face_frames = 0;
                if self.device.is_mobile() {
                    self.invalid_yaw_frames = self.invalid_yaw_frames.saturating_add(1);
                    if self.invalid_yaw_frames > self.limit {
                        return Err(LivenessError::ConsecutiveDegradationExceeded {
                            frames: self.invalid_yaw_frames,
                        });
                    }
                }
            }
            FrameQuality::Valid => {
                self.no_face_frames = 0;
                self.invalid_yaw_frames = 0;
            }
        }
        Ok(())
    }

    pub fn no_face_frames(&self) -> u32 {
        self.no_face_frames
    }

    pub fn invalid_yaw_frames(&self) -> u32 {
        self.invalid_yaw_frames
    }

    pub fn reset(&mut self) {
        self.no_face_frames = 0;
        self.invalid_yaw_frames = 0;
    }
}
