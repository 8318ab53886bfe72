use crate::challenge::domain::progress::Progress;
use crate::estimation::domain::yaw_estimator::YawMode;
use crate::session::domain::phase::Phase;
use crate::shared::error::LivenessError;

/// Visual state of the camera frame for one processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameStatus {
    #[default]
    Normal,
    NoFace,
    Corrupted,
    Success,
}

impl FrameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameStatus::Normal => "normal",
            FrameStatus::NoFace => "noface",
            FrameStatus::Corrupted => "corrupted",
            FrameStatus::Success => "success",
        }
    }
}

/// Everything one frame step measured, for rendering and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub status: FrameStatus,
    pub phase: Phase,
    pub progress: Progress,
    /// Smoothed yaw, when the frame produced one.
    pub yaw: Option<f64>,
    pub mode: Option<YawMode>,
    pub sample_count: Option<usize>,
    pub neutral: Option<f64>,
    pub delta: Option<f64>,
    pub calibration_count: u32,
    pub no_face_frames: u32,
    pub issue: Option<LivenessError>,
    /// Set on the calibration frame where the attribute classifier should run.
    pub request_classification: bool,
}

impl FrameReport {
    pub fn new(phase: Phase, progress: Progress) -> Self {
        Self {
            status: FrameStatus::Normal,
            phase,
            progress,
            yaw: None,
            mode: None,
            sample_count: None,
            neutral: None,
            delta: None,
            calibration_count: 0,
            no_face_frames: 0,
            issue: None,
            request_classification: false,
        }
    }
}
