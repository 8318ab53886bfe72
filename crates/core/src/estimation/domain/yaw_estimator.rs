//! Horizontal head-rotation signal from face-mesh landmarks.
//!
//! The primary three-point method compares the nose tip with the midpoint of
//! the outer eye corners. It is precise but breaks as soon as one of those
//! three landmarks is corrupted. The all-points fallback sorts every sane x
//! coordinate and compares the means of the outer thirds, which survives a
//! minority of garbage points at the cost of precision.
//!
//! The result is a unitless signal, not a calibrated angle: only its change
//! relative to the neutral baseline matters downstream.

use thiserror::Error;

use crate::detection::domain::landmark_set::LandmarkSet;
use crate::shared::config::EstimatorConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum YawError {
    #[error("landmarks invalid: {0}")]
    LandmarksInvalid(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YawMode {
    ThreePoint,
    AllPoints,
}

impl std::fmt::Display for YawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YawMode::ThreePoint => write!(f, "3pts"),
            YawMode::AllPoints => write!(f, "allpts"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YawSample {
    /// Raw yaw in [-max_yaw, max_yaw].
    pub value: f64,
    pub mode: YawMode,
    /// Number of points that survived filtering (all-points mode only).
    pub sample_count: Option<usize>,
}

/// Estimates yaw from one landmark set. Pure.
pub fn estimate(landmarks: &LandmarkSet, config: &EstimatorConfig) -> Result<YawSample, YawError> {
    if let Some(sample) = three_point(landmarks, config) {
        return Ok(sample);
    }
    all_points(landmarks, config)
}

fn three_point(landmarks: &LandmarkSet, config: &EstimatorConfig) -> Option<YawSample> {
    let nose = landmarks.finite_x(config.nose_index)?;
    let left_eye = landmarks.finite_x(config.left_eye_index)?;
    let right_eye = landmarks.finite_x(config.right_eye_index)?;

    let yaw = (left_eye + right_eye) / 2.0 - nose;
    if yaw.is_finite() && yaw.abs() <= config.max_yaw {
        Some(YawSample {
            value: yaw,
            mode: YawMode::ThreePoint,
            sample_count: None,
        })
    } else {
        None
    }
}

fn all_points(landmarks: &LandmarkSet, config: &EstimatorConfig) -> Result<YawSample, YawError> {
    let mut xs: Vec<f64> = landmarks
        .xs()
        .filter(|x| x.is_finite() && x.abs() <= config.coordinate_limit)
        .collect();

    if xs.len() < config.min_fallback_points {
        return Err(YawError::LandmarksInvalid("too few usable points"));
    }

    xs.sort_by(f64::total_cmp);

    let n = xs.len();
    let third = (n / 3).max(config.min_slice_points).min(n);
    let lower = mean(&xs[..third]);
    let upper = mean(&xs[n - third..]);

    let yaw = upper - lower;
    if !yaw.is_finite() || yaw.abs() > config.max_yaw {
        return Err(YawError::LandmarksInvalid("fallback yaw out of range"));
    }

    Ok(YawSample {
        value: yaw,
        mode: YawMode::AllPoints,
        sample_count: Some(n),
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
