use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Parameters of the landmark-to-yaw estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub nose_index: usize,
    pub right_eye_index: usize,
    pub left_eye_index: usize,
    pub coordinate_limit: f64,
    pub min_fallback_points: usize,
    pub min_slice_points: usize,
    pub max_yaw: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            nose_index: NOSE_TIP_INDEX,
            right_eye_index: RIGHT_EYE_INDEX,
            left_eye_index: LEFT_EYE_INDEX,
            coordinate_limit: DEFAULT_COORDINATE_LIMIT,
            min_fallback_points: DEFAULT_MIN_FALLBACK_POINTS,
            min_slice_points: DEFAULT_MIN_SLICE_POINTS,
            max_yaw: DEFAULT_MAX_YAW,
        }
    }
}

/// Tuning of the whole verification engine.
///
/// Every empirical constant lives here so deployments can override it from
/// a JSON file or the command line without touching the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub yaw_threshold: f64,
    pub neutral_threshold: f64,
    pub hold_frames: u32,
    pub calibration_frames: u32,
    pub degradation_limit: u32,
    pub smoothing_alpha: f64,
    pub no_face_notice_frames: u32,
    pub classify_at_calibration_frame: u32,
    pub estimator: EstimatorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            yaw_threshold: DEFAULT_YAW_THRESHOLD,
            neutral_threshold: DEFAULT_NEUTRAL_THRESHOLD,
            hold_frames: DEFAULT_HOLD_FRAMES,
            calibration_frames: DEFAULT_CALIBRATION_FRAMES,
            degradation_limit: DEFAULT_DEGRADATION_LIMIT,
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            no_face_notice_frames: DEFAULT_NO_FACE_NOTICE_FRAMES,
            classify_at_calibration_frame: DEFAULT_CLASSIFY_AT_CALIBRATION_FRAME,
            estimator: EstimatorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("yaw_threshold", self.yaw_threshold)?;
        positive("neutral_threshold", self.neutral_threshold)?;
        positive("estimator.coordinate_limit", self.estimator.coordinate_limit)?;
        positive("estimator.max_yaw", self.estimator.max_yaw)?;
        at_least_one("hold_frames", self.hold_frames)?;
        at_least_one("calibration_frames", self.calibration_frames)?;
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "smoothing_alpha",
                reason: format!("must be in (0, 1], got {}", self.smoothing_alpha),
            });
        }
        if self.estimator.min_slice_points == 0 {
            return Err(ConfigError::Invalid {
                field: "estimator.min_slice_points",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.estimator.min_fallback_points < self.estimator.min_slice_points {
            return Err(ConfigError::Invalid {
                field: "estimator.min_fallback_points",
                reason: format!(
                    "must be >= min_slice_points ({}), got {}",
                    self.estimator.min_slice_points, self.estimator.min_fallback_points
                ),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

fn at_least_one(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be at least 1".to_string(),
        })
    }
}
