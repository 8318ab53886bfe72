/// Landmark index of the nose tip in the 468-point face mesh.
pub const NOSE_TIP_INDEX: usize = 1;
/// Landmark index of the subject's right eye (outer corner).
pub const RIGHT_EYE_INDEX: usize = 33;
/// Landmark index of the subject's left eye (outer corner).
pub const LEFT_EYE_INDEX: usize = 263;

/// Nominal number of points produced by the face-mesh detector.
pub const FACE_MESH_POINTS: usize = 468;

pub const DEFAULT_YAW_THRESHOLD: f64 = 0.018;
pub const DEFAULT_NEUTRAL_THRESHOLD: f64 = 0.012;
pub const DEFAULT_HOLD_FRAMES: u32 = 5;
pub const DEFAULT_CALIBRATION_FRAMES: u32 = 25;
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.4;

/// Consecutive invalid-yaw frames tolerated on mobile before falling back
/// to photo capture. Empirical; the 81st consecutive failure escalates.
pub const DEFAULT_DEGRADATION_LIMIT: u32 = 80;

/// Consecutive no-face frames before the diagnostic asks the user to adjust.
pub const DEFAULT_NO_FACE_NOTICE_FRAMES: u32 = 30;

/// Calibration frame on which the one-shot attribute classifier runs.
pub const DEFAULT_CLASSIFY_AT_CALIBRATION_FRAME: u32 = 8;

/// All-points fallback: coordinates beyond this magnitude are detector garbage.
pub const DEFAULT_COORDINATE_LIMIT: f64 = 2.0;
/// All-points fallback: minimum surviving points.
pub const DEFAULT_MIN_FALLBACK_POINTS: usize = 20;
/// All-points fallback: minimum size of the lower and upper slices.
pub const DEFAULT_MIN_SLICE_POINTS: usize = 5;
/// Largest yaw magnitude accepted from either estimation mode.
pub const DEFAULT_MAX_YAW: f64 = 1.0;

/// Storage key for the challenge progress cursor. Bump the suffix whenever
/// step semantics change so stale cursors from older builds are ignored.
pub const PROGRESS_STORAGE_KEY: &str = "face_liveness_progress_v2";
/// Storage key for the cached classifier label.
pub const GENDER_STORAGE_KEY: &str = "detected_gender_v1";

pub const STATE_FILE_NAME: &str = "state.json";
pub const APP_DIR_NAME: &str = "headturn";

/// User-agent fragments that classify a client as mobile (case-insensitive).
pub const MOBILE_USER_AGENT_MARKERS: &[&str] = &["android", "iphone", "ipad", "ipod"];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
