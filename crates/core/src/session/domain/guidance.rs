use crate::challenge::domain::progress::Progress;
use crate::detection::domain::attribute_classifier::Gender;
use crate::session::domain::frame_report::FrameReport;
use crate::session::domain::phase::Phase;

pub const NO_FACE_NOTICE: &str = "No face detected. Move closer to the camera and add more light.";
pub const UNSUPPORTED_NOTICE: &str =
    "This device or browser cannot run the live check reliably. Switching to photo verification.";

/// What the user should do next.
pub fn instruction(phase: Phase, progress: Progress) -> &'static str {
    match phase {
        Phase::Loading => "Preparing the camera check...",
        Phase::Error => "The face detector could not be loaded. Reload and try again.",
        Phase::Unsupported => {
            "Your device does not support the live check well. Use photo verification instead."
        }
        Phase::Idle => "Press start and look straight at the camera.",
        Phase::Calibrating => "Look at the camera and hold still...",
        Phase::Done => "Verification complete.",
        Phase::Verifying => match progress.value() {
            0 => "Turn your head slowly to the RIGHT",
            1 => "Return to CENTER",
            2 => "Turn your head slowly to the LEFT",
            _ => "Return to CENTER again",
        },
    }
}

/// Short labels for the four challenge steps, in order.
pub const STEP_LABELS: [&str; 4] = ["Face right", "Back to center", "Face left", "Back to center"];

/// One-line diagnostic for a processed frame.
///
/// Missing-face frames only produce a line once the streak passes
/// `notice_after`; earlier ones return `None` so the previous line stays.
pub fn diagnostic(report: &FrameReport, gender: Option<Gender>, notice_after: u32) -> Option<String> {
    if report.phase == Phase::Unsupported {
        return Some(UNSUPPORTED_NOTICE.to_string());
    }
    let Some(yaw) = report.yaw else {
        return (report.no_face_frames > notice_after).then(|| NO_FACE_NOTICE.to_string());
    };

    let neutral = report.neutral.unwrap_or(0.0);
    let delta = report.delta.unwrap_or(yaw - neutral);
    let mut line = format!(
        "phase: {} | prog: {} | yaw: {yaw:.4} | neutral: {neutral:.4} | delta: {delta:.4}",
        report.phase, report.progress
    );
    if let Some(mode) = report.mode {
        line.push_str(&format!(" | mode: {mode}"));
    }
    if let Some(pts) = report.sample_count {
        line.push_str(&format!(" | pts:{pts}"));
    }
    line.push_str(&format!(
        " | gender: {}",
        gender.map(Gender::as_str).unwrap_or("-")
    ));
    Some(line)
}
