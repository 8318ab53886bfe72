//! Per-frame state machine of a verification session.
//!
//! The whole mutable state is one value, advanced by [`step`]. Nothing in
//! here performs I/O: persistence, detector calls and event delivery are
//! left to the caller, which applies the returned events.

use crate::challenge::domain::calibrator::Calibrator;
use crate::challenge::domain::challenge_sequencer::{
    ChallengeSequencer, SequencerThresholds, Transition,
};
use crate::challenge::domain::degradation_monitor::{DegradationMonitor, FrameQuality};
use crate::challenge::domain::progress::Progress;
use crate::detection::domain::landmark_set::LandmarkSet;
use crate::estimation::domain::yaw_estimator::estimate;
use crate::estimation::domain::yaw_smoother::YawSmoother;
use crate::session::domain::frame_report::{FrameReport, FrameStatus};
use crate::session::domain::phase::Phase;
use crate::session::domain::session_event::SessionEvent;
use crate::shared::config::EngineConfig;
use crate::shared::device::DeviceClass;
use crate::shared::error::LivenessError;

/// What the detector produced for one frame.
#[derive(Debug, Clone, Copy)]
pub enum Observation<'a> {
    NoFace,
    Face(&'a LandmarkSet),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    phase: Phase,
    progress: Progress,
    smoother: YawSmoother,
    calibrator: Calibrator,
    sequencer: Option<ChallengeSequencer>,
    monitor: DegradationMonitor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: SessionState,
    pub events: Vec<SessionEvent>,
    pub report: FrameReport,
}

impl SessionState {
    /// Fresh state in the loading phase, resuming from `progress`.
    pub fn new(config: &EngineConfig, device: DeviceClass, progress: Progress) -> Self {
        Self {
            phase: Phase::Loading,
            progress,
            smoother: YawSmoother::new(config.smoothing_alpha),
            calibrator: Calibrator::new(config.calibration_frames),
            sequencer: None,
            monitor: DegradationMonitor::new(device, config.degradation_limit),
        }
    }

    #[cfg(test)]
    fn monitor(&self) -> &DegradationMonitor {
        &self.monitor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn calibration_count(&self) -> u32 {
        self.calibrator.count()
    }

    pub fn neutral(&self) -> Option<f64> {
        self.sequencer.map(|s| s.neutral())
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Begins a new attempt: clears every per-attempt measurement and
    /// enters calibration. Stored progress is kept, except after a
    /// completed challenge, which starts over from the first step.
    pub fn restart(mut self) -> Self {
        self.clear_attempt();
        if self.phase == Phase::Done {
            self.progress = Progress::START;
        }
        self.phase = Phase::Calibrating;
        self
    }

    /// Discards progress and returns to idle.
    pub fn cleared(mut self) -> Self {
        self.clear_attempt();
        self.progress = Progress::START;
        self.phase = Phase::Idle;
        self
    }

    /// Events announcing every difference between `self` and `next`.
    pub fn events_towards(&self, next: &SessionState) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != next.phase {
            events.push(SessionEvent::PhaseChanged(next.phase));
        }
        if self.progress != next.progress {
            events.push(SessionEvent::ProgressChanged(next.progress));
        }
        events
    }

    fn clear_attempt(&mut self) {
        self.smoother.reset();
        self.calibrator.reset();
        self.sequencer = None;
        self.monitor.reset();
    }
}

/// Advances the session by one frame.
pub fn step(mut state: SessionState, config: &EngineConfig, observation: Observation<'_>) -> StepOutcome {
    let mut events = Vec::new();
    let mut report = FrameReport::new(state.phase, state.progress);

    if state.phase == Phase::Unsupported {
        return finish(state, events, report);
    }

    match observation {
        Observation::NoFace => {
            let _ = state.monitor.observe(FrameQuality::NoFace);
            report.status = FrameStatus::NoFace;
            report.issue = Some(LivenessError::NoFaceDetected);
        }
        Observation::Face(landmarks) => match estimate(landmarks, &config.estimator) {
            Err(e) => {
                log::debug!("Frame rejected: {e}");
                report.status = FrameStatus::Corrupted;
                report.issue = Some(LivenessError::LandmarksInvalid);
                if let Err(escalation) = state.monitor.observe(FrameQuality::InvalidLandmarks) {
                    if state.phase != Phase::Done {
                        state.phase = Phase::Unsupported;
                        events.push(SessionEvent::PhaseChanged(Phase::Unsupported));
                        events.push(SessionEvent::FallbackRequired);
                    }
                    report.issue = Some(escalation);
                }
            }
            Ok(sample) => {
                let _ = state.monitor.observe(FrameQuality::Valid);
                let smoothed = state.smoother.update(sample.value);
                report.yaw = Some(smoothed);
                report.mode = Some(sample.mode);
                report.sample_count = sample.sample_count;

                match state.phase {
                    Phase::Calibrating => calibrate(&mut state, config, smoothed, &mut events, &mut report),
                    Phase::Verifying => verify(&mut state, config, smoothed, &mut events, &mut report),
                    _ => {}
                }
            }
        },
    }

    finish(state, events, report)
}

/// Copies the post-frame state into the report.
fn finish(state: SessionState, events: Vec<SessionEvent>, mut report: FrameReport) -> StepOutcome {
    report.phase = state.phase;
    report.progress = state.progress;
    report.no_face_frames = state.monitor.no_face_frames();
    if report.calibration_count == 0 {
        report.calibration_count = state.calibrator.count();
    }
    if report.neutral.is_none() {
        report.neutral = state.neutral();
    }

    StepOutcome { state, events, report }
}

fn calibrate(
    state: &mut SessionState,
    config: &EngineConfig,
    smoothed: f64,
    events: &mut Vec<SessionEvent>,
    report: &mut FrameReport,
) {
    let completed = state.calibrator.push(smoothed);
    let count = match completed {
        Some(_) => state.calibrator.target(),
        None => state.calibrator.count(),
    };
    report.calibration_count = count;
    report.request_classification = count == config.classify_at_calibration_frame;

    if let Some(neutral) = completed {
        log::info!("Calibrated neutral yaw {neutral:.4} over {count} frames");
        state.sequencer = Some(ChallengeSequencer::new(neutral));
        state.phase = Phase::Verifying;
        events.push(SessionEvent::PhaseChanged(Phase::Verifying));
    }
}

fn verify(
    state: &mut SessionState,
    config: &EngineConfig,
    smoothed: f64,
    events: &mut Vec<SessionEvent>,
    report: &mut FrameReport,
) {
    let Some(sequencer) = state.sequencer.as_mut() else {
        return;
    };
    let thresholds = SequencerThresholds {
        turn: config.yaw_threshold,
        neutral: config.neutral_threshold,
        hold_frames: config.hold_frames,
    };
    report.delta = Some(sequencer.delta(smoothed));

    match sequencer.observe(smoothed, state.progress, &thresholds) {
        Transition::None => {}
        Transition::Advanced(next) => {
            state.progress = next;
            events.push(SessionEvent::ProgressChanged(next));
        }
        Transition::Completed => {
            state.phase = Phase::Done;
            report.status = FrameStatus::Success;
            events.push(SessionEvent::PhaseChanged(Phase::Done));
            events.push(SessionEvent::Succeeded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::landmark_set::Point3;
    use crate::shared::constants::{FACE_MESH_POINTS, LEFT_EYE_INDEX, NOSE_TIP_INDEX, RIGHT_EYE_INDEX};
    use approx::assert_relative_eq;

    const RIGHT: f64 = 0.05;
    const LEFT: f64 = -0.05;
    const CENTER: f64 = 0.0;

    /// Mesh whose three-point yaw equals `yaw`.
    fn face(yaw: f64) -> LandmarkSet {
        let mut points = vec![Point3::new(0.5, 0.5, 0.0); FACE_MESH_POINTS];
        points[NOSE_TIP_INDEX].x = 0.5 - yaw;
        points[LEFT_EYE_INDEX].x = 0.6;
        points[RIGHT_EYE_INDEX].x = 0.4;
        LandmarkSet::new(points)
    }

    /// Mesh with NaN reference points and too few sane coordinates.
    fn corrupted() -> LandmarkSet {
        LandmarkSet::new(vec![Point3::new(f64::NAN, 0.0, 0.0); FACE_MESH_POINTS])
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn started(device: DeviceClass) -> SessionState {
        SessionState::new(&config(), device, Progress::START)
            .with_phase(Phase::Idle)
            .restart()
    }

    fn run(state: SessionState, obs: Observation<'_>, n: usize) -> (SessionState, Vec<SessionEvent>) {
        let mut state = state;
        let mut all = Vec::new();
        for _ in 0..n {
            let outcome = step(state, &config(), obs);
            state = outcome.state;
            all.extend(outcome.events);
        }
        (state, all)
    }

    fn calibrated() -> SessionState {
        let lm = face(CENTER);
        run(started(DeviceClass::Desktop), Observation::Face(&lm), 25).0
    }

    #[test]
    fn test_new_state_is_loading() {
        let state = SessionState::new(&config(), DeviceClass::Desktop, Progress::START);
        assert_eq!(state.phase(), Phase::Loading);
    }

    #[test]
    fn test_calibration_transitions_on_twenty_fifth_frame() {
        let lm = face(0.01);
        let (state, events) = run(started(DeviceClass::Desktop), Observation::Face(&lm), 24);
        assert_eq!(state.phase(), Phase::Calibrating);
        assert_eq!(state.calibration_count(), 24);
        assert!(events.is_empty());

        let outcome = step(state, &config(), Observation::Face(&lm));
        assert_eq!(outcome.state.phase(), Phase::Verifying);
        assert_eq!(outcome.events, vec![SessionEvent::PhaseChanged(Phase::Verifying)]);
        assert_eq!(outcome.report.calibration_count, 25);
        assert_relative_eq!(outcome.state.neutral().unwrap(), 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_neutral_is_mean_of_smoothed_samples() {
        let mut state = started(DeviceClass::Desktop);
        let mut smoother = YawSmoother::new(0.4);
        let mut sum = 0.0;
        for i in 0..25 {
            let raw = 0.001 * (i % 7) as f64;
            sum += smoother.update(raw);
            let lm = face(raw);
            state = step(state, &config(), Observation::Face(&lm)).state;
        }
        assert_relative_eq!(state.neutral().unwrap(), sum / 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_classification_requested_on_eighth_calibration_frame() {
        let lm = face(CENTER);
        let mut state = started(DeviceClass::Desktop);
        let mut requested_at = Vec::new();
        for i in 1..=25 {
            let outcome = step(state, &config(), Observation::Face(&lm));
            if outcome.report.request_classification {
                requested_at.push(i);
            }
            state = outcome.state;
        }
        assert_eq!(requested_at, vec![8]);
    }

    #[test]
    fn test_full_challenge_succeeds_once() {
        let mut state = calibrated();
        let mut events = Vec::new();
        for yaw in [RIGHT, CENTER, LEFT, CENTER] {
            let lm = face(yaw);
            // The smoother needs a few frames to cross each threshold.
            let (next, ev) = run(state, Observation::Face(&lm), 12);
            state = next;
            events.extend(ev);
        }

        assert_eq!(state.phase(), Phase::Done);
        let progress: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::ProgressChanged(p) => Some(p.value()),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![1, 2, 3]);
        assert_eq!(events.iter().filter(|e| **e == SessionEvent::Succeeded).count(), 1);
    }

    #[test]
    fn test_success_frame_reports_success_status() {
        let state = SessionState {
            progress: Progress::FINAL,
            ..calibrated()
        };
        let lm = face(CENTER);
        let (state, _) = run(state, Observation::Face(&lm), 4);
        let outcome = step(state, &config(), Observation::Face(&lm));
        assert_eq!(outcome.report.status, FrameStatus::Success);
        assert_eq!(outcome.state.phase(), Phase::Done);
    }

    #[test]
    fn test_left_turn_first_does_not_advance() {
        let lm = face(LEFT);
        let (state, events) = run(calibrated(), Observation::Face(&lm), 40);
        assert_eq!(state.progress(), Progress::START);
        assert!(events.is_empty());
    }

    #[test]
    fn test_no_face_frame_reports_status() {
        let outcome = step(calibrated(), &config(), Observation::NoFace);
        assert_eq!(outcome.report.status, FrameStatus::NoFace);
        assert_eq!(outcome.report.issue, Some(LivenessError::NoFaceDetected));
        assert_eq!(outcome.report.no_face_frames, 1);
        assert_eq!(outcome.state.phase(), Phase::Verifying);
    }

    #[test]
    fn test_mobile_escalates_on_eighty_first_invalid_frame() {
        let lm = corrupted();
        let (state, events) = run(started(DeviceClass::Mobile), Observation::Face(&lm), 80);
        assert_eq!(state.phase(), Phase::Calibrating);
        assert!(events.is_empty());

        let outcome = step(state, &config(), Observation::Face(&lm));
        assert_eq!(outcome.state.phase(), Phase::Unsupported);
        assert_eq!(
            outcome.events,
            vec![SessionEvent::PhaseChanged(Phase::Unsupported), SessionEvent::FallbackRequired]
        );
        assert_eq!(
            outcome.report.issue,
            Some(LivenessError::ConsecutiveDegradationExceeded { frames: 81 })
        );
    }

    #[test]
    fn test_valid_frame_in_between_resets_degradation() {
        let bad = corrupted();
        let good = face(CENTER);
        let (state, _) = run(started(DeviceClass::Mobile), Observation::Face(&bad), 50);
        let (state, _) = run(state, Observation::Face(&good), 1);
        let (state, events) = run(state, Observation::Face(&bad), 80);
        assert_ne!(state.phase(), Phase::Unsupported);
        assert!(!events.contains(&SessionEvent::FallbackRequired));
    }

    #[test]
    fn test_unsupported_is_latched_until_restart() {
        let bad = corrupted();
        let good = face(CENTER);
        let (state, _) = run(started(DeviceClass::Mobile), Observation::Face(&bad), 81);
        let (state, events) = run(state, Observation::Face(&good), 50);
        assert_eq!(state.phase(), Phase::Unsupported);
        assert!(events.is_empty());

        let state = state.restart();
        assert_eq!(state.phase(), Phase::Calibrating);
        assert_eq!(state.monitor().invalid_yaw_frames(), 0);
    }

    #[test]
    fn test_latched_report_keeps_diagnostics() {
        let lm = face(CENTER);
        let bad = corrupted();
        let mobile = run(started(DeviceClass::Mobile), Observation::Face(&lm), 25).0;
        let neutral = mobile.neutral();
        assert!(neutral.is_some());

        let (state, _) = run(mobile, Observation::Face(&bad), 81);
        assert_eq!(state.phase(), Phase::Unsupported);

        let report = step(state, &config(), Observation::Face(&lm)).report;
        assert_eq!(report.phase, Phase::Unsupported);
        assert_eq!(report.neutral, neutral);
        assert_eq!(report.yaw, None);
    }

    #[test]
    fn test_desktop_never_escalates() {
        let lm = corrupted();
        let (state, events) = run(started(DeviceClass::Desktop), Observation::Face(&lm), 300);
        assert_eq!(state.phase(), Phase::Calibrating);
        assert!(events.is_empty());
    }

    #[test]
    fn test_restart_keeps_progress_unless_done() {
        let state = SessionState {
            progress: Progress::new(2).unwrap(),
            ..calibrated()
        };
        let resumed = state.clone().restart();
        assert_eq!(resumed.progress().value(), 2);
        assert_eq!(resumed.neutral(), None);
        assert_eq!(resumed.calibration_count(), 0);

        let finished = state.with_phase(Phase::Done).restart();
        assert_eq!(finished.progress(), Progress::START);
    }

    #[test]
    fn test_restart_resets_smoothing() {
        let lm = face(0.2);
        let (state, _) = run(started(DeviceClass::Desktop), Observation::Face(&lm), 3);
        let state = state.restart();
        let lm = face(-0.1);
        let outcome = step(state, &config(), Observation::Face(&lm));
        assert_relative_eq!(outcome.report.yaw.unwrap(), -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_cleared_returns_to_idle_at_start() {
        let state = SessionState {
            progress: Progress::FINAL,
            ..calibrated()
        };
        let cleared = state.clone().cleared();
        assert_eq!(cleared.phase(), Phase::Idle);
        assert_eq!(cleared.progress(), Progress::START);
        assert_eq!(
            state.events_towards(&cleared),
            vec![
                SessionEvent::PhaseChanged(Phase::Idle),
                SessionEvent::ProgressChanged(Progress::START)
            ]
        );
    }

    #[test]
    fn test_frames_outside_attempt_do_not_calibrate() {
        let lm = face(CENTER);
        let idle = SessionState::new(&config(), DeviceClass::Desktop, Progress::START).with_phase(Phase::Idle);
        let (state, events) = run(idle, Observation::Face(&lm), 30);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.calibration_count(), 0);
        assert!(events.is_empty());
    }
}
