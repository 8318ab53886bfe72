use crate::challenge::domain::progress::Progress;
use crate::session::domain::phase::Phase;
use crate::session::domain::session_event::SessionEvent;

/// Receiver of session transitions.
///
/// Decouples the session from how its events reach the outside (log
/// output, a UI channel, a test recorder).
pub trait SessionObserver: Send {
    fn on_phase_change(&mut self, phase: Phase);

    fn on_progress_change(&mut self, progress: Progress);

    /// Called exactly once per completed challenge.
    fn on_success(&mut self);

    fn on_fallback_required(&mut self);

    /// Routes one event to the matching callback.
    fn notify(&mut self, event: &SessionEvent) {
        match *event {
            SessionEvent::PhaseChanged(phase) => self.on_phase_change(phase),
            SessionEvent::ProgressChanged(progress) => self.on_progress_change(progress),
            SessionEvent::Succeeded => self.on_success(),
            SessionEvent::FallbackRequired => self.on_fallback_required(),
        }
    }
}

/// Observer that discards all events.
pub struct NullSessionObserver;

impl SessionObserver for NullSessionObserver {
    fn on_phase_change(&mut self, _phase: Phase) {}
    fn on_progress_change(&mut self, _progress: Progress) {}
    fn on_success(&mut self) {}
    fn on_fallback_required(&mut self) {}
}

/// Observer that writes every transition through the `log` facade.
#[derive(Default)]
pub struct LoggingSessionObserver;

impl LoggingSessionObserver {
    pub fn new() -> Self {
        Self
    }
}

impl SessionObserver for LoggingSessionObserver {
    fn on_phase_change(&mut self, phase: Phase) {
        log::info!("Phase: {phase}");
    }

    fn on_progress_change(&mut self, progress: Progress) {
        log::info!("Progress: {progress}/{}", Progress::FINAL);
    }

    fn on_success(&mut self) {
        log::info!("Liveness challenge completed");
    }

    fn on_fallback_required(&mut self) {
        log::warn!("Live challenge abandoned; photo verification required");
    }
}
