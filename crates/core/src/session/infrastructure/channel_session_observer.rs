use crossbeam_channel::Sender;

use crate::challenge::domain::progress::Progress;
use crate::session::domain::phase::Phase;
use crate::session::domain::session_event::SessionEvent;
use crate::session::session_observer::SessionObserver;

/// Forwards session events to a channel, e.g. towards a UI thread.
///
/// A disconnected receiver is ignored: nobody is listening any more.
pub struct ChannelSessionObserver {
    tx: Sender<SessionEvent>,
}

impl ChannelSessionObserver {
    pub fn new(tx: Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl SessionObserver for ChannelSessionObserver {
    fn on_phase_change(&mut self, phase: Phase) {
        self.send(SessionEvent::PhaseChanged(phase));
    }

    fn on_progress_change(&mut self, progress: Progress) {
        self.send(SessionEvent::ProgressChanged(progress));
    }

    fn on_success(&mut self) {
        self.send(SessionEvent::Succeeded);
    }

    fn on_fallback_required(&mut self) {
        self.send(SessionEvent::FallbackRequired);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_events_in_order() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut observer = ChannelSessionObserver::new(tx);
        observer.on_phase_change(Phase::Calibrating);
        observer.on_success();
        let received: Vec<SessionEvent> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![SessionEvent::PhaseChanged(Phase::Calibrating), SessionEvent::Succeeded]
        );
    }

    #[test]
    fn test_disconnected_receiver_is_ignored() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let mut observer = ChannelSessionObserver::new(tx);
        observer.on_fallback_required();
    }
}
