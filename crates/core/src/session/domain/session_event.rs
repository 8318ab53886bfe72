use crate::challenge::domain::progress::Progress;
use crate::session::domain::phase::Phase;

/// Outward notification produced by a session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    ProgressChanged(Progress),
    /// Emitted once per completed challenge.
    Succeeded,
    /// The live challenge was abandoned; capture a still photo instead.
    FallbackRequired,
}
