/// Lifecycle of one verification session. Exactly one phase at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Ready, waiting for the user to start an attempt.
    Idle,
    /// Detector still initializing.
    Loading,
    Calibrating,
    Verifying,
    Done,
    /// Live challenge abandoned; photo fallback required. Latched until
    /// the next start or reset.
    Unsupported,
    /// Detector failed to initialize.
    Error,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Calibrating => "calibrating",
            Phase::Verifying => "verifying",
            Phase::Done => "done",
            Phase::Unsupported => "unsupported",
            Phase::Error => "error",
        }
    }

    /// Whether an attempt is in progress and frames drive the challenge.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Calibrating | Phase::Verifying)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
