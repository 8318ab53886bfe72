use serde::{Deserialize, Serialize};

/// Position in the four-step head-turn challenge.
///
/// 0 = waiting for RIGHT, 1 = waiting for CENTER, 2 = waiting for LEFT,
/// 3 = waiting for the final CENTER. Values outside 0..=3 cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Progress(u8);

impl Progress {
    pub const START: Progress = Progress(0);
    pub const FINAL: Progress = Progress(3);

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::FINAL.0).then_some(Progress(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The following step, or `None` when already on the final step.
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    pub fn is_final(self) -> bool {
        self == Self::FINAL
    }
}

impl TryFrom<u8> for Progress {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Progress::new(value).ok_or_else(|| format!("progress out of range: {value}"))
    }
}

impl From<Progress> for u8 {
    fn from(progress: Progress) -> Self {
        progress.0
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
