//! Directional challenge: RIGHT, CENTER, LEFT, CENTER.
//!
//! Every step needs its direction held for `hold_frames` consecutive frames.
//! At most one step fires per frame, and only the step matching the current
//! progress is considered.

use crate::challenge::domain::hold_counters::HoldCounters;
use crate::challenge::domain::progress::Progress;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerThresholds {
    pub turn: f64,
    pub neutral: f64,
    pub hold_frames: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Advanced(Progress),
    Completed,
}

/// Verifying-phase state: the neutral baseline plus the hold counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChallengeSequencer {
    neutral: f64,
    holds: HoldCounters,
}

impl ChallengeSequencer {
    pub fn new(neutral: f64) -> Self {
        Self {
            neutral,
            holds: HoldCounters::default(),
        }
    }

    pub fn neutral(&self) -> f64 {
        self.neutral
    }

    pub fn holds(&self) -> HoldCounters {
        self.holds
    }

    pub fn delta(&self, smoothed_yaw: f64) -> f64 {
        smoothed_yaw - self.neutral
    }

    /// Feeds one smoothed yaw value and reports the resulting transition.
    pub fn observe(
        &mut self,
        smoothed_yaw: f64,
        progress: Progress,
        thresholds: &SequencerThresholds,
    ) -> Transition {
        let delta = self.delta(smoothed_yaw);
        self.holds.observe(delta, thresholds.turn, thresholds.neutral);

        let hold = thresholds.hold_frames;
        match progress.value() {
            0 if self.holds.right >= hold => {
                self.holds.center = 0;
                advance(progress)
            }
            1 if self.holds.center >= hold => {
                self.holds.left = 0;
                advance(progress)
            }
            2 if self.holds.left >= hold => {
                self.holds.center = 0;
                advance(progress)
            }
            3 if self.holds.center >= hold => Transition::Completed,
            _ => Transition::None,
        }
    }
}

fn advance(progress: Progress) -> Transition {
    match progress.next() {
        Some(next) => Transition::Advanced(next),
        None => Transition::Completed,
    }
}
