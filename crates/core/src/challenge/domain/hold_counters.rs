/// Debounce counters for the three head directions.
///
/// Each counter counts consecutive qualifying frames and drops to 0 on the
/// first frame that does not qualify. The counters are independent of each
/// other; only the sequencer resets them across directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldCounters {
    pub right: u32,
    pub left: u32,
    pub center: u32,
}

impl HoldCounters {
    /// Updates all three counters from one baseline-relative yaw delta.
    pub fn observe(&mut self, delta: f64, turn_threshold: f64, neutral_threshold: f64) {
        self.right = bump_or_clear(self.right, delta > turn_threshold);
        self.left = bump_or_clear(self.left, delta < -turn_threshold);
        self.center = bump_or_clear(self.center, delta.abs() < neutral_threshold);
    }
}

fn bump_or_clear(count: u32, qualifies: bool) -> u32 {
    if qualifies {
        count.saturating_add(1)
    } else {
        0
    }
}
