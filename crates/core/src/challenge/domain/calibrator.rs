/// Accumulates smoothed yaw over the first frames of an attempt to find
/// the subject's neutral pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibrator {
    target: u32,
    count: u32,
    sum: f64,
}

impl Calibrator {
    pub fn new(target: u32) -> Self {
        Self {
            target: target.max(1),
            count: 0,
            sum: 0.0,
        }
    }

    /// Adds one sample. Returns the neutral baseline on the sample that
    /// completes calibration and clears the accumulator.
    pub fn push(&mut self, smoothed_yaw: f64) -> Option<f64> {
        self.count += 1;
        self.sum += smoothed_yaw;
        if self.count < self.target {
            return None;
        }
        let neutral = self.sum / self.count as f64;
        self.reset();
        Some(neutral)
    }

    /// Samples accumulated so far in the current calibration.
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.sum = 0.0;
    }
}
