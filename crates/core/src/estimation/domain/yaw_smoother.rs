use crate::shared::constants::DEFAULT_SMOOTHING_ALPHA;

/// EMA (Exponential Moving Average) over successive raw yaw values.
///
/// Formula: `ema[t] = alpha * current + (1 - alpha) * ema[t-1]`
///
/// The first value after construction or [`reset`](Self::reset) is taken
/// as-is, so the signal does not ramp up from zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YawSmoother {
    alpha: f64,
    state: Option<f64>,
}

impl YawSmoother {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, state: None }
    }

    pub fn update(&mut self, raw: f64) -> f64 {
        let smoothed = match self.state {
            None => raw,
            Some(prev) => prev * (1.0 - self.alpha) + raw * self.alpha,
        };
        self.state = Some(smoothed);
        smoothed
    }

    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Current smoothed value, `None` until the first update.
    pub fn value(&self) -> Option<f64> {
        self.state
    }
}

impl Default for YawSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_ALPHA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_alpha() {
        let smoother = YawSmoother::default();
        assert_relative_eq!(smoother.alpha, 0.4);
        assert_eq!(smoother.value(), None);
    }

    #[test]
    fn test_first_observation_returns_unchanged() {
        let mut smoother = YawSmoother::default();
        assert_eq!(smoother.update(0.037), 0.037);
    }

    #[test]
    fn test_first_observation_of_zero_is_kept() {
        // Zero is a legitimate yaw, not an "unset" marker.
        let mut smoother = YawSmoother::default();
        assert_eq!(smoother.update(0.0), 0.0);
        assert_relative_eq!(smoother.update(0.1), 0.04);
    }

    #[test]
    fn test_second_observation_applies_ema() {
        let mut smoother = YawSmoother::new(0.4);
        smoother.update(0.10);
        let result = smoother.update(0.20);
        // ema = 0.6 * prev + 0.4 * current
        assert_relative_eq!(result, 0.6 * 0.10 + 0.4 * 0.20);
    }

    #[test]
    fn test_reset_restarts_without_blending() {
        let mut smoother = YawSmoother::default();
        smoother.update(0.5);
        smoother.update(0.4);
        smoother.reset();
        assert_eq!(smoother.value(), None);
        assert_eq!(smoother.update(-0.25), -0.25);
    }

    #[test]
    fn test_convergence() {
        let mut smoother = YawSmoother::default();
        smoother.update(0.0);
        let mut result = 0.0;
        for _ in 0..50 {
            result = smoother.update(0.08);
        }
        assert_relative_eq!(result, 0.08, epsilon = 1e-6);
    }

    #[test]
    fn test_alpha_one_uses_current() {
        let mut smoother = YawSmoother::new(1.0);
        smoother.update(0.3);
        assert_eq!(smoother.update(-0.2), -0.2);
    }
}
