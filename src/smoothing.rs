use crate::rotation::{angular_distance, normalize_degrees};

/// Low-pass filter for the compass heading.
///
/// Blends in sine/cosine space so the 0°/360° seam does not produce a jump,
/// then debounces small changes: a candidate within `min_update_deg` of the
/// last accepted heading is only accepted once `update_rate_ms` has passed.
#[derive(Clone, Debug)]
pub struct AzimuthSmoother {
    last_azimuth: f64,
    last_update_ts: Option<f64>,
    primed: bool,
    update_rate_ms: u64,
    min_update_deg: f64,
    fast_factor: f64,
    slow_factor: f64,
}

impl AzimuthSmoother {
    pub fn new(
        update_rate_ms: u64,
        min_update_deg: f64,
        fast_factor: f64,
        slow_factor: f64,
    ) -> Self {
        AzimuthSmoother {
            last_azimuth: 0.0,
            last_update_ts: None,
            primed: false,
            update_rate_ms,
            min_update_deg,
            fast_factor,
            slow_factor,
        }
    }

    /// Start from a known accepted heading, as if it was accepted at `timestamp`.
    pub fn seeded(mut self, azimuth_deg: f64, timestamp: f64) -> Self {
        self.last_azimuth = normalize_degrees(azimuth_deg);
        self.last_update_ts = Some(timestamp);
        self.primed = true;
        self
    }

    /// Run one sample through the filter and return the heading to report.
    /// `timestamp` is in seconds.
    pub fn apply(&mut self, azimuth_deg: f64, timestamp: f64) -> f64 {
        if !azimuth_deg.is_finite() {
            return self.last_azimuth;
        }
        if !self.primed {
            self.primed = true;
            self.accept(normalize_degrees(azimuth_deg), timestamp);
            return self.last_azimuth;
        }

        let candidate = self.low_pass(azimuth_deg);
        if self.check_update(candidate, timestamp) {
            self.accept(candidate, timestamp);
        } else {
            log::trace!("azimuth held at {:.2} (candidate {:.2})", self.last_azimuth, candidate);
        }
        self.last_azimuth
    }

    /// Blend `azimuth_deg` into the last accepted heading. Large jumps use
    /// the fast factor so the needle catches up sooner.
    pub fn low_pass(&self, azimuth_deg: f64) -> f64 {
        let factor = if (self.last_azimuth - azimuth_deg).abs() > self.min_update_deg {
            self.fast_factor
        } else {
            self.slow_factor
        };

        let last = self.last_azimuth.to_radians();
        let new = azimuth_deg.to_radians();
        let sin = factor * last.sin() + (1.0 - factor) * new.sin();
        let cos = factor * last.cos() + (1.0 - factor) * new.cos();

        normalize_degrees(sin.atan2(cos).to_degrees())
    }

    /// Whether `candidate` should replace the last accepted heading.
    pub fn check_update(&self, candidate: f64, timestamp: f64) -> bool {
        if candidate == self.last_azimuth {
            return false;
        }
        if angular_distance(self.last_azimuth, candidate) > self.min_update_deg {
            return true;
        }
        self.update_interval_elapsed(timestamp)
    }

    fn update_interval_elapsed(&self, timestamp: f64) -> bool {
        match self.last_update_ts {
            None => true,
            Some(last) => (timestamp - last) * 1000.0 >= self.update_rate_ms as f64,
        }
    }

    fn accept(&mut self, azimuth: f64, timestamp: f64) {
        self.last_azimuth = azimuth;
        self.last_update_ts = Some(timestamp);
    }

    /// Last accepted heading.
    pub fn last(&self) -> f64 {
        self.last_azimuth
    }

    pub fn last_update(&self) -> Option<f64> {
        self.last_update_ts
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }
}

impl Default for AzimuthSmoother {
    fn default() -> Self {
        Self::new(2000, 1.0, 0.6, 0.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_first_sample_primes() {
        let mut smoother = AzimuthSmoother::default();
        let result = smoother.apply(180.0, 0.0);
        assert_eq!(result, 180.0);
        assert_eq!(smoother.last_update(), Some(0.0));
    }

    #[test]
    fn test_equal_heading_never_updates() {
        let smoother = AzimuthSmoother::default().seeded(42.0, 0.0);
        assert!(!smoother.check_update(42.0, 100.0));

        let mut smoother = smoother;
        assert_eq!(smoother.apply(42.0, 100.0), 42.0);
        assert_eq!(smoother.last_update(), Some(0.0));
    }

    #[test]
    fn test_small_change_waits_for_update_rate() {
        let mut smoother = AzimuthSmoother::default().seeded(10.0, 0.0);

        // 11° blends to ~10.2°, within the 1° threshold
        let candidate = smoother.low_pass(11.0);
        assert!(candidate > 10.0 && candidate < 10.5);

        assert_eq!(smoother.apply(11.0, 0.5), 10.0);
        assert_eq!(smoother.apply(11.0, 1.0), 10.0);

        let accepted = smoother.apply(11.0, 2.001);
        assert_abs_diff_eq!(accepted, candidate, epsilon = 1e-9);
        assert_eq!(smoother.last_update(), Some(2.001));
    }

    #[test]
    fn test_large_change_accepted_immediately() {
        let mut smoother = AzimuthSmoother::default().seeded(10.0, 0.0);
        let result = smoother.apply(40.0, 0.1);
        // factor 0.6 pulls 40% of the way: ~22°
        assert!(result > 20.0 && result < 24.0, "{result}");
    }

    #[test]
    fn test_wraparound_blends_across_north() {
        let smoother = AzimuthSmoother::default().seeded(350.0, 0.0);
        let candidate = smoother.low_pass(5.0);
        // on the short arc between 350° and 5°, not a linear average near 212°
        assert_abs_diff_eq!(
            angular_distance(candidate, 350.0) + angular_distance(candidate, 5.0),
            15.0,
            epsilon = 1e-9
        );
        assert!(angular_distance(candidate, 0.0) < 5.0, "{candidate}");
    }

    #[test]
    fn test_output_stays_in_range() {
        let mut smoother = AzimuthSmoother::default();
        let mut t = 0.0;
        for raw in [359.9, 0.1, 359.5, 180.0, -45.0, 720.0, 0.0] {
            t += 0.2;
            let result = smoother.apply(raw, t);
            assert!((0.0..360.0).contains(&result), "{raw} -> {result}");
        }
    }

    #[test]
    fn test_non_finite_input_leaves_state_alone() {
        let mut unprimed = AzimuthSmoother::default();
        assert_eq!(unprimed.apply(f64::NAN, 0.0), 0.0);
        assert!(!unprimed.is_primed());

        let mut smoother = AzimuthSmoother::default().seeded(10.0, 0.0);
        assert_eq!(smoother.apply(f64::NAN, 5.0), 10.0);
        assert_eq!(smoother.apply(f64::INFINITY, 6.0), 10.0);
        assert_eq!(smoother.last_update(), Some(0.0));

        let next = smoother.apply(40.0, 7.0);
        assert!(next.is_finite() && next > 10.0);
    }

    #[test]
    fn test_converges_on_sustained_heading() {
        let mut smoother = AzimuthSmoother::default().seeded(0.0, 0.0);
        let mut t = 0.0;
        for _ in 0..50 {
            t += 0.2;
            smoother.apply(90.0, t);
        }
        assert!(angular_distance(smoother.last(), 90.0) < 1.5, "{}", smoother.last());
    }
}
