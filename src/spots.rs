//! Presentation mapping: label text and the translucency of the four tilt
//! indicators. Rendering itself belongs to the host UI.

use serde::{Deserialize, Serialize};

use crate::types::OrientationEstimate;

/// Tilt below this (radians) is treated as level.
pub const VALUE_DRIFT_RAD: f64 = 0.05;

/// Alpha of each directional spot, `0.0` hidden to `1.0` opaque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotAlphas {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl SpotAlphas {
    /// Light the spot on the side the device tilts toward; the stronger the
    /// tilt, the more opaque.
    pub fn from_tilt(pitch_deg: f64, roll_deg: f64) -> Self {
        let pitch = level_out(pitch_deg.to_radians());
        let roll = level_out(roll_deg.to_radians());

        let mut alphas = SpotAlphas::default();
        if pitch > 0.0 {
            alphas.bottom = pitch.min(1.0);
        } else {
            alphas.top = pitch.abs().min(1.0);
        }
        if roll > 0.0 {
            alphas.left = roll.min(1.0);
        } else {
            alphas.right = roll.abs().min(1.0);
        }
        alphas
    }

    pub fn from_estimate(estimate: &OrientationEstimate) -> Self {
        Self::from_tilt(estimate.pitch_deg, estimate.roll_deg)
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

fn level_out(radians: f64) -> f64 {
    if radians.abs() < VALUE_DRIFT_RAD { 0.0 } else { radians }
}

/// Label text for one angle.
pub fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

/// The three label strings (azimuth, pitch, roll).
pub fn labels(estimate: &OrientationEstimate) -> [String; 3] {
    [
        format_value(estimate.azimuth_deg),
        format_value(estimate.pitch_deg),
        format_value(estimate.roll_deg),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_level_device_shows_nothing() {
        assert_eq!(SpotAlphas::from_tilt(0.0, 0.0), SpotAlphas::default());
        // 2° is inside the drift band
        assert_eq!(SpotAlphas::from_tilt(2.0, -2.0), SpotAlphas::default());
    }

    #[test]
    fn test_pitch_lights_top_or_bottom() {
        let alphas = SpotAlphas::from_tilt(30.0, 0.0);
        assert_abs_diff_eq!(alphas.bottom, 30f64.to_radians(), epsilon = 1e-12);
        assert_eq!(alphas.top, 0.0);

        let alphas = SpotAlphas::from_tilt(-30.0, 0.0);
        assert_abs_diff_eq!(alphas.top, 30f64.to_radians(), epsilon = 1e-12);
        assert_eq!(alphas.bottom, 0.0);
    }

    #[test]
    fn test_roll_lights_left_or_right() {
        let alphas = SpotAlphas::from_tilt(0.0, 20.0);
        assert_abs_diff_eq!(alphas.left, 20f64.to_radians(), epsilon = 1e-12);
        assert_eq!(alphas.right, 0.0);

        let alphas = SpotAlphas::from_tilt(0.0, -20.0);
        assert_abs_diff_eq!(alphas.right, 20f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_alpha_clamped() {
        let alphas = SpotAlphas::from_tilt(-89.0, 170.0);
        assert_eq!(alphas.top, 1.0);
        assert_eq!(alphas.left, 1.0);
    }

    #[test]
    fn test_labels() {
        let estimate = OrientationEstimate {
            timestamp: 0.0,
            azimuth_deg: 359.996,
            pitch_deg: -12.346,
            roll_deg: 0.0,
        };
        assert_eq!(
            labels(&estimate),
            ["360.00".to_string(), "-12.35".to_string(), "0.00".to_string()]
        );
    }
}
