use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TiltError};
use crate::rotation::RotationGate;
use crate::smoothing::AzimuthSmoother;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    // ── Feature flags ──
    /// Track physical rotation and remap the matrix axes for it.
    pub enable_orientation: bool,
    /// Run the azimuth through the low-pass filter.
    pub enable_smooth_azimuth: bool,

    // ── Azimuth low-pass ──
    pub azimuth_update_rate_ms: u64,
    pub azimuth_min_update_deg: f64,
    pub azimuth_fast_factor: f64,
    pub azimuth_slow_factor: f64,

    // ── Rotation matrix gating ──
    pub free_fall_gravity_fraction: f64,
    pub min_field_strength: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            enable_orientation: true,
            enable_smooth_azimuth: true,
            azimuth_update_rate_ms: 2000,
            azimuth_min_update_deg: 1.0,
            azimuth_fast_factor: 0.6,
            azimuth_slow_factor: 0.8,
            free_fall_gravity_fraction: 0.01,
            min_field_strength: 0.1,
        }
    }
}

impl FusionConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| TiltError::Config(format!("cannot open {}: {e}", path.display())))?;
        let config: FusionConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| TiltError::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, factor) in [
            ("azimuth_fast_factor", self.azimuth_fast_factor),
            ("azimuth_slow_factor", self.azimuth_slow_factor),
        ] {
            if !(factor > 0.0 && factor < 1.0) {
                return Err(TiltError::InvalidParameters(format!(
                    "{name} must be in (0, 1), got {factor}"
                )));
            }
        }
        if !(self.azimuth_min_update_deg >= 0.0) {
            return Err(TiltError::InvalidParameters(format!(
                "azimuth_min_update_deg must be >= 0, got {}",
                self.azimuth_min_update_deg
            )));
        }
        if !(self.free_fall_gravity_fraction > 0.0) || !(self.min_field_strength > 0.0) {
            return Err(TiltError::InvalidParameters(
                "rotation gating constants must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn rotation_gate(&self) -> RotationGate {
        RotationGate {
            free_fall_gravity_fraction: self.free_fall_gravity_fraction,
            min_field_strength: self.min_field_strength,
        }
    }

    pub fn azimuth_smoother(&self) -> AzimuthSmoother {
        AzimuthSmoother::new(
            self.azimuth_update_rate_ms,
            self.azimuth_min_update_deg,
            self.azimuth_fast_factor,
            self.azimuth_slow_factor,
        )
    }
}
