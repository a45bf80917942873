// sensor_fusion.rs: pure computation layer for TiltSpot
//
// Nothing in here knows about listeners, JNI, tokio or the terminal. Samples
// go in, orientation estimates and diagnostic events come out, so the core
// can be unit-tested and driven from recorded logs.

use crate::config::FusionConfig;
use crate::orientation_tracker::{DeviceRotation, OrientationTracker};
use crate::rotation::{
    normalize_degrees, orientation_angles, remap_coordinate_system, rotation_matrix, RejectReason,
    RotationGate,
};
use crate::smoothing::AzimuthSmoother;
use crate::types::{AccelData, MagData, OrientationEstimate, RotationMatrix, Vec3};

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum FusionEvent {
    /// A fused estimate for the presentation layer.
    Orientation(OrientationEstimate),
    /// No estimate this cycle.
    Rejected(RejectReason),
    /// The filter kept the previous heading instead of the new candidate.
    AzimuthHeld { candidate_deg: f64, held_deg: f64 },
    RotationChanged { from: DeviceRotation, to: DeviceRotation },
}

// ─── The main fusion struct ──────────────────────────────────────────────────

pub struct SensorFusion {
    config: FusionConfig,
    gate: RotationGate,

    // Latest sample per sensor, overwritten on every reading
    latest_accel: Option<Vec3>,
    latest_mag: Option<Vec3>,

    tracker: OrientationTracker,
    smoother: AzimuthSmoother,
}

impl SensorFusion {
    pub fn new(config: FusionConfig) -> Self {
        Self {
            gate: config.rotation_gate(),
            smoother: config.azimuth_smoother(),
            latest_accel: None,
            latest_mag: None,
            tracker: OrientationTracker::new(),
            config,
        }
    }

    // ── Sensor feeds ─────────────────────────────────────────────────────

    pub fn feed_accel(&mut self, accel: &AccelData) -> Vec<FusionEvent> {
        self.latest_accel = Some(accel.vector());
        self.fuse(accel.timestamp)
    }

    pub fn feed_mag(&mut self, mag: &MagData) -> Vec<FusionEvent> {
        self.latest_mag = Some(mag.vector());
        self.fuse(mag.timestamp)
    }

    /// Raw physical orientation in degrees, `None` when undetectable.
    /// Ignored when orientation tracking is disabled.
    pub fn feed_orientation(&mut self, degrees: Option<u32>) -> Vec<FusionEvent> {
        if !self.config.enable_orientation {
            return Vec::new();
        }
        let from = self.tracker.current();
        self.tracker
            .update(degrees)
            .map(|to| vec![FusionEvent::RotationChanged { from, to }])
            .unwrap_or_default()
    }

    /// Set the rotation directly from a `Surface.ROTATION_*` code. Unknown
    /// codes reset to the unremapped frame.
    pub fn set_rotation_code(&mut self, code: i32) -> Vec<FusionEvent> {
        if !self.config.enable_orientation {
            return Vec::new();
        }
        let rotation = DeviceRotation::from_surface_code(code).unwrap_or_else(|| {
            log::warn!("unknown surface rotation code {code}, using unremapped axes");
            DeviceRotation::Rotation0
        });
        let from = self.tracker.current();
        self.tracker
            .set(rotation)
            .map(|to| vec![FusionEvent::RotationChanged { from, to }])
            .unwrap_or_default()
    }

    // ── Fusion cycle ─────────────────────────────────────────────────────

    fn fuse(&mut self, timestamp: f64) -> Vec<FusionEvent> {
        let mut events = Vec::new();

        let matrix = match self.current_matrix() {
            Ok(matrix) => matrix,
            Err(reason) => {
                events.push(FusionEvent::Rejected(reason));
                return events;
            }
        };

        let (azimuth, pitch, roll) = orientation_angles(&matrix);
        let raw_azimuth = normalize_degrees(azimuth.to_degrees());

        let azimuth_deg = if self.config.enable_smooth_azimuth {
            let primed = self.smoother.is_primed();
            let candidate = self.smoother.low_pass(raw_azimuth);
            let reported = self.smoother.apply(raw_azimuth, timestamp);
            if primed && reported != candidate {
                events.push(FusionEvent::AzimuthHeld {
                    candidate_deg: candidate,
                    held_deg: reported,
                });
            }
            reported
        } else {
            raw_azimuth
        };

        events.push(FusionEvent::Orientation(OrientationEstimate {
            timestamp,
            azimuth_deg,
            pitch_deg: pitch.to_degrees(),
            roll_deg: roll.to_degrees(),
        }));
        events
    }

    /// Rotation matrix for the latest samples, remapped for the screen rotation.
    fn current_matrix(&self) -> Result<RotationMatrix, RejectReason> {
        let accel = self.latest_accel.as_ref().ok_or(RejectReason::MissingAccel)?;
        let mag = self.latest_mag.as_ref().ok_or(RejectReason::MissingMag)?;
        let matrix = rotation_matrix(accel, mag, &self.gate)?;

        let remapped = match self.tracker.current().remap_axes() {
            None => matrix,
            // the remap table never pairs an axis with itself
            Some((x, y)) => remap_coordinate_system(&matrix, x, y).unwrap_or(matrix),
        };
        Ok(remapped)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn rotation(&self) -> DeviceRotation {
        self.tracker.current()
    }
}

/// The estimate carried by a batch of events, if any.
pub fn estimate_of(events: &[FusionEvent]) -> Option<OrientationEstimate> {
    events.iter().find_map(|event| match event {
        FusionEvent::Orientation(estimate) => Some(*estimate),
        _ => None,
    })
}
