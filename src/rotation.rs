//! Rotation matrix primitives: gravity + geomagnetic vectors to a
//! device-to-world matrix, axis remapping for screen rotation, and Euler
//! angle extraction.
//!
//! Conventions follow the Android sensor framework so values line up with
//! what a Kotlin activity would compute with `SensorManager`.

use serde::{Deserialize, Serialize};

use crate::types::{RotationMatrix, Vec3, STANDARD_GRAVITY};

/// Why a rotation matrix could not be built this cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RejectReason {
    MissingAccel,
    MissingMag,
    /// A sample component is NaN or infinite.
    NonFinite,
    /// Gravity vector too short, device is (close to) free falling.
    FreeFall { gravity_norm_sq: f64 },
    /// Field too weak or parallel to gravity, east cannot be derived.
    WeakField { east_norm: f64 },
}

/// Gating constants for [`rotation_matrix`].
#[derive(Clone, Copy, Debug)]
pub struct RotationGate {
    /// Minimum |gravity|² as a fraction of g².
    pub free_fall_gravity_fraction: f64,
    /// Minimum norm of `mag × gravity`.
    pub min_field_strength: f64,
}

impl Default for RotationGate {
    fn default() -> Self {
        Self { free_fall_gravity_fraction: 0.01, min_field_strength: 0.1 }
    }
}

/// Build the device-to-world rotation matrix from the latest gravity and
/// geomagnetic vectors. Rows are east, north and up in device coordinates.
pub fn rotation_matrix(
    gravity: &Vec3,
    geomagnetic: &Vec3,
    gate: &RotationGate,
) -> Result<RotationMatrix, RejectReason> {
    if !gravity.iter().chain(geomagnetic.iter()).all(|v| v.is_finite()) {
        return Err(RejectReason::NonFinite);
    }

    let gravity_norm_sq = gravity.norm_squared();
    if gravity_norm_sq < gate.free_fall_gravity_fraction * STANDARD_GRAVITY * STANDARD_GRAVITY {
        return Err(RejectReason::FreeFall { gravity_norm_sq });
    }

    let east = geomagnetic.cross(gravity);
    let east_norm = east.norm();
    if east_norm < gate.min_field_strength {
        return Err(RejectReason::WeakField { east_norm });
    }

    let east = east / east_norm;
    let up = gravity / gravity_norm_sq.sqrt();
    let north = up.cross(&east);

    Ok(RotationMatrix::from_rows(&[east.transpose(), north.transpose(), up.transpose()]))
}

/// Signed device axis used as a remap target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
    MinusX,
    MinusY,
    MinusZ,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X | Axis::MinusX => 0,
            Axis::Y | Axis::MinusY => 1,
            Axis::Z | Axis::MinusZ => 2,
        }
    }

    fn is_negative(self) -> bool {
        matches!(self, Axis::MinusX | Axis::MinusY | Axis::MinusZ)
    }
}

/// Rotate the supplied matrix so that it is expressed in a different device
/// frame: the new X axis lies along `x_axis`, the new Y axis along `y_axis`.
/// The new Z axis is derived so the frame stays right-handed.
///
/// Returns `None` when both axes map to the same device axis.
pub fn remap_coordinate_system(
    r: &RotationMatrix,
    x_axis: Axis,
    y_axis: Axis,
) -> Option<RotationMatrix> {
    let x = x_axis.index();
    let y = y_axis.index();
    if x == y {
        return None;
    }
    let z = 3 - x - y;

    // (x, y, z) is a cyclic permutation of (0, 1, 2) exactly when x + 1 == y
    // modulo 3; otherwise the plain sign product yields a left-handed frame.
    let cyclic = (x + 1) % 3 == y;
    let z_negative = x_axis.is_negative() ^ y_axis.is_negative() ^ !cyclic;

    let sign = |negative: bool| if negative { -1.0 } else { 1.0 };
    let sx = sign(x_axis.is_negative());
    let sy = sign(y_axis.is_negative());
    let sz = sign(z_negative);

    let mut out = RotationMatrix::zeros();
    for row in 0..3 {
        out[(row, x)] = sx * r[(row, 0)];
        out[(row, y)] = sy * r[(row, 1)];
        out[(row, z)] = sz * r[(row, 2)];
    }
    Some(out)
}

/// Azimuth, pitch and roll in radians from a rotation matrix.
///
/// Azimuth is in `(-π, π]`, pitch in `[-π/2, π/2]`, roll in `(-π, π]`.
pub fn orientation_angles(r: &RotationMatrix) -> (f64, f64, f64) {
    let azimuth = r[(0, 1)].atan2(r[(1, 1)]);
    let pitch = (-r[(2, 1)]).clamp(-1.0, 1.0).asin();
    let roll = (-r[(2, 0)]).atan2(r[(2, 2)]);
    (azimuth, pitch, roll)
}

/// Wrap any angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest absolute distance between two headings, in `[0, 180]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = normalize_degrees(a - b);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    // Device flat on a table, top edge pointing at magnetic north.
    fn flat_north() -> (Vec3, Vec3) {
        (Vec3::new(0.0, 0.0, 9.81), Vec3::new(0.0, 22.0, -40.0))
    }

    #[test]
    fn test_flat_north_is_identity() {
        let (g, m) = flat_north();
        let r = rotation_matrix(&g, &m, &RotationGate::default()).unwrap();
        assert_relative_eq!(r, RotationMatrix::identity(), epsilon = 1e-9);

        let (azimuth, pitch, roll) = orientation_angles(&r);
        assert_abs_diff_eq!(azimuth, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pitch, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(roll, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_heading_east() {
        // Top edge pointing east: north lies along device -x.
        let g = Vec3::new(0.0, 0.0, 9.81);
        let m = Vec3::new(-22.0, 0.0, -40.0);
        let r = rotation_matrix(&g, &m, &RotationGate::default()).unwrap();
        let (azimuth, _, _) = orientation_angles(&r);
        assert_abs_diff_eq!(azimuth.to_degrees(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_matrix_is_orthonormal() {
        let g = Vec3::new(1.2, 3.4, 8.9);
        let m = Vec3::new(10.0, 15.0, -35.0);
        let r = rotation_matrix(&g, &m, &RotationGate::default()).unwrap();
        assert_relative_eq!(r * r.transpose(), RotationMatrix::identity(), epsilon = 1e-9);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_free_fall_rejected() {
        let g = Vec3::new(0.1, 0.0, 0.2);
        let m = Vec3::new(0.0, 22.0, -40.0);
        let result = rotation_matrix(&g, &m, &RotationGate::default());
        assert!(matches!(result, Err(RejectReason::FreeFall { .. })));
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        let g = Vec3::new(0.0, 0.0, 9.81);
        let m = Vec3::new(0.0, 22.0, -40.0);
        let gate = RotationGate::default();
        assert_eq!(
            rotation_matrix(&g, &Vec3::new(f64::NAN, 22.0, -40.0), &gate),
            Err(RejectReason::NonFinite)
        );
        assert_eq!(
            rotation_matrix(&Vec3::new(0.0, f64::INFINITY, 9.81), &m, &gate),
            Err(RejectReason::NonFinite)
        );
    }

    #[test]
    fn test_zeroed_field_rejected() {
        let (g, _) = flat_north();
        let result = rotation_matrix(&g, &Vec3::zeros(), &RotationGate::default());
        assert!(matches!(result, Err(RejectReason::WeakField { .. })));
    }

    #[test]
    fn test_field_parallel_to_gravity_rejected() {
        let g = Vec3::new(0.0, 0.0, 9.81);
        let m = Vec3::new(0.0, 0.0, -45.0);
        let result = rotation_matrix(&g, &m, &RotationGate::default());
        assert!(matches!(result, Err(RejectReason::WeakField { .. })));
    }

    fn sample_matrix() -> RotationMatrix {
        RotationMatrix::new(
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
            7.0, 8.0, 9.0,
        )
    }

    #[test]
    fn test_remap_identity_axes_is_clone() {
        let r = sample_matrix();
        assert_eq!(remap_coordinate_system(&r, Axis::X, Axis::Y), Some(r));
    }

    #[test]
    fn test_remap_y_minus_x() {
        let r = sample_matrix();
        let out = remap_coordinate_system(&r, Axis::Y, Axis::MinusX).unwrap();
        // column 1 <- +col 0, column 0 <- -col 1, column 2 unchanged
        let expected = RotationMatrix::new(
            -2.0, 1.0, 3.0,
            -5.0, 4.0, 6.0,
            -8.0, 7.0, 9.0,
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_remap_minus_x_minus_y() {
        let r = sample_matrix();
        let out = remap_coordinate_system(&r, Axis::MinusX, Axis::MinusY).unwrap();
        let expected = RotationMatrix::new(
            -1.0, -2.0, 3.0,
            -4.0, -5.0, 6.0,
            -7.0, -8.0, 9.0,
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_remap_minus_y_x() {
        let r = sample_matrix();
        let out = remap_coordinate_system(&r, Axis::MinusY, Axis::X).unwrap();
        let expected = RotationMatrix::new(
            2.0, -1.0, 3.0,
            5.0, -4.0, 6.0,
            8.0, -7.0, 9.0,
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_remap_keeps_right_handed_frame() {
        let g = Vec3::new(0.5, 6.0, 7.5);
        let m = Vec3::new(5.0, 20.0, -38.0);
        let r = rotation_matrix(&g, &m, &RotationGate::default()).unwrap();
        let pairs = [
            (Axis::X, Axis::Z),
            (Axis::Z, Axis::X),
            (Axis::Y, Axis::Z),
            (Axis::MinusZ, Axis::Y),
            (Axis::MinusY, Axis::MinusZ),
        ];
        for (x, y) in pairs {
            let out = remap_coordinate_system(&r, x, y).unwrap();
            assert_relative_eq!(out.determinant(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_remap_same_axis_rejected() {
        let r = sample_matrix();
        assert!(remap_coordinate_system(&r, Axis::X, Axis::MinusX).is_none());
        assert!(remap_coordinate_system(&r, Axis::Z, Axis::Z).is_none());
    }

    #[test]
    fn test_normalize_degrees_range() {
        for raw in [-720.5, -360.0, -180.0, -1e-15, 0.0, 45.0, 359.999, 360.0, 725.0] {
            let n = normalize_degrees(raw);
            assert!((0.0..360.0).contains(&n), "{raw} -> {n}");
        }
        assert_abs_diff_eq!(normalize_degrees(-90.0), 270.0);
        assert_abs_diff_eq!(normalize_degrees(450.0), 90.0);
    }

    #[test]
    fn test_angular_distance_wraps() {
        assert_abs_diff_eq!(angular_distance(350.0, 5.0), 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angular_distance(5.0, 350.0), 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angular_distance(10.0, 190.0), 180.0, epsilon = 1e-9);
    }
}
