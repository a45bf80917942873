//! Linear algebra aliases shared by the fusion core.
//!
//! Sensor vectors are in the device frame (x right, y up the screen, z out
//! of the screen). Rotation matrices map device coordinates to the world
//! frame (x east, y magnetic north, z up).

use nalgebra::{Matrix3, Vector3};

/// Standard gravity used for the free-fall gate (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.80665;

pub type Vec3 = Vector3<f64>;
pub type RotationMatrix = Matrix3<f64>;

