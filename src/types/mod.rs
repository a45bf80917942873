pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccelData {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelData {
    pub fn new(timestamp: f64, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp, x, y, z }
    }

    pub fn vector(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MagData {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MagData {
    pub fn new(timestamp: f64, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp, x, y, z }
    }

    pub fn vector(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Which hardware stream a sample came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    Magnetometer,
    Orientation,
}

/// One callback from the host platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorReading {
    Accel(AccelData),
    Mag(MagData),
    /// Raw device orientation in degrees; `None` when the device lies flat.
    Orientation { degrees: Option<u32> },
}

impl SensorReading {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorReading::Accel(_) => SensorKind::Accelerometer,
            SensorReading::Mag(_) => SensorKind::Magnetometer,
            SensorReading::Orientation { .. } => SensorKind::Orientation,
        }
    }
}

/// Fused orientation in degrees.
///
/// `azimuth_deg` is a compass heading in `[0, 360)`; pitch and roll keep the
/// signed ranges produced by the rotation matrix (`[-90, 90]` and
/// `[-180, 180]`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientationEstimate {
    pub timestamp: f64,
    pub azimuth_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
}

impl OrientationEstimate {
    pub fn as_triple(&self) -> (f64, f64, f64) {
        (self.azimuth_deg, self.pitch_deg, self.roll_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_kind() {
        let accel = SensorReading::Accel(AccelData::new(0.0, 0.0, 0.0, 9.8));
        assert_eq!(accel.kind(), SensorKind::Accelerometer);
        let flat = SensorReading::Orientation { degrees: None };
        assert_eq!(flat.kind(), SensorKind::Orientation);
    }

    #[test]
    fn test_reading_json_shape() {
        let json = r#"{"kind":"mag","timestamp":1.5,"x":0.0,"y":22.0,"z":-40.0}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading, SensorReading::Mag(MagData::new(1.5, 0.0, 22.0, -40.0)));

        let json = r#"{"kind":"orientation","degrees":null}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading, SensorReading::Orientation { degrees: None });
    }
}
