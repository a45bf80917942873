//! Physical screen rotation tracking.
//!
//! Buckets the continuous orientation angle reported by the platform into
//! the four screen rotations. Angles between buckets are dead zones that keep
//! the previous rotation, so the state does not flicker near a boundary.

use serde::{Deserialize, Serialize};

use crate::rotation::Axis;

/// Discrete physical screen rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceRotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl DeviceRotation {
    /// Map an Android `Surface.ROTATION_*` code (0..=3).
    pub fn from_surface_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(DeviceRotation::Rotation0),
            1 => Some(DeviceRotation::Rotation90),
            2 => Some(DeviceRotation::Rotation180),
            3 => Some(DeviceRotation::Rotation270),
            _ => None,
        }
    }

    pub fn surface_code(self) -> i32 {
        match self {
            DeviceRotation::Rotation0 => 0,
            DeviceRotation::Rotation90 => 1,
            DeviceRotation::Rotation180 => 2,
            DeviceRotation::Rotation270 => 3,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            DeviceRotation::Rotation0 => 0,
            DeviceRotation::Rotation90 => 90,
            DeviceRotation::Rotation180 => 180,
            DeviceRotation::Rotation270 => 270,
        }
    }

    /// New (X, Y) axes that keep "up" on screen consistent for this rotation.
    /// `None` means the matrix is used as-is.
    pub fn remap_axes(self) -> Option<(Axis, Axis)> {
        match self {
            DeviceRotation::Rotation0 => None,
            DeviceRotation::Rotation90 => Some((Axis::Y, Axis::MinusX)),
            DeviceRotation::Rotation180 => Some((Axis::MinusX, Axis::MinusY)),
            DeviceRotation::Rotation270 => Some((Axis::MinusY, Axis::X)),
        }
    }

    /// Bucket a raw orientation angle. `None` for dead zones and angles
    /// past a full turn.
    pub fn classify(degrees: u32) -> Option<Self> {
        match degrees {
            0..=9 | 351..=360 => Some(DeviceRotation::Rotation0),
            81..=99 => Some(DeviceRotation::Rotation90),
            171..=189 => Some(DeviceRotation::Rotation180),
            261..=279 => Some(DeviceRotation::Rotation270),
            _ => None,
        }
    }
}

/// Holds the last known rotation and applies raw orientation callbacks.
#[derive(Clone, Debug, Default)]
pub struct OrientationTracker {
    current: DeviceRotation,
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> DeviceRotation {
        self.current
    }

    /// Feed one orientation callback. Returns the new rotation when it
    /// changed; unknown readings and dead-zone angles keep the old value.
    pub fn update(&mut self, degrees: Option<u32>) -> Option<DeviceRotation> {
        let Some(degrees) = degrees else {
            log::trace!("orientation unknown (device flat), keeping {:?}", self.current);
            return None;
        };
        let next = DeviceRotation::classify(degrees)?;
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }

    /// Force a rotation, e.g. when the host reports `Display.getRotation()`.
    pub fn set(&mut self, rotation: DeviceRotation) -> Option<DeviceRotation> {
        if rotation == self.current {
            return None;
        }
        self.current = rotation;
        Some(rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        use DeviceRotation::*;
        let cases = [
            (0, Some(Rotation0)),
            (9, Some(Rotation0)),
            (10, None),
            (80, None),
            (81, Some(Rotation90)),
            (99, Some(Rotation90)),
            (100, None),
            (170, None),
            (171, Some(Rotation180)),
            (189, Some(Rotation180)),
            (190, None),
            (260, None),
            (261, Some(Rotation270)),
            (279, Some(Rotation270)),
            (280, None),
            (349, None),
            (350, None),
            (351, Some(Rotation0)),
            (359, Some(Rotation0)),
            (361, None),
        ];
        for (degrees, expected) in cases {
            assert_eq!(DeviceRotation::classify(degrees), expected, "angle {degrees}");
        }
    }

    #[test]
    fn test_dead_zone_keeps_previous() {
        let mut tracker = OrientationTracker::new();
        assert_eq!(tracker.update(Some(90)), Some(DeviceRotation::Rotation90));
        assert_eq!(tracker.update(Some(100)), None);
        assert_eq!(tracker.update(Some(130)), None);
        assert_eq!(tracker.current(), DeviceRotation::Rotation90);
        assert_eq!(tracker.update(Some(175)), Some(DeviceRotation::Rotation180));
    }

    #[test]
    fn test_unknown_keeps_previous() {
        let mut tracker = OrientationTracker::new();
        tracker.update(Some(270));
        assert_eq!(tracker.update(None), None);
        assert_eq!(tracker.current(), DeviceRotation::Rotation270);
    }

    #[test]
    fn test_same_bucket_is_not_a_change() {
        let mut tracker = OrientationTracker::new();
        assert_eq!(tracker.update(Some(5)), None);
        assert_eq!(tracker.update(Some(355)), None);
        assert_eq!(tracker.current(), DeviceRotation::Rotation0);
    }

    #[test]
    fn test_surface_codes() {
        for code in 0..4 {
            let rotation = DeviceRotation::from_surface_code(code).unwrap();
            assert_eq!(rotation.surface_code(), code);
        }
        assert_eq!(DeviceRotation::from_surface_code(4), None);
        assert_eq!(DeviceRotation::from_surface_code(-1), None);
    }

    #[test]
    fn test_remap_table() {
        assert_eq!(DeviceRotation::Rotation0.remap_axes(), None);
        assert_eq!(DeviceRotation::Rotation90.remap_axes(), Some((Axis::Y, Axis::MinusX)));
        assert_eq!(DeviceRotation::Rotation180.remap_axes(), Some((Axis::MinusX, Axis::MinusY)));
        assert_eq!(DeviceRotation::Rotation270.remap_axes(), Some((Axis::MinusY, Axis::X)));
    }
}
