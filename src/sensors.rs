//! Synthetic sensor streams for running the helper without hardware.
//!
//! Each stream is a tokio task that ticks at the normal sensor period and
//! pushes [`SensorReading`]s into a shared channel, the way the platform
//! delivers listener callbacks.

use std::f64::consts::PI;

use nalgebra::{Rotation3, Vector3};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;
use tokio::time::{interval, Duration};

use crate::helper::SENSOR_DELAY_NORMAL_US;
use crate::types::{AccelData, MagData, SensorReading, Vec3, STANDARD_GRAVITY};

/// Earth field in world coordinates (east, north, up), µT.
const EARTH_FIELD: [f64; 3] = [0.0, 22.0, -40.0];

/// Scripted device motion: a slow turn plus a gentle rocking tilt.
#[derive(Clone, Copy, Debug)]
pub struct SyntheticMotion {
    /// Heading sweep rate, degrees per second.
    pub yaw_rate_dps: f64,
    /// Peak pitch / roll, degrees.
    pub tilt_amplitude_deg: f64,
    /// Tilt oscillation period, seconds.
    pub tilt_period_secs: f64,
    /// Peak sensor noise added to every axis.
    pub noise: f64,
    /// Rotate the screen a quarter turn every this many seconds; 0 disables.
    pub screen_turn_secs: f64,
}

impl Default for SyntheticMotion {
    fn default() -> Self {
        Self {
            yaw_rate_dps: 6.0,
            tilt_amplitude_deg: 25.0,
            tilt_period_secs: 8.0,
            noise: 0.05,
            screen_turn_secs: 0.0,
        }
    }
}

impl SyntheticMotion {
    /// (heading, pitch, roll) in degrees at `t` seconds.
    pub fn attitude(&self, t: f64) -> (f64, f64, f64) {
        let phase = 2.0 * PI * t / self.tilt_period_secs;
        (
            (self.yaw_rate_dps * t).rem_euclid(360.0),
            self.tilt_amplitude_deg * phase.sin(),
            self.tilt_amplitude_deg * (0.5 * phase).cos(),
        )
    }

    /// Device-from-world rotation for `t`.
    fn world_to_device(&self, t: f64) -> Rotation3<f64> {
        let (heading, pitch, roll) = self.attitude(t);
        let device_to_world = Rotation3::from_axis_angle(&Vector3::z_axis(), -heading.to_radians())
            * Rotation3::from_axis_angle(&Vector3::x_axis(), pitch.to_radians())
            * Rotation3::from_axis_angle(&Vector3::y_axis(), roll.to_radians());
        device_to_world.inverse()
    }

    fn noise_at(&self, t: f64, axis: f64) -> f64 {
        self.noise * (t * 37.0 + axis * 11.0).sin() * (t * 13.0 + axis).cos()
    }

    fn noisy(&self, v: Vec3, t: f64) -> Vec3 {
        Vec3::new(
            v.x + self.noise_at(t, 0.0),
            v.y + self.noise_at(t, 1.0),
            v.z + self.noise_at(t, 2.0),
        )
    }

    pub fn accel_at(&self, t: f64, timestamp: f64) -> AccelData {
        let v = self.noisy(self.world_to_device(t) * Vec3::new(0.0, 0.0, STANDARD_GRAVITY), t);
        AccelData::new(timestamp, v.x, v.y, v.z)
    }

    pub fn mag_at(&self, t: f64, timestamp: f64) -> MagData {
        let field = Vec3::new(EARTH_FIELD[0], EARTH_FIELD[1], EARTH_FIELD[2]);
        let v = self.noisy(self.world_to_device(t) * field, t + 0.5);
        MagData::new(timestamp, v.x, v.y, v.z)
    }

    /// Raw orientation angle the platform would report at `t`.
    pub fn orientation_at(&self, t: f64) -> Option<u32> {
        let (_, pitch, roll) = self.attitude(t);
        if pitch.abs() < 5.0 && roll.abs() < 5.0 {
            // lying flat, orientation undetectable
            return None;
        }
        if self.screen_turn_secs <= 0.0 {
            return Some(0);
        }
        let quarter_turns = (t / self.screen_turn_secs).floor() as u32 % 4;
        Some(quarter_turns * 90)
    }
}

fn sensor_period() -> Duration {
    Duration::from_micros(SENSOR_DELAY_NORMAL_US as u64)
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Push one reading; returns false once the consumer is gone.
fn deliver(
    tx: &Sender<SensorReading>,
    reading: SensorReading,
    name: &str,
    count: &mut u64,
) -> bool {
    match tx.try_send(reading) {
        Ok(()) => {
            *count += 1;
            if *count % 100 == 0 {
                log::debug!("[{name}] {count} samples");
            }
            true
        }
        Err(TrySendError::Closed(_)) => {
            log::debug!("[{name}] channel closed after {count} samples");
            false
        }
        // Channel full, drop this sample
        Err(TrySendError::Full(_)) => true,
    }
}

pub async fn accel_loop(tx: Sender<SensorReading>, motion: SyntheticMotion) {
    let mut ticker = interval(sensor_period());
    let start = now_secs();
    let mut count = 0u64;
    loop {
        ticker.tick().await;
        let now = now_secs();
        let reading = SensorReading::Accel(motion.accel_at(now - start, now));
        if !deliver(&tx, reading, "accel", &mut count) {
            break;
        }
    }
}

pub async fn mag_loop(tx: Sender<SensorReading>, motion: SyntheticMotion) {
    let mut ticker = interval(sensor_period());
    let start = now_secs();
    let mut count = 0u64;
    loop {
        ticker.tick().await;
        let now = now_secs();
        let reading = SensorReading::Mag(motion.mag_at(now - start, now));
        if !deliver(&tx, reading, "mag", &mut count) {
            break;
        }
    }
}

pub async fn orientation_loop(tx: Sender<SensorReading>, motion: SyntheticMotion) {
    let mut ticker = interval(sensor_period());
    let start = now_secs();
    let mut count = 0u64;
    loop {
        ticker.tick().await;
        let reading =
            SensorReading::Orientation { degrees: motion.orientation_at(now_secs() - start) };
        if !deliver(&tx, reading, "orientation", &mut count) {
            break;
        }
    }
}
