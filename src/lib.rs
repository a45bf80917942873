//! Tilt visualisation core: fuses accelerometer and magnetometer samples
//! into a smoothed (azimuth, pitch, roll) estimate, corrected for the
//! physical screen rotation.

pub mod config;
pub mod error;
pub mod helper;
pub mod orientation_tracker;
pub mod recording;
pub mod rotation;
pub mod sensor_fusion;
pub mod sensors;
pub mod sink;
pub mod smoothing;
pub mod spots;
pub mod types;

pub use config::FusionConfig;
pub use error::{Result, TiltError};
pub use helper::{HelperState, SensorAvailability, SensorHelper, Subscriptions};
pub use orientation_tracker::{DeviceRotation, OrientationTracker};
pub use sensor_fusion::{FusionEvent, SensorFusion};
pub use sink::{ChannelSink, LatestSink, OrientationSink};
pub use spots::SpotAlphas;
pub use types::{AccelData, MagData, OrientationEstimate, SensorReading};
