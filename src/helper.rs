use serde::{Deserialize, Serialize};

use crate::config::FusionConfig;
use crate::error::{Result, TiltError};
use crate::orientation_tracker::DeviceRotation;
use crate::sensor_fusion::{FusionEvent, SensorFusion};
use crate::sink::OrientationSink;
use crate::types::{SensorKind, SensorReading};

/// Coarse "normal" sampling period requested for every sensor (µs).
pub const SENSOR_DELAY_NORMAL_US: u32 = 200_000;

/// Helper lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelperState {
    /// Created, no listeners registered
    Idle,
    /// Listeners registered, fusing samples
    Running,
}

/// What the host platform can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorAvailability {
    pub accelerometer: bool,
    pub magnetometer: bool,
    /// Whether the platform can detect physical orientation at all.
    pub orientation: bool,
}

impl SensorAvailability {
    pub fn all() -> Self {
        Self { accelerometer: true, magnetometer: true, orientation: true }
    }
}

/// Listener registrations held while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subscriptions {
    pub accelerometer: bool,
    pub magnetometer: bool,
    pub orientation: bool,
    pub sampling_period_us: u32,
}

impl Subscriptions {
    fn covers(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Accelerometer => self.accelerometer,
            SensorKind::Magnetometer => self.magnetometer,
            SensorKind::Orientation => self.orientation,
        }
    }
}

/// Start/stop lifecycle around the fusion core.
///
/// All fusion state lives only between `start` and `stop`; stopping drops it.
pub struct SensorHelper<S: OrientationSink> {
    config: FusionConfig,
    state: HelperState,
    subscriptions: Subscriptions,
    fusion: Option<SensorFusion>,
    sink: S,
}

impl<S: OrientationSink> SensorHelper<S> {
    pub fn new(config: FusionConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: HelperState::Idle,
            subscriptions: Subscriptions::default(),
            fusion: None,
            sink,
        })
    }

    /// Register listeners for whatever the platform offers (Idle → Running).
    pub fn start(&mut self, availability: SensorAvailability) -> Result<Subscriptions> {
        if self.state == HelperState::Running {
            return Err(TiltError::AlreadyRunning);
        }

        if !availability.accelerometer {
            log::warn!("accelerometer not available, orientation cannot be fused");
        }
        if !availability.magnetometer {
            log::warn!("magnetometer not available, orientation cannot be fused");
        }

        self.subscriptions = Subscriptions {
            accelerometer: availability.accelerometer,
            magnetometer: availability.magnetometer,
            orientation: self.config.enable_orientation && availability.orientation,
            sampling_period_us: SENSOR_DELAY_NORMAL_US,
        };
        self.fusion = Some(SensorFusion::new(self.config.clone()));
        self.state = HelperState::Running;

        log::info!("sensor helper started: {:?}", self.subscriptions);
        Ok(self.subscriptions)
    }

    /// Unregister everything and discard transient state (Running → Idle).
    pub fn stop(&mut self) -> Result<()> {
        if self.state != HelperState::Running {
            return Err(TiltError::NotRunning);
        }
        self.fusion = None;
        self.subscriptions = Subscriptions::default();
        self.state = HelperState::Idle;
        log::info!("sensor helper stopped");
        Ok(())
    }

    /// Route one platform callback through the core. Readings arriving while
    /// idle or from unsubscribed streams are ignored.
    pub fn handle(&mut self, reading: &SensorReading) -> Vec<FusionEvent> {
        if !self.subscriptions.covers(reading.kind()) {
            return Vec::new();
        }
        let Some(fusion) = self.fusion.as_mut() else {
            return Vec::new();
        };

        let events = match reading {
            SensorReading::Accel(accel) => fusion.feed_accel(accel),
            SensorReading::Mag(mag) => fusion.feed_mag(mag),
            SensorReading::Orientation { degrees } => fusion.feed_orientation(*degrees),
        };
        self.dispatch(&events);
        events
    }

    /// Apply a `Surface.ROTATION_*` code reported by the host display.
    pub fn set_display_rotation(&mut self, code: i32) -> Result<Vec<FusionEvent>> {
        let fusion = self.fusion.as_mut().ok_or(TiltError::NotRunning)?;
        let events = fusion.set_rotation_code(code);
        self.dispatch(&events);
        Ok(events)
    }

    fn dispatch(&mut self, events: &[FusionEvent]) {
        for event in events {
            match event {
                FusionEvent::Orientation(estimate) => self.sink.on_orientation(*estimate),
                FusionEvent::Rejected(reason) => log::debug!("fusion skipped: {:?}", reason),
                FusionEvent::AzimuthHeld { candidate_deg, held_deg } => {
                    log::trace!("azimuth held at {held_deg:.2}, candidate {candidate_deg:.2}")
                }
                FusionEvent::RotationChanged { from, to } => {
                    log::info!("device rotation {}° -> {}°", from.degrees(), to.degrees())
                }
            }
        }
    }

    pub fn state(&self) -> HelperState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == HelperState::Running
    }

    pub fn subscriptions(&self) -> Subscriptions {
        self.subscriptions
    }

    pub fn rotation(&self) -> Option<DeviceRotation> {
        self.fusion.as_ref().map(|f| f.rotation())
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
