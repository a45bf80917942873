//! Output side of the helper: where fused estimates go.

use crossbeam::channel::{Sender, TrySendError};

use crate::types::OrientationEstimate;

/// Receives every fused estimate, in order.
pub trait OrientationSink {
    fn on_orientation(&mut self, estimate: OrientationEstimate);
}

impl<F> OrientationSink for F
where
    F: FnMut(OrientationEstimate),
{
    fn on_orientation(&mut self, estimate: OrientationEstimate) {
        self(estimate)
    }
}

/// Forwards estimates over a crossbeam channel. A full channel drops the
/// estimate; a newer one follows shortly at sensor rate.
pub struct ChannelSink {
    tx: Sender<OrientationEstimate>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(tx: Sender<OrientationEstimate>) -> Self {
        Self { tx, dropped: 0 }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl OrientationSink for ChannelSink {
    fn on_orientation(&mut self, estimate: OrientationEstimate) {
        match self.tx.try_send(estimate) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                log::debug!("orientation receiver gone, dropping estimate");
            }
        }
    }
}

/// Keeps only the newest estimate until it is taken.
#[derive(Debug, Default)]
pub struct LatestSink {
    latest: Option<OrientationEstimate>,
}

impl LatestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Option<OrientationEstimate> {
        self.latest.take()
    }
}

impl OrientationSink for LatestSink {
    fn on_orientation(&mut self, estimate: OrientationEstimate) {
        self.latest = Some(estimate);
    }
}
