use parking_lot::RwLock;
use serde_derive::Serialize;
use std::sync::Arc;

/// Live counters as published after each processed frame.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    pub count: u64,
    pub speeds: Vec<f32>,
    /// Mean of `speeds`, rounded to two decimals
    pub average_speed: f32,
    /// Timestamp of the frame the snapshot was taken from, seconds
    pub timestamp: f64,
}

impl StatsSnapshot {
    pub fn new(count: u64, speeds: Vec<f32>, last_avg_speed: f32, timestamp: f64) -> Self {
        let average = crate::math::mean(speeds.iter()).unwrap_or(last_avg_speed);

        Self {
            count,
            speeds,
            average_speed: (average * 100.0).round() / 100.0,
            timestamp,
        }
    }
}

/// Shared read access to the detector's latest stats.
///
/// The detector replaces the whole snapshot at once, so a reader always
/// sees the state after some complete frame.
#[derive(Debug, Clone, Default)]
pub struct StatsHandle {
    inner: Arc<RwLock<StatsSnapshot>>,
}

impl StatsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.read().clone()
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.inner.read().count
    }

    pub(crate) fn publish(&self, snapshot: StatsSnapshot) {
        *self.inner.write() = snapshot;
    }
}
