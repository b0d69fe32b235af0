use crate::bbox::{BBox, Ltwh};
use crate::circular_queue::CircularQueue;
use crate::rolling_avg::RollingAvg;
use nalgebra as na;
use serde_derive::Serialize;
use std::fmt;

#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle_{}", self.0)
    }
}

/// One vehicle currently under observation.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub bbox: BBox<Ltwh>,

    // top edge, px
    pub y: f32,
    pub prev_y: f32,

    // box centres, oldest first
    pub positions: CircularQueue<na::Point2<f32>>,
    // raw speed estimates in km/h
    pub speeds: RollingAvg,
    // last reported speed, clamped
    pub speed: Option<f32>,

    pub counted: bool,

    // in seconds
    pub first_seen: f64,
    pub last_seen: f64,
}

impl Track {
    pub fn new(
        id: TrackId,
        ts: f64,
        bbox: BBox<Ltwh>,
        position_retention: usize,
        speed_window: usize,
    ) -> Self {
        let mut positions = CircularQueue::with_capacity(position_retention);
        positions.push(bbox.center());

        Self {
            id,
            bbox,
            y: bbox.top(),
            prev_y: bbox.top(),
            positions,
            speeds: RollingAvg::new(speed_window),
            speed: None,
            counted: false,
            first_seen: ts,
            last_seen: ts,
        }
    }

    /// Moves the track onto a newly matched box.
    pub fn update(&mut self, ts: f64, bbox: BBox<Ltwh>) {
        self.bbox = bbox;
        self.prev_y = self.y;
        self.y = bbox.top();
        self.positions.push(bbox.center());
        self.last_seen = ts;
    }

    /// True when the top edge went from strictly above `line_y` to on or below it.
    #[inline]
    pub fn crossed(&self, line_y: f32) -> bool {
        self.prev_y < line_y && self.y >= line_y
    }

    /// Most recent box centre.
    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        self.positions.last().copied().unwrap_or_else(|| self.bbox.center())
    }

    #[inline]
    pub fn age(&self) -> f64 {
        self.last_seen - self.first_seen
    }

    #[inline]
    pub fn time_since_update(&self, now: f64) -> f64 {
        now - self.last_seen
    }

    /// Last displayed speed in km/h, `None` before the first measurement.
    #[inline]
    pub fn speed(&self) -> Option<f32> {
        self.speed
    }
}
