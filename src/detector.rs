use crate::bbox::{BBox, Ltwh};
use crate::config::Config;
use crate::detection::BlobFilter;
use crate::error::Error;
use crate::frame::Frame;
use crate::math;
use crate::scene::TrackStore;
use crate::segmenter::Segmenter;
use crate::speed::SpeedEstimator;
use crate::stats::{StatsHandle, StatsSnapshot};
use crate::track::Track;
use crate::tracker::Tracker;

use log::{info, warn};

/// What a single frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    /// Accepted boxes, in segmentation order
    pub boxes: Vec<BBox<Ltwh>>,
    /// Speed per accepted box in km/h, or the last average when no box was accepted
    pub speeds: Vec<f32>,
    pub count: u64,
}

/// Counts and times vehicles passing a horizontal line.
///
/// Frames must be fed one at a time in timestamp order; the detector owns
/// all track state and hands out [`StatsHandle`]s for concurrent readers.
pub struct VehicleDetector {
    config: Config,
    filter: BlobFilter,
    store: TrackStore,
    tracker: Tracker,
    speed: SpeedEstimator,
    current_speeds: Vec<f32>,
    last_avg_speed: f32,
    stats: StatsHandle,
}

impl VehicleDetector {
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;

        let line_y = config.line_y();

        info!(
            "vehicle detector {}x{}, counting line at y={}",
            config.frame_width, config.frame_height, line_y
        );

        Ok(Self {
            filter: BlobFilter {
                min_area: config.min_contour_area,
                min_aspect_ratio: config.min_aspect_ratio,
                max_aspect_ratio: config.max_aspect_ratio,
            },
            store: TrackStore::new(config.position_retention, config.speed_window),
            tracker: Tracker::new(config.iou_threshold, line_y),
            speed: SpeedEstimator::from_config(&config),
            current_speeds: Vec::new(),
            last_avg_speed: 0.0,
            stats: StatsHandle::new(),
            config,
        })
    }

    /// Segments a raw frame and processes the resulting blobs.
    pub fn process_frame<S: Segmenter>(
        &mut self,
        segmenter: &mut S,
        frame: &S::Frame,
        timestamp: f64,
    ) -> Result<FrameResult, Error> {
        let dims = segmenter.dims(frame)?;
        self.check_dims(dims)?;

        let blobs = segmenter.segment(frame)?;

        self.process_blobs(&Frame::new(dims, timestamp, blobs))
    }

    /// Filters, tracks, times and counts the blobs of one frame.
    pub fn process_blobs(&mut self, frame: &Frame) -> Result<FrameResult, Error> {
        self.check_dims(frame.dims)?;

        let ts = frame.timestamp;
        let mut boxes = Vec::with_capacity(frame.len());
        let mut speeds = Vec::with_capacity(frame.len());

        for blob in frame.iter().filter(|b| self.filter.accepts(b)) {
            let bbox = blob.bbox();
            let assoc = self.tracker.associate(&mut self.store, ts, bbox);

            let speed = match self.store.get_mut(assoc.id) {
                Some(track) => self.speed.estimate(track),
                None => 0.0,
            };

            boxes.push(bbox);
            speeds.push(speed);
        }

        self.store.evict_stale(ts, self.config.staleness);

        if let Some(avg) = math::mean(speeds.iter()) {
            self.last_avg_speed = avg;
        }

        self.current_speeds = speeds.clone();

        let count = self.tracker.vehicle_count();
        self.stats.publish(StatsSnapshot::new(
            count,
            self.current_speeds.clone(),
            self.last_avg_speed,
            ts,
        ));

        let speeds = if speeds.is_empty() {
            vec![self.last_avg_speed]
        } else {
            speeds
        };

        Ok(FrameResult {
            boxes,
            speeds,
            count,
        })
    }

    fn check_dims(&self, actual: (u32, u32)) -> Result<(), Error> {
        let expected = self.config.dims();

        if actual != expected {
            warn!("rejecting frame {:?}, expected {:?}", actual, expected);

            return Err(Error::FrameDims { expected, actual });
        }

        Ok(())
    }

    /// Forgets all tracks and the count, e.g. when switching to another stream.
    pub fn reset(&mut self) {
        info!("resetting vehicle detector");

        self.store.clear();
        self.tracker.reset();
        self.current_speeds.clear();
        self.last_avg_speed = 0.0;
        self.stats.publish(StatsSnapshot::default());
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.tracker.vehicle_count()
    }

    /// Speeds of the boxes accepted in the last frame, empty if there were none.
    #[inline]
    pub fn current_speeds(&self) -> &[f32] {
        &self.current_speeds
    }

    #[inline]
    pub fn last_avg_speed(&self) -> f32 {
        self.last_avg_speed
    }

    #[inline]
    pub fn line_y(&self) -> f32 {
        self.tracker.line_y()
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.store.iter()
    }

    pub fn stats(&self) -> StatsHandle {
        self.stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Blob;

    fn detector() -> VehicleDetector {
        VehicleDetector::new(Config {
            min_contour_area: 1000.0,
            ..Config::default()
        })
        .unwrap()
    }

    fn frame(ts: f64, blobs: Vec<Blob>) -> Frame {
        Frame::new((800, 600), ts, blobs)
    }

    #[test]
    fn test_filters_blobs() {
        let mut det = detector();
        let res = det
            .process_blobs(&frame(
                0.0,
                vec![
                    Blob::from_box(100.0, 100.0, 60.0, 40.0),
                    // too small
                    Blob::from_box(300.0, 100.0, 20.0, 20.0),
                    // too tall
                    Blob::from_box(500.0, 100.0, 30.0, 120.0),
                ],
            ))
            .unwrap();

        assert_eq!(res.boxes, vec![BBox::ltwh(100.0, 100.0, 60.0, 40.0)]);
        assert_eq!(res.speeds, vec![0.0]);
        assert_eq!(det.tracks().count(), 1);
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let mut det = detector();
        let bad = Frame::new((640, 480), 0.0, vec![Blob::from_box(100.0, 100.0, 60.0, 40.0)]);

        let err = det.process_blobs(&bad).unwrap_err();
        assert!(matches!(
            err,
            Error::FrameDims {
                expected: (800, 600),
                actual: (640, 480)
            }
        ));
        assert_eq!(det.tracks().count(), 0);
    }

    #[test]
    fn test_empty_frame_reports_last_average() {
        let mut det = detector();

        // 10px per frame at 10 fps for one second
        for i in 0..11 {
            let y = 100.0 + i as f32 * 10.0;
            det.process_blobs(&frame(i as f64 * 0.1, vec![Blob::from_box(100.0, y, 60.0, 40.0)]))
                .unwrap();
        }

        let last = det.last_avg_speed();
        assert!(last > 0.0);

        let res = det.process_blobs(&frame(1.1, vec![])).unwrap();
        assert!(res.boxes.is_empty());
        assert_eq!(res.speeds, vec![last]);
        assert!(det.current_speeds().is_empty());
    }

    #[test]
    fn test_stats_follow_frames() {
        let mut det = detector();
        let stats = det.stats();

        det.process_blobs(&frame(0.0, vec![Blob::from_box(100.0, 100.0, 60.0, 40.0)]))
            .unwrap();

        let snap = stats.snapshot();
        assert_eq!(snap.count, 0);
        assert_eq!(snap.speeds, vec![0.0]);
        assert_eq!(snap.timestamp, 0.0);
    }

    #[test]
    fn test_reset() {
        let mut det = detector();
        for i in 0..30 {
            let y = 200.0 + i as f32 * 8.0;
            det.process_blobs(&frame(i as f64 * 0.05, vec![Blob::from_box(100.0, y, 60.0, 40.0)]))
                .unwrap();
        }
        assert_eq!(det.count(), 1);

        det.reset();
        assert_eq!(det.count(), 0);
        assert_eq!(det.tracks().count(), 0);
        assert_eq!(det.stats().count(), 0);
    }
}
