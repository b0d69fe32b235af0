use crate::config::Config;
use crate::math;
use crate::track::Track;

const MPS_TO_KMH: f32 = 3.6;

/// Turns a track's recent centre points into a smoothed km/h reading.
///
/// Distance is the path length over the last `position_window` centres,
/// divided by the whole observation time of the track. The raw value is
/// pushed into the track's speed history and the history mean, clamped to
/// `max_speed`, is reported.
#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    meters_per_pixel: f32,
    min_elapsed: f64,
    max_speed: f32,
    position_window: usize,
}

impl SpeedEstimator {
    pub fn new(
        meters_per_pixel: f32,
        min_elapsed: f64,
        max_speed: f32,
        position_window: usize,
    ) -> Self {
        Self {
            meters_per_pixel,
            min_elapsed,
            max_speed,
            position_window,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.meters_per_pixel,
            config.min_speed_time,
            config.max_speed,
            config.position_window,
        )
    }

    /// Raw speed of the track in km/h, `None` while it cannot be measured yet.
    pub fn measure(&self, track: &Track) -> Option<f32> {
        if track.positions.len() < self.position_window {
            return None;
        }

        let elapsed = track.age();
        if elapsed <= self.min_elapsed || elapsed <= 0.0 {
            return None;
        }

        let pixels = math::path_length(track.positions.recent(self.position_window));
        let meters = pixels * self.meters_per_pixel;

        Some(meters / elapsed as f32 * MPS_TO_KMH)
    }

    /// Updates the track's speed history and returns the displayed speed.
    ///
    /// Returns `0.0` without touching the history until the track has enough
    /// positions and has been observed for longer than the minimum time.
    pub fn estimate(&self, track: &mut Track) -> f32 {
        match self.measure(track) {
            Some(raw) => {
                let speed = track.speeds.push(raw).min(self.max_speed);
                track.speed = Some(speed);
                speed
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use crate::track::TrackId;
    use approx::assert_abs_diff_eq;

    fn estimator() -> SpeedEstimator {
        SpeedEstimator::new(0.1, 0.5, 120.0, 10)
    }

    fn track_moving(frames: usize, dy: f32, dt: f64) -> Track {
        let mut track = Track::new(TrackId(1), 0.0, BBox::ltwh(100.0, 0.0, 40.0, 40.0), 64, 5);
        for i in 1..frames {
            track.update(i as f64 * dt, BBox::ltwh(100.0, i as f32 * dy, 40.0, 40.0));
        }

        track
    }

    #[test]
    fn test_too_few_positions() {
        let est = estimator();
        let mut track = track_moving(9, 10.0, 0.1);

        assert_eq!(est.measure(&track), None);
        assert_eq!(est.estimate(&mut track), 0.0);
        assert!(track.speeds.is_empty());
    }

    #[test]
    fn test_too_little_time() {
        let est = estimator();
        // 10 positions within 0.45s
        let mut track = track_moving(10, 10.0, 0.05);

        assert_eq!(est.estimate(&mut track), 0.0);
    }

    #[test]
    fn test_windowed_distance_over_elapsed_time() {
        let est = estimator();
        // 10 positions, 9 steps of 10px, observed for 0.9s
        let mut track = track_moving(10, 10.0, 0.1);

        // 90px * 0.1 m/px / 0.9s = 10 m/s = 36 km/h
        assert_abs_diff_eq!(est.estimate(&mut track), 36.0, epsilon = 1e-3);
        assert_eq!(track.speeds.len(), 1);
    }

    #[test]
    fn test_only_recent_window_contributes() {
        let est = estimator();
        let mut track = Track::new(TrackId(1), 0.0, BBox::ltwh(0.0, 0.0, 40.0, 40.0), 64, 5);
        // a long jump that falls out of the 10 point window
        track.update(0.1, BBox::ltwh(0.0, 500.0, 40.0, 40.0));
        for i in 2..12 {
            track.update(i as f64 * 0.1, BBox::ltwh(0.0, 500.0 + (i - 1) as f32 * 10.0, 40.0, 40.0));
        }

        // 90px * 0.1 / 1.1s * 3.6
        assert_abs_diff_eq!(est.estimate(&mut track), 90.0 * 0.1 / 1.1 * 3.6, epsilon = 1e-3);
    }

    #[test]
    fn test_stationary_track_has_zero_speed() {
        let est = estimator();
        let mut track = track_moving(10, 0.0, 0.1);

        assert_eq!(est.estimate(&mut track), 0.0);
        assert_eq!(track.speeds.len(), 1);
    }

    #[test]
    fn test_speed_is_smoothed() {
        let est = estimator();
        let mut track = track_moving(10, 10.0, 0.1);

        let first = est.estimate(&mut track);
        // a repeated position lowers the next raw value
        track.update(1.0, BBox::ltwh(100.0, 90.0, 40.0, 40.0));
        let raw = est.measure(&track).unwrap();
        let smoothed = est.estimate(&mut track);

        assert!(raw < first);
        assert_abs_diff_eq!(smoothed, (first + raw) / 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_speed_is_clamped() {
        let est = SpeedEstimator::new(1.0, 0.5, 120.0, 10);
        let mut track = track_moving(10, 100.0, 0.1);

        assert_eq!(est.estimate(&mut track), 120.0);
        assert_eq!(track.speed(), Some(120.0));
        // the history itself keeps the raw values
        assert!(track.speeds.average().unwrap() > 120.0);
    }

    #[test]
    fn test_track_speed_follows_estimate() {
        let est = estimator();
        let mut track = track_moving(9, 10.0, 0.1);

        est.estimate(&mut track);
        assert_eq!(track.speed(), None);

        track.update(0.9, BBox::ltwh(100.0, 90.0, 40.0, 40.0));
        let shown = est.estimate(&mut track);
        assert_eq!(track.speed(), Some(shown));
    }
}
