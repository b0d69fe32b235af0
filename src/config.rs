use crate::error::Error;
use serde_derive::{Deserialize, Serialize};
use std::io::Read;

/// Tuning constants of the detector.
///
/// Defaults are the values calibrated for an 800x600 roadside view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub frame_width: u32,
    pub frame_height: u32,

    /// Blobs with a smaller contour area (px^2) are ignored
    pub min_contour_area: f32,
    /// Accepted width/height range, both bounds exclusive
    pub min_aspect_ratio: f32,
    pub max_aspect_ratio: f32,

    /// A candidate joins a track only when their IoU is strictly above this
    pub iou_threshold: f32,

    pub meters_per_pixel: f32,
    /// Seconds a track must be observed before its speed is reported
    pub min_speed_time: f64,
    /// km/h
    pub max_speed: f32,
    /// Number of recent centre points the travelled distance is measured over
    pub position_window: usize,
    /// Upper bound of centre points kept per track
    pub position_retention: usize,
    /// Number of raw speed estimates averaged for display
    pub speed_window: usize,

    /// Seconds without a match after which a track is dropped
    pub staleness: f64,
    /// Counting line as a fraction of the frame height
    pub line_position: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_width: 800,
            frame_height: 600,
            min_contour_area: 4305.0,
            min_aspect_ratio: 0.4,
            max_aspect_ratio: 2.5,
            iou_threshold: 0.45,
            meters_per_pixel: 0.018_011_44,
            min_speed_time: 0.5,
            max_speed: 120.0,
            position_window: 10,
            position_retention: 64,
            speed_window: 5,
            staleness: 1.0,
            line_position: 0.5,
        }
    }
}

impl Config {
    pub fn from_json_str(src: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;

        Ok(config)
    }

    #[inline]
    pub fn dims(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Y coordinate of the counting line in pixels.
    #[inline]
    pub fn line_y(&self) -> f32 {
        self.frame_height as f32 * self.line_position
    }

    pub fn validate(&self) -> Result<(), Error> {
        fn invalid(msg: String) -> Result<(), Error> {
            Err(Error::InvalidConfig(msg))
        }

        if self.frame_width == 0 || self.frame_height == 0 {
            return invalid(format!(
                "frame dimensions must be positive, got {}x{}",
                self.frame_width, self.frame_height
            ));
        }

        if !(self.min_contour_area >= 0.0) {
            return invalid(format!(
                "min_contour_area must be non-negative, got {}",
                self.min_contour_area
            ));
        }

        if !(self.min_aspect_ratio >= 0.0 && self.min_aspect_ratio < self.max_aspect_ratio) {
            return invalid(format!(
                "aspect ratio range ({}, {}) is empty",
                self.min_aspect_ratio, self.max_aspect_ratio
            ));
        }

        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return invalid(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            ));
        }

        if !(self.meters_per_pixel > 0.0) {
            return invalid(format!(
                "meters_per_pixel must be positive, got {}",
                self.meters_per_pixel
            ));
        }

        if !(self.min_speed_time >= 0.0) {
            return invalid(format!(
                "min_speed_time must be non-negative, got {}",
                self.min_speed_time
            ));
        }

        if !(self.max_speed > 0.0) {
            return invalid(format!(
                "max_speed must be positive, got {}",
                self.max_speed
            ));
        }

        if self.position_window < 2 {
            return invalid(format!(
                "position_window must hold at least two points, got {}",
                self.position_window
            ));
        }

        if self.position_retention < self.position_window {
            return invalid(format!(
                "position_retention {} is smaller than position_window {}",
                self.position_retention, self.position_window
            ));
        }

        if self.speed_window == 0 {
            return invalid("speed_window must be positive".to_string());
        }

        if !(self.staleness > 0.0) {
            return invalid(format!(
                "staleness must be positive, got {}",
                self.staleness
            ));
        }

        if !(0.0..=1.0).contains(&self.line_position) {
            return invalid(format!(
                "line_position must be within [0, 1], got {}",
                self.line_position
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.line_y(), 300.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{ "iou_threshold": 0.3, "frame_height": 480 }"#)
            .expect("valid config");

        assert_eq!(config.iou_threshold, 0.3);
        assert_eq!(config.frame_height, 480);
        assert_eq!(config.frame_width, 800);
        assert_eq!(config.position_window, 10);
    }

    #[test]
    fn test_rejects_inverted_aspect_range() {
        let err = Config::from_json_str(r#"{ "min_aspect_ratio": 3.0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_short_retention() {
        let config = Config {
            position_window: 10,
            position_retention: 5,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Config::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
