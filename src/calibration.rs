use crate::config::Config;
use crate::error::Error;
use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::io::Read;

/// Share of a reference vehicle's box area required from a blob.
pub const MIN_AREA_RATIO: f32 = 0.7;

/// Scene constants measured on a reference frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Calibration {
    pub meters_per_pixel: f32,
    pub vehicle_width: f32,
    pub vehicle_height: f32,
    pub min_area: f32,
}

/// Meters per pixel from two image points a known distance apart.
pub fn distance_scale(
    p1: na::Point2<f32>,
    p2: na::Point2<f32>,
    reference_meters: f32,
) -> Result<f32, Error> {
    if !(reference_meters > 0.0) {
        return Err(Error::Calibration(format!(
            "reference distance must be positive, got {}",
            reference_meters
        )));
    }

    let pixels = na::distance(&p1, &p2);
    if !(pixels > 0.0) {
        return Err(Error::Calibration(
            "reference points coincide".to_string(),
        ));
    }

    Ok(reference_meters / pixels)
}

/// Minimum blob area derived from the box of a typical vehicle.
pub fn vehicle_area(width: f32, height: f32) -> Result<f32, Error> {
    if !(width > 0.0 && height > 0.0) {
        return Err(Error::Calibration(format!(
            "vehicle box must be non-empty, got {}x{}",
            width, height
        )));
    }

    Ok(width * height * MIN_AREA_RATIO)
}

impl Calibration {
    pub fn measure(
        p1: na::Point2<f32>,
        p2: na::Point2<f32>,
        reference_meters: f32,
        vehicle_width: f32,
        vehicle_height: f32,
    ) -> Result<Self, Error> {
        Ok(Self {
            meters_per_pixel: distance_scale(p1, p2, reference_meters)?,
            vehicle_width,
            vehicle_height,
            min_area: vehicle_area(vehicle_width, vehicle_height)?,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Writes the measured scale and area threshold into `config`.
    pub fn apply(&self, config: &mut Config) -> Result<(), Error> {
        if !(self.meters_per_pixel > 0.0 && self.min_area > 0.0) {
            return Err(Error::Calibration(
                "calibration is incomplete".to_string(),
            ));
        }

        config.meters_per_pixel = self.meters_per_pixel;
        config.min_contour_area = self.min_area;

        config.validate()
    }
}
