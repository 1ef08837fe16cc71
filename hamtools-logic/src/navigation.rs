//! Great-circle navigation on a spherical earth.
//!
//! Everything in here is a pure function of its inputs. Callers recompute whenever the location,
//! target or heading changes, nothing is cached.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::GeoError,
    location::{GeoCoordinate, Heading},
};

/// Mean earth radius. The model is a sphere, which is off by a few tenths of a percent.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Wrap an angle into `[0, 360)`
pub(crate) fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs, and keeps the sign of -0.0
    if wrapped >= 360.0 { 0.0 } else { wrapped + 0.0 }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(from = "f64", into = "f64")]
/// A direction in degrees clockwise from true north, always in `[0, 360)`
pub struct Bearing(f64);

impl From<f64> for Bearing {
    fn from(degrees: f64) -> Self {
        Self::new(degrees)
    }
}

impl From<Bearing> for f64 {
    fn from(value: Bearing) -> Self {
        value.0
    }
}

impl Bearing {
    pub fn new(degrees: f64) -> Self {
        Self(normalize_degrees(degrees))
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    pub fn compass_point(&self) -> CompassPoint {
        bearing_to_direction(*self)
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
/// A great-circle distance in kilometers, between zero and half the earth's circumference
pub struct Distance(f64);

impl Distance {
    /// Furthest two points on the sphere can be apart
    pub const MAX_KM: f64 = std::f64::consts::PI * EARTH_RADIUS_KM;

    pub fn new(kilometers: f64) -> Result<Self, GeoError> {
        if (0.0..=Self::MAX_KM).contains(&kilometers) {
            Ok(Self(kilometers))
        } else {
            Err(GeoError::range("Distance", kilometers, 0.0, Self::MAX_KM))
        }
    }

    pub fn kilometers(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Distance {
    type Error = GeoError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Distance> for f64 {
    fn from(value: Distance) -> Self {
        value.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// A point of the 16-point compass rose
pub enum CompassPoint {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassPoint {
    /// Clockwise from north
    pub const ALL: [Self; 16] = [
        Self::N,
        Self::NNE,
        Self::NE,
        Self::ENE,
        Self::E,
        Self::ESE,
        Self::SE,
        Self::SSE,
        Self::S,
        Self::SSW,
        Self::SW,
        Self::WSW,
        Self::W,
        Self::WNW,
        Self::NW,
        Self::NNW,
    ];

    /// Width of one point of the rose in degrees
    pub const SPAN: f64 = 360.0 / 16.0;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NNE => "NNE",
            Self::NE => "NE",
            Self::ENE => "ENE",
            Self::E => "E",
            Self::ESE => "ESE",
            Self::SE => "SE",
            Self::SSE => "SSE",
            Self::S => "S",
            Self::SSW => "SSW",
            Self::SW => "SW",
            Self::WSW => "WSW",
            Self::W => "W",
            Self::WNW => "WNW",
            Self::NW => "NW",
            Self::NNW => "NNW",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initial great-circle bearing from `start` to `end`.
///
/// A coincident pair has a bearing of 0°.
pub fn calculate_bearing(start: &GeoCoordinate, end: &GeoCoordinate) -> Bearing {
    let start_lat = start.lat().to_radians();
    let end_lat = end.lat().to_radians();
    let delta_lon = (end.long() - start.long()).to_radians();

    let y = delta_lon.sin() * end_lat.cos();
    let x = start_lat.cos() * end_lat.sin() - start_lat.sin() * end_lat.cos() * delta_lon.cos();

    // atan2(0, 0) is 0, which is what we want for a coincident pair
    Bearing::new(y.atan2(x).to_degrees())
}

/// Great-circle distance between two points using the haversine formula
pub fn calculate_distance(start: &GeoCoordinate, end: &GeoCoordinate) -> Distance {
    let start_lat = start.lat().to_radians();
    let end_lat = end.lat().to_radians();
    let delta_lat = end_lat - start_lat;
    let delta_lon = (end.long() - start.long()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + start_lat.cos() * end_lat.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push a just past 1 for near-antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Distance(EARTH_RADIUS_KM * c)
}

/// How far to rotate from wherever the device is facing now to point at `bearing`.
///
/// The heading is taken as true north, no declination correction is applied.
pub fn calculate_antenna_direction(bearing: Bearing, heading: Heading) -> Bearing {
    Bearing::new(bearing.degrees() - heading.degrees())
}

/// Label a bearing with its 16-point compass rose name.
///
/// A bearing exactly halfway between two points gets the clockwise one.
pub fn bearing_to_direction(bearing: Bearing) -> CompassPoint {
    let shifted = (bearing.degrees() + CompassPoint::SPAN / 2.0) % 360.0;
    let index = (shifted / CompassPoint::SPAN).floor() as usize;
    CompassPoint::ALL[index.min(CompassPoint::ALL.len() - 1)]
}
