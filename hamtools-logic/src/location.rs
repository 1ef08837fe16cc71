use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::GeoError, navigation::normalize_degrees};

/// A "part" of a location, in degrees
pub type LocationComponent = f64;

pub const LATITUDE_RANGE: (LocationComponent, LocationComponent) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (LocationComponent, LocationComponent) = (-180.0, 180.0);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawCoordinate")]
/// Some WGS-84 location in the world, as gotten from a location provider or typed in by
/// the operator.
///
/// The fields are private so a value of this type is always in range, use
/// [GeoCoordinate::new] to build one.
pub struct GeoCoordinate {
    lat: LocationComponent,
    long: LocationComponent,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: LocationComponent,
    long: LocationComponent,
}

impl TryFrom<RawCoordinate> for GeoCoordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.long)
    }
}

fn check_component(
    what: &'static str,
    value: LocationComponent,
    (min, max): (LocationComponent, LocationComponent),
) -> Result<LocationComponent, GeoError> {
    // NaN fails both comparisons, so it lands here too
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(GeoError::range(what, value, min, max))
    }
}

impl GeoCoordinate {
    /// Validate and build a coordinate, out of range values are an error and are never clamped.
    pub fn new(lat: LocationComponent, long: LocationComponent) -> Result<Self, GeoError> {
        Ok(Self {
            lat: check_component("Latitude", lat, LATITUDE_RANGE)?,
            long: check_component("Longitude", long, LONGITUDE_RANGE)?,
        })
    }

    /// For values that are in range by construction, e.g. the center of a locator cell
    pub(crate) fn new_unchecked(lat: LocationComponent, long: LocationComponent) -> Self {
        debug_assert!((LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&lat));
        debug_assert!((LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&long));
        Self { lat, long }
    }

    pub fn lat(&self) -> LocationComponent {
        self.lat
    }

    pub fn long(&self) -> LocationComponent {
        self.long
    }

    /// Parse a latitude and a longitude typed separately, the way a form would hand them over
    pub fn parse_pair(lat: &str, long: &str) -> Result<Self, GeoError> {
        Self::new(parse_degrees("latitude", lat)?, parse_degrees("longitude", long)?)
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.long)
    }
}

impl FromStr for GeoCoordinate {
    type Err = GeoError;

    /// Parses `LAT,LON`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, long) = s
            .split_once(',')
            .ok_or_else(|| GeoError::parse("coordinate", s.trim()))?;
        Self::parse_pair(lat, long)
    }
}

/// Parse a number of degrees typed by a user
pub fn parse_degrees(what: &'static str, input: &str) -> Result<f64, GeoError> {
    let trimmed = input.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeoError::parse(what, trimmed))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
/// The direction the device is currently facing, degrees clockwise from north in `[0, 360)`.
///
/// This is used as-is. If the compass reports magnetic north, correcting for declination is up
/// to whoever produces the sample.
pub struct Heading(f64);

impl Heading {
    /// Wraps any finite reading into `[0, 360)`, non-finite readings are a range error
    pub fn new(degrees: f64) -> Result<Self, GeoError> {
        if degrees.is_finite() {
            Ok(Self(normalize_degrees(degrees)))
        } else {
            Err(GeoError::range("Heading", degrees, 0.0, 360.0))
        }
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Heading {
    type Error = GeoError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<f32> for Heading {
    type Error = GeoError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(f64::from(value))
    }
}

impl From<Heading> for f64 {
    fn from(value: Heading) -> Self {
        value.0
    }
}

impl FromStr for Heading {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_degrees("heading", s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_checks() {
        assert!(GeoCoordinate::new(90.0, 180.0).is_ok());
        assert!(GeoCoordinate::new(-90.0, -180.0).is_ok());

        let err = GeoCoordinate::new(90.5, 0.0).unwrap_err();
        assert!(err.is_range(), "Expected a range error, got {err:?}");
        assert!(GeoCoordinate::new(0.0, -180.01).unwrap_err().is_range());
        assert!(GeoCoordinate::new(f64::NAN, 0.0).unwrap_err().is_range());
        assert!(
            GeoCoordinate::new(0.0, f64::INFINITY)
                .unwrap_err()
                .is_range()
        );
    }

    #[test]
    fn test_parse() {
        let coord = " 48.146660 , 11.608330 ".parse::<GeoCoordinate>().unwrap();
        assert_eq!(coord.lat(), 48.14666);
        assert_eq!(coord.long(), 11.60833);

        assert!("48.1".parse::<GeoCoordinate>().unwrap_err().is_parse());
        assert!("abc,1".parse::<GeoCoordinate>().unwrap_err().is_parse());
        assert!("95,1".parse::<GeoCoordinate>().unwrap_err().is_range());
        assert!(
            GeoCoordinate::parse_pair("", "1.0")
                .unwrap_err()
                .is_parse()
        );
        assert!(parse_degrees("heading", "NaN").unwrap_err().is_parse());
    }

    #[test]
    fn test_display_six_places() {
        let coord = GeoCoordinate::new(0.0208333333, -0.5).unwrap();
        assert_eq!(coord.to_string(), "0.020833, -0.500000");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: GeoCoordinate = serde_json::from_str(r#"{"lat": 1.5, "long": -2.5}"#).unwrap();
        assert_eq!(ok, GeoCoordinate::new(1.5, -2.5).unwrap());

        let bad = serde_json::from_str::<GeoCoordinate>(r#"{"lat": 100.0, "long": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_heading_wraps() {
        assert_eq!(Heading::new(370.0).unwrap().degrees(), 10.0);
        assert_eq!(Heading::new(-90.0).unwrap().degrees(), 270.0);
        assert_eq!(Heading::new(360.0).unwrap().degrees(), 0.0);
        assert_eq!(Heading::try_from(45.5_f32).unwrap().degrees(), 45.5);
        assert!(Heading::new(f64::NAN).unwrap_err().is_range());
        assert!("east".parse::<Heading>().unwrap_err().is_parse());
    }
}
