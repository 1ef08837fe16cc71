use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::GeoError,
    location::GeoCoordinate,
    maidenhead::{MaidenheadLocator, is_valid_locator},
    map_link::MapProvider,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
/// A station given either as a locator or as a coordinate
pub enum StationSpec {
    Locator(MaidenheadLocator),
    Coordinate(GeoCoordinate),
}

impl StationSpec {
    /// The coordinate to compute with, a locator resolves to its cell's center
    pub fn coordinate(&self) -> GeoCoordinate {
        match self {
            Self::Locator(locator) => locator.center(),
            Self::Coordinate(coord) => *coord,
        }
    }
}

impl FromStr for StationSpec {
    type Err = GeoError;

    /// Parses either `LAT,LON` or a 6 character locator
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.contains(',') {
            trimmed.parse().map(Self::Coordinate)
        } else if is_valid_locator(trimmed) {
            trimmed.parse().map(Self::Locator)
        } else {
            Err(GeoError::Format(trimmed.to_string()))
        }
    }
}

impl From<GeoCoordinate> for StationSpec {
    fn from(v: GeoCoordinate) -> Self {
        Self::Coordinate(v)
    }
}

impl From<MaidenheadLocator> for StationSpec {
    fn from(v: MaidenheadLocator) -> Self {
        Self::Locator(v)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Stations and map preferences the operator configured ahead of time
pub struct StationSettings {
    /// Where we are when there's no location provider
    pub home: Option<StationSpec>,
    /// The station to point at
    pub target: Option<StationSpec>,
    /// Map used for links
    pub map_provider: MapProvider,
    /// Marker name for our own location on maps
    pub home_label: String,
    /// Marker name for the target on maps
    pub target_label: String,
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            home: None,
            target: None,
            map_provider: MapProvider::default(),
            home_label: "My Location".to_string(),
            target_label: "Target".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_spec_parse() {
        let spec = "jn58td".parse::<StationSpec>().unwrap();
        assert_eq!(spec, StationSpec::Locator("JN58TD".parse().unwrap()));
        assert!((spec.coordinate().long() - 11.625).abs() < 1e-9);

        let spec = "38.9072, -77.0369".parse::<StationSpec>().unwrap();
        assert_eq!(spec.coordinate(), GeoCoordinate::new(38.9072, -77.0369).unwrap());

        assert!("ZZ99ZZ".parse::<StationSpec>().unwrap_err().is_format());
        assert!("1.0,x".parse::<StationSpec>().unwrap_err().is_parse());
        assert!("100,0".parse::<StationSpec>().unwrap_err().is_range());
    }

    #[test]
    fn test_settings_json() {
        let settings: StationSettings = serde_json::from_str(
            r#"{
                "home": "FM18LV",
                "target": {"lat": 48.14666, "long": 11.60833},
                "map_provider": "google"
            }"#,
        )
        .unwrap();

        assert_eq!(
            settings.home,
            Some(StationSpec::Locator("FM18LV".parse().unwrap()))
        );
        assert_eq!(
            settings.target,
            Some(StationSpec::Coordinate(
                GeoCoordinate::new(48.14666, 11.60833).unwrap()
            ))
        );
        assert_eq!(settings.map_provider, MapProvider::Google);
        assert_eq!(settings.home_label, "My Location");
    }

    #[test]
    fn test_settings_reject_bad_stations() {
        assert!(serde_json::from_str::<StationSettings>(r#"{"home": "ZZ99ZZ"}"#).is_err());
        assert!(
            serde_json::from_str::<StationSettings>(r#"{"target": {"lat": 91, "long": 0}}"#)
                .is_err()
        );
        let empty: StationSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, StationSettings::default());
    }
}
