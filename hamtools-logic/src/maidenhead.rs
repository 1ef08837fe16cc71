//! Conversion between coordinates and 6 character Maidenhead locators.
//!
//! A locator names a cell, not a point. Encoding quantizes a coordinate down to the cell that
//! contains it and decoding always hands back the center of the cell, so
//! `decode(encode(c))` is within half a cell of `c` but is not `c`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::GeoError,
    location::{GeoCoordinate, LocationComponent},
};

/// Number of characters in a locator
pub const LOCATOR_LEN: usize = 6;

/// Cell size in degrees as (longitude, latitude) for each pair
const FIELD_SIZE: (f64, f64) = (20.0, 10.0);
const SQUARE_SIZE: (f64, f64) = (2.0, 1.0);
const SUBSQUARE_SIZE: (f64, f64) = (5.0 / 60.0, 2.5 / 60.0);

/// The east and north edges of the world belong to the last cell, nudge them just inside it
const EDGE_NUDGE: f64 = 1e-9;

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
/// How many character pairs of a locator to use
pub enum Precision {
    /// `JN`, 20° x 10°
    Field,
    /// `JN58`, 2° x 1°
    Square,
    /// `JN58TD`, 5' x 2.5'
    #[default]
    Subsquare,
}

impl Precision {
    pub const ALL: [Self; 3] = [Self::Field, Self::Square, Self::Subsquare];

    /// Characters used up to and including this pair
    pub fn char_count(&self) -> usize {
        match self {
            Self::Field => 2,
            Self::Square => 4,
            Self::Subsquare => LOCATOR_LEN,
        }
    }

    /// Size of the alphabet for this pair
    fn radix(&self) -> u32 {
        match self {
            Self::Field => 18,
            Self::Square => 10,
            Self::Subsquare => 24,
        }
    }

    fn at(position: usize) -> Self {
        match position {
            0 | 1 => Self::Field,
            2 | 3 => Self::Square,
            _ => Self::Subsquare,
        }
    }
}

/// Map an index within a pair's alphabet to its character.
///
/// Panics if the index is outside the alphabet, callers clamp before getting here.
fn index_to_char(index: u32, precision: Precision) -> u8 {
    assert!(
        index < precision.radix(),
        "Index {index} is outside of the {precision:?} alphabet"
    );
    // Both branches fit in a u8 after the assert above
    let offset = index as u8;
    match precision {
        Precision::Square => b'0' + offset,
        Precision::Field | Precision::Subsquare => b'A' + offset,
    }
}

/// Map an uppercase character back to its index, `None` if it isn't in the pair's alphabet
fn char_to_index(c: u8, precision: Precision) -> Option<u32> {
    let index = match precision {
        Precision::Square => c.checked_sub(b'0')?,
        Precision::Field | Precision::Subsquare => c.checked_sub(b'A')?,
    };
    (u32::from(index) < precision.radix()).then_some(u32::from(index))
}

/// Floor a non-negative cell offset into an index, clamped into the pair's alphabet
fn cell_index(offset: f64, precision: Precision) -> u32 {
    (offset.floor().max(0.0) as u32).min(precision.radix() - 1)
}

/// Structural check only: exactly 6 characters, `A`-`R` twice, two digits, `A`-`X` twice.
///
/// Case-insensitive, surrounding whitespace is not accepted.
pub fn is_valid_locator(s: &str) -> bool {
    s.len() == LOCATOR_LEN
        && s.bytes().enumerate().all(|(position, c)| {
            char_to_index(c.to_ascii_uppercase(), Precision::at(position)).is_some()
        })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
/// A validated 6 character locator, stored uppercase
pub struct MaidenheadLocator([u8; LOCATOR_LEN]);

/// The south-west and north-east corners of a locator's cell, in degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CellBounds {
    pub south: LocationComponent,
    pub west: LocationComponent,
    pub north: LocationComponent,
    pub east: LocationComponent,
}

impl MaidenheadLocator {
    fn index(&self, position: usize) -> u32 {
        // Only validated characters are ever stored
        char_to_index(self.0[position], Precision::at(position)).unwrap_or_default()
    }

    /// The leading characters up to the given precision, e.g. `JN58` for [Precision::Square]
    pub fn prefix(&self, precision: Precision) -> String {
        self.0[..precision.char_count()]
            .iter()
            .copied()
            .map(char::from)
            .collect()
    }

    pub fn bounds(&self) -> CellBounds {
        let west = f64::from(self.index(0)) * FIELD_SIZE.0
            + f64::from(self.index(2)) * SQUARE_SIZE.0
            + f64::from(self.index(4)) * SUBSQUARE_SIZE.0
            - 180.0;
        let south = f64::from(self.index(1)) * FIELD_SIZE.1
            + f64::from(self.index(3)) * SQUARE_SIZE.1
            + f64::from(self.index(5)) * SUBSQUARE_SIZE.1
            - 90.0;
        CellBounds {
            south,
            west,
            north: south + SUBSQUARE_SIZE.1,
            east: west + SUBSQUARE_SIZE.0,
        }
    }

    /// Center point of the cell
    pub fn center(&self) -> GeoCoordinate {
        decode(self)
    }
}

impl fmt::Display for MaidenheadLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix(Precision::Subsquare))
    }
}

impl FromStr for MaidenheadLocator {
    type Err = GeoError;

    /// Accepts any case and ignores surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !is_valid_locator(trimmed) {
            return Err(GeoError::Format(trimmed.to_string()));
        }
        let mut chars = [0; LOCATOR_LEN];
        for (dest, c) in chars.iter_mut().zip(trimmed.bytes()) {
            *dest = c.to_ascii_uppercase();
        }
        Ok(Self(chars))
    }
}

impl TryFrom<String> for MaidenheadLocator {
    type Error = GeoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MaidenheadLocator> for String {
    fn from(value: MaidenheadLocator) -> Self {
        value.to_string()
    }
}

/// Quantize a coordinate to the 6 character locator of the cell containing it.
///
/// The subsquare residuals are taken from the shifted coordinate (`lon + 180`, `lat + 90`) so
/// they line up with the field and square grid.
pub fn encode(coord: &GeoCoordinate) -> MaidenheadLocator {
    let lon = (coord.long() + 180.0).min(360.0 - EDGE_NUDGE);
    let lat = (coord.lat() + 90.0).min(180.0 - EDGE_NUDGE);

    let indices = [
        cell_index(lon / FIELD_SIZE.0, Precision::Field),
        cell_index(lat / FIELD_SIZE.1, Precision::Field),
        cell_index((lon.floor() % FIELD_SIZE.0) / SQUARE_SIZE.0, Precision::Square),
        cell_index(lat.floor() % FIELD_SIZE.1, Precision::Square),
        cell_index((lon % SQUARE_SIZE.0) / SUBSQUARE_SIZE.0, Precision::Subsquare),
        cell_index((lat % SQUARE_SIZE.1) / SUBSQUARE_SIZE.1, Precision::Subsquare),
    ];

    let mut chars = [0; LOCATOR_LEN];
    for (position, (dest, index)) in chars.iter_mut().zip(indices).enumerate() {
        *dest = index_to_char(index, Precision::at(position));
    }
    MaidenheadLocator(chars)
}

/// Encode raw degrees, failing with a range error if they aren't a valid coordinate
pub fn encode_degrees(
    lat: LocationComponent,
    long: LocationComponent,
) -> Result<MaidenheadLocator, GeoError> {
    Ok(encode(&GeoCoordinate::new(lat, long)?))
}

/// Encode to a shorter locator, 2 characters for a field, 4 for a square or the full 6
pub fn encode_with_precision(coord: &GeoCoordinate, precision: Precision) -> String {
    encode(coord).prefix(precision)
}

/// The center of the locator's cell
pub fn decode(locator: &MaidenheadLocator) -> GeoCoordinate {
    let bounds = locator.bounds();
    GeoCoordinate::new_unchecked(
        bounds.south + SUBSQUARE_SIZE.1 / 2.0,
        bounds.west + SUBSQUARE_SIZE.0 / 2.0,
    )
}

/// Validate and decode locator text, failing with a format error if the syntax is wrong
pub fn decode_str(locator: &str) -> Result<GeoCoordinate, GeoError> {
    Ok(decode(&locator.parse()?))
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::navigation::calculate_distance;

    fn coord(lat: f64, long: f64) -> GeoCoordinate {
        GeoCoordinate::new(lat, long).expect("Invalid test coordinate")
    }

    fn loc(s: &str) -> MaidenheadLocator {
        s.parse().expect("Invalid test locator")
    }

    #[test]
    fn test_origin() {
        assert_eq!(encode(&coord(0.0, 0.0)).to_string(), "JJ00AA");

        let center = decode(&loc("JJ00AA"));
        assert!((center.lat() - 0.0208333).abs() < 1e-6, "Got {center}");
        assert!((center.long() - 0.0416667).abs() < 1e-6, "Got {center}");
    }

    #[test]
    fn test_known_vectors() {
        let cases = [
            (48.14666, 11.60833, "JN58TD"),
            (38.9072, -77.0369, "FM18LV"),
            (-33.8688, 151.2093, "QF56OD"),
            (-90.0, -180.0, "AA00AA"),
            (90.0, 180.0, "RR99XX"),
            (-0.000001, -0.000001, "II99XX"),
        ];
        for (lat, long, expected) in cases {
            assert_eq!(
                encode(&coord(lat, long)).to_string(),
                expected,
                "Wrong locator for {lat}, {long}"
            );
        }
    }

    #[test]
    fn test_decode_center() {
        let center = decode_str("JN58TD").unwrap();
        assert!((center.long() - 11.625).abs() < 1e-9, "Got {center}");
        assert!((center.lat() - 48.1458333).abs() < 1e-6, "Got {center}");

        let bounds = loc("JN58TD").bounds();
        assert!((bounds.west - 11.5833333).abs() < 1e-6);
        assert!((bounds.south - 48.125).abs() < 1e-9);
        assert!((bounds.east - bounds.west - 5.0 / 60.0).abs() < 1e-12);
        assert!((bounds.north - bounds.south - 2.5 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_last_cell_stays_in_range() {
        let center = decode(&loc("RR99XX"));
        assert!(center.lat() < 90.0 && center.long() < 180.0);
        let center = decode(&loc("AA00AA"));
        assert!(center.lat() > -90.0 && center.long() > -180.0);
    }

    #[test]
    fn test_validity() {
        assert!(is_valid_locator("JN58TD"));
        assert!(is_valid_locator("jn58td"));
        assert!(is_valid_locator("RR99XX"));
        assert!(is_valid_locator("AA00AA"));

        assert!(!is_valid_locator("ZZ99ZZ"));
        assert!(!is_valid_locator("SN58TD"));
        assert!(!is_valid_locator("JN58YD"));
        assert!(!is_valid_locator("JNA8TD"));
        assert!(!is_valid_locator("JN5ATD"));
        assert!(!is_valid_locator("JN58T"));
        assert!(!is_valid_locator("JN58TDAA"));
        assert!(!is_valid_locator(" JN58TD"));
        assert!(!is_valid_locator("JN58Tä"));
        assert!(!is_valid_locator(""));
    }

    #[test]
    fn test_parse() {
        let parsed = loc("  jn58td ");
        assert_eq!(parsed.to_string(), "JN58TD");
        assert_eq!(parsed.prefix(Precision::Field), "JN");
        assert_eq!(parsed.prefix(Precision::Square), "JN58");

        let err = "ZZ99ZZ".parse::<MaidenheadLocator>().unwrap_err();
        assert_eq!(err, GeoError::Format("ZZ99ZZ".to_string()));
        assert!(decode_str("JN58").unwrap_err().is_format());
    }

    #[test]
    fn test_encode_degrees_range() {
        assert!(encode_degrees(91.0, 0.0).unwrap_err().is_range());
        assert!(encode_degrees(0.0, 180.5).unwrap_err().is_range());
        assert_eq!(encode_degrees(0.0, 0.0).unwrap().to_string(), "JJ00AA");
    }

    #[test]
    fn test_precision() {
        let munich = coord(48.14666, 11.60833);
        let prefixes = Precision::ALL.map(|p| encode_with_precision(&munich, p));
        assert_eq!(prefixes, ["JN", "JN58", "JN58TD"]);
        assert_eq!(Precision::default(), Precision::Subsquare);
    }

    #[test]
    fn test_serde_string() {
        let json = serde_json::to_string(&loc("fm18lv")).unwrap();
        assert_eq!(json, "\"FM18LV\"");
        let back: MaidenheadLocator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loc("FM18LV"));
        assert!(serde_json::from_str::<MaidenheadLocator>("\"FM18\"").is_err());
    }

    #[test]
    fn test_quantization_bound() {
        let half_lon = SUBSQUARE_SIZE.0 / 2.0;
        let half_lat = SUBSQUARE_SIZE.1 / 2.0;
        let half_diagonal = calculate_distance(&coord(0.0, 0.0), &coord(half_lat, half_lon));

        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        for _ in 0..5000 {
            let c = coord(
                rng.random_range(-90.0..=90.0),
                rng.random_range(-180.0..=180.0),
            );
            let locator = encode(&c);
            let center = decode(&locator);

            assert!(
                (c.lat() - center.lat()).abs() <= half_lat + 1e-9,
                "{c} -> {locator} -> {center}"
            );
            assert!(
                (c.long() - center.long()).abs() <= half_lon + 1e-9,
                "{c} -> {locator} -> {center}"
            );
            let gap = calculate_distance(&c, &center);
            assert!(
                gap.kilometers() <= half_diagonal.kilometers() + 1e-3,
                "{c} is {gap} from the center of {locator}"
            );
        }
    }

    #[test]
    fn test_centers_encode_to_their_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..2000 {
            let mut chars = [0; LOCATOR_LEN];
            for (position, dest) in chars.iter_mut().enumerate() {
                let precision = Precision::at(position);
                *dest = index_to_char(rng.random_range(0..precision.radix()), precision);
            }
            let locator = MaidenheadLocator(chars);
            assert_eq!(encode(&decode(&locator)), locator);
        }
    }

    #[test]
    #[should_panic]
    fn test_index_outside_alphabet_panics() {
        index_to_char(18, Precision::Field);
    }
}
