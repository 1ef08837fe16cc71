use serde::{Deserialize, Serialize};

use crate::location::GeoCoordinate;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Map app or site to open a location in
pub enum MapProvider {
    Google,
    Amap,
    Tencent,
    Baidu,
    /// A `geo:` URI, lets the OS pick the map app
    #[default]
    Geo,
}

impl MapProvider {
    pub const ALL: [Self; 5] = [
        Self::Google,
        Self::Amap,
        Self::Tencent,
        Self::Baidu,
        Self::Geo,
    ];
}

/// Build a link that opens `coord` in the given map with a marker named `label`.
///
/// Coordinates are passed through as WGS-84, providers that default to another datum are told
/// so through their coordinate type parameter rather than by converting.
pub fn map_link(provider: MapProvider, coord: &GeoCoordinate, label: &str) -> String {
    let lat = format!("{:.6}", coord.lat());
    let long = format!("{:.6}", coord.long());
    let label = urlencoding::encode(label);

    match provider {
        MapProvider::Google => format!("https://www.google.com/maps?q={lat},{long}({label})"),
        MapProvider::Amap => format!(
            "https://uri.amap.com/marker?position={long},{lat}&name={label}&coordinate=wgs84&callnative=1"
        ),
        MapProvider::Tencent => format!(
            "https://apis.map.qq.com/uri/v1/marker?marker=coord:{lat},{long};title:{label}&coord_type=1"
        ),
        MapProvider::Baidu => format!(
            "https://api.map.baidu.com/marker?location={lat},{long}&title={label}&content={label}&coord_type=wgs84&output=html&src=hamtools"
        ),
        MapProvider::Geo => format!("geo:{lat},{long}?q={lat},{long}({label})"),
    }
}
