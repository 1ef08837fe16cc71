use serde::{Deserialize, Serialize};

use crate::{
    location::{GeoCoordinate, Heading},
    navigation::{
        Bearing, CompassPoint, Distance, bearing_to_direction, calculate_antenna_direction,
        calculate_bearing, calculate_distance,
    },
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Everything needed to point an antenna at a station
pub struct DirectionFix {
    /// Great-circle bearing from us to the target
    pub bearing: Bearing,
    /// Great-circle distance from us to the target
    pub distance: Distance,
    /// Compass rose label for [DirectionFix::bearing]
    pub compass_point: CompassPoint,
    /// The bearing relative to where the device is facing, `None` without a heading sample
    pub antenna_direction: Option<Bearing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// A [DirectionFix] formatted for display
pub struct FixReadout {
    pub bearing: String,
    pub distance: String,
    pub compass_point: String,
    pub antenna_direction: Option<String>,
}

impl DirectionFix {
    pub fn readout(&self) -> FixReadout {
        FixReadout {
            bearing: self.bearing.to_string(),
            distance: self.distance.to_string(),
            compass_point: self.compass_point.to_string(),
            antenna_direction: self.antenna_direction.map(|d| d.to_string()),
        }
    }
}

/// Work out the bearing, distance and antenna direction from `my` location to `target`.
///
/// Returns `None` if either location is missing. A missing heading only leaves
/// [DirectionFix::antenna_direction] empty.
pub fn resolve(
    my: Option<GeoCoordinate>,
    target: Option<GeoCoordinate>,
    heading: Option<Heading>,
) -> Option<DirectionFix> {
    let (my, target) = (my?, target?);

    let bearing = calculate_bearing(&my, &target);
    let distance = calculate_distance(&my, &target);

    Some(DirectionFix {
        bearing,
        distance,
        compass_point: bearing_to_direction(bearing),
        antenna_direction: heading.map(|heading| calculate_antenna_direction(bearing, heading)),
    })
}
