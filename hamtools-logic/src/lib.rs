mod direction;
mod error;
mod location;
pub mod maidenhead;
mod map_link;
pub mod navigation;
mod settings;
mod tracker;

pub use direction::{DirectionFix, FixReadout, resolve};
pub use error::GeoError;
pub use location::{GeoCoordinate, Heading, LocationComponent, parse_degrees};
pub use maidenhead::{MaidenheadLocator, Precision, is_valid_locator};
pub use map_link::{MapProvider, map_link};
pub use navigation::{Bearing, CompassPoint, Distance};
pub use settings::{StationSettings, StationSpec};
pub use tracker::{
    Sample, SampleSender, StateUpdateSender, Tracker, TrackerState, TrackerUiState, UtcDT,
};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::{Context, bail};
}
