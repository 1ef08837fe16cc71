mod track;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use hamtools_logic::{
    GeoCoordinate, Heading, MapProvider, Precision, StationSettings, StationSpec,
    is_valid_locator, maidenhead, map_link, resolve,
};
use log::{debug, info};
use tokio::io::BufReader;

pub mod prelude {
    pub use anyhow::{Context, bail};
    pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
}

use prelude::*;

#[derive(Parser)]
#[command(version, about = "Antenna pointing and Maidenhead locator tools")]
struct Cli {
    /// JSON file with home/target stations and map preferences
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum PrecisionValue {
    Field,
    Square,
    Subsquare,
}

impl From<PrecisionValue> for Precision {
    fn from(value: PrecisionValue) -> Self {
        match value {
            PrecisionValue::Field => Precision::Field,
            PrecisionValue::Square => Precision::Square,
            PrecisionValue::Subsquare => Precision::Subsquare,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum MapProviderValue {
    Google,
    Amap,
    Tencent,
    Baidu,
    Geo,
}

impl From<MapProviderValue> for MapProvider {
    fn from(value: MapProviderValue) -> Self {
        match value {
            MapProviderValue::Google => MapProvider::Google,
            MapProviderValue::Amap => MapProvider::Amap,
            MapProviderValue::Tencent => MapProvider::Tencent,
            MapProviderValue::Baidu => MapProvider::Baidu,
            MapProviderValue::Geo => MapProvider::Geo,
        }
    }
}

#[derive(Subcommand)]
enum LocatorCommand {
    /// Convert a coordinate to a Maidenhead locator
    #[command(allow_negative_numbers = true)]
    Encode {
        /// Latitude in degrees, north positive
        lat: String,
        /// Longitude in degrees, east positive
        long: String,
        /// How many characters of the locator to print
        #[arg(long, value_enum, default_value = "subsquare")]
        precision: PrecisionValue,
    },
    /// Print the center of a locator's cell
    Decode {
        /// A 6-character locator like JN58TD
        locator: String,
    },
    /// Check that a locator is well-formed
    Check {
        /// A 6-character locator like JN58TD
        locator: String,
    },
}

#[derive(Subcommand)]
enum Commands {
    /// Bearing, distance and antenna direction from one station to another
    Point {
        /// Our station as LAT,LON or a locator, defaults to `home` from the config
        #[arg(long, allow_hyphen_values = true)]
        from: Option<StationSpec>,
        /// The station to point at, defaults to `target` from the config
        #[arg(long, allow_hyphen_values = true)]
        to: Option<StationSpec>,
        /// Compass heading the device faces, in degrees
        #[arg(long, allow_hyphen_values = true)]
        heading: Option<Heading>,
    },
    /// Work with Maidenhead locators
    #[command(subcommand)]
    Locator(LocatorCommand),
    /// Print a map link for a station
    Map {
        /// LAT,LON or a locator, defaults to `target` from the config
        #[arg(allow_hyphen_values = true)]
        station: Option<StationSpec>,
        /// Map to link to, defaults to `map_provider` from the config
        #[arg(long, value_enum)]
        provider: Option<MapProviderValue>,
        /// Marker name, defaults to `target_label` from the config
        #[arg(long)]
        label: Option<String>,
    },
    /// Read location and heading samples from stdin and keep the readout current
    Track {
        /// The station to point at, defaults to `target` from the config
        #[arg(long, allow_hyphen_values = true)]
        target: Option<StationSpec>,
    },
}

fn load_settings(path: Option<&Path>) -> Result<StationSettings> {
    let Some(path) = path else {
        return Ok(StationSettings::default());
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let settings = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;

    debug!("Loaded settings from {}", path.display());

    Ok(settings)
}

fn describe(station: &GeoCoordinate) -> String {
    format!("{} ({station})", maidenhead::encode(station))
}

fn point(
    from: Option<StationSpec>,
    to: Option<StationSpec>,
    heading: Option<Heading>,
    settings: &StationSettings,
) -> Result {
    let Some(from) = from.or(settings.home) else {
        bail!("No station to point from, pass --from or set \"home\" in the config");
    };
    let Some(to) = to.or(settings.target) else {
        bail!("No station to point at, pass --to or set \"target\" in the config");
    };

    let (from, to) = (from.coordinate(), to.coordinate());

    let fix = resolve(Some(from), Some(to), heading).context("Couldn't resolve a direction")?;
    let readout = fix.readout();

    println!("From:     {}", describe(&from));
    println!("To:       {}", describe(&to));
    println!("Bearing:  {} ({})", readout.bearing, readout.compass_point);
    println!("Distance: {}", readout.distance);
    if let Some(direction) = readout.antenna_direction {
        println!("Antenna:  {direction}");
    }

    Ok(())
}

fn locator(command: LocatorCommand) -> Result {
    match command {
        LocatorCommand::Encode {
            lat,
            long,
            precision,
        } => {
            let coord = GeoCoordinate::parse_pair(&lat, &long)?;
            println!(
                "{}",
                maidenhead::encode_with_precision(&coord, precision.into())
            );
        }
        LocatorCommand::Decode { locator } => {
            let center = maidenhead::decode_str(&locator)?;
            println!("{center}");
        }
        LocatorCommand::Check { locator } => {
            if !is_valid_locator(&locator) {
                bail!("{locator} is not a valid locator");
            }
            println!("{} is valid", locator.to_ascii_uppercase());
        }
    }

    Ok(())
}

fn map(
    station: Option<StationSpec>,
    provider: Option<MapProviderValue>,
    label: Option<String>,
    settings: &StationSettings,
) -> Result {
    let Some(station) = station.or(settings.target) else {
        bail!("No station given, pass one or set \"target\" in the config");
    };

    let provider = provider.map(Into::into).unwrap_or(settings.map_provider);
    let label = label.as_deref().unwrap_or(&settings.target_label);

    println!("{}", map_link(provider, &station.coordinate(), label));

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Point { from, to, heading } => point(from, to, heading, &settings),
        Commands::Locator(command) => locator(command),
        Commands::Map {
            station,
            provider,
            label,
        } => map(station, provider, label, &settings),
        Commands::Track { target } => {
            let target = target
                .or(settings.target)
                .map(|t| t.coordinate());
            if target.is_none() {
                info!("No target yet, send a \"target\" line to set one");
            }
            let shutdown = async {
                tokio::signal::ctrl_c().await.ok();
            };
            track::run(
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
                target,
                shutdown,
            )
            .await
        }
    }
}
