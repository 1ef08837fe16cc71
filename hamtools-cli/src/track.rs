use std::{future::Future, sync::Arc};

use hamtools_logic::{
    GeoCoordinate, GeoError, Heading, Sample, StateUpdateSender, StationSpec, Tracker,
    TrackerUiState,
};
use log::{info, warn};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};

use crate::prelude::*;

struct UpdateSender(mpsc::UnboundedSender<()>);

impl StateUpdateSender for UpdateSender {
    fn send_update(&self) {
        self.0.send(()).ok();
    }
}

/// `none` clears an input, anything else goes through `parse`
fn optional<T>(
    rest: &str,
    parse: impl FnOnce(&str) -> Result<T, GeoError>,
) -> Result<Option<T>, GeoError> {
    if rest.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        parse(rest).map(Some)
    }
}

/// Parse one line of provider input.
///
/// ```text
/// loc LAT LON | loc LAT,LON | loc none | lost
/// hdg DEG | hdg none
/// target LAT,LON | target LOCATOR | target none
/// ```
///
/// Blank lines and `#` comments give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Sample>, GeoError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let sample = match cmd.to_ascii_lowercase().as_str() {
        "lost" => Sample::Location(None),
        "loc" => Sample::Location(optional(rest, |rest| {
            let (lat, long) = rest
                .split_once(',')
                .or_else(|| rest.split_once(char::is_whitespace))
                .ok_or_else(|| GeoError::Parse {
                    what: "location",
                    input: rest.to_string(),
                })?;
            GeoCoordinate::parse_pair(lat, long)
        })?),
        "hdg" => Sample::Heading(optional(rest, str::parse::<Heading>)?),
        "target" => Sample::Target(optional(rest, |rest| {
            rest.parse::<StationSpec>().map(|s| s.coordinate())
        })?),
        _ => {
            return Err(GeoError::Parse {
                what: "command",
                input: line.to_string(),
            });
        }
    };

    Ok(Some(sample))
}

fn format_state(ui: &TrackerUiState) -> String {
    let mut line = String::new();

    if let Some(updated_at) = ui.updated_at {
        line.push_str(&format!("[{}] ", updated_at.format("%H:%M:%S")));
    }

    match (&ui.my_latitude, &ui.my_longitude, &ui.my_locator) {
        (Some(lat), Some(long), Some(locator)) => {
            line.push_str(&format!("me {locator} ({lat}, {long})"))
        }
        _ => line.push_str("me ??????"),
    }

    line.push_str(&format!(
        "  target {}",
        ui.target_locator.as_deref().unwrap_or("??????")
    ));

    if let Some(heading) = &ui.heading {
        line.push_str(&format!("  heading {heading}"));
    }

    match (&ui.fix, &ui.my_locator, &ui.target_locator) {
        (Some(fix), _, _) => {
            line.push_str(&format!(
                "  bearing {} ({})  distance {}",
                fix.bearing, fix.compass_point, fix.distance
            ));
            if let Some(direction) = &fix.antenna_direction {
                line.push_str(&format!("  turn {direction}"));
            }
        }
        (None, None, None) => line.push_str("  waiting for location and target"),
        (None, None, Some(_)) => line.push_str("  waiting for location"),
        (None, Some(_), _) => line.push_str("  waiting for target"),
    }

    line
}

/// Feed provider samples from `input` into a [Tracker], writing one readout line to `out` for
/// every accepted sample.
///
/// Each sample is sent only after the readout for the previous one is written, so every line
/// shows the state right after its own sample. Stops at the end of `input` or once `shutdown`
/// resolves.
pub async fn run(
    input: impl AsyncBufRead + Unpin,
    mut out: impl AsyncWrite + Unpin,
    target: Option<GeoCoordinate>,
    shutdown: impl Future<Output = ()>,
) -> Result {
    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
    let (tracker, samples) = Tracker::new(target, UpdateSender(updates_tx));
    let tracker = Arc::new(tracker);

    let tracker_task = tokio::spawn({
        let tracker = tracker.clone();
        async move { tracker.main_loop().await }
    });

    info!("Reading samples, one per line");

    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            _ = &mut shutdown => {
                tracker.quit().await;
                break;
            }
            line = lines.next_line() => line.context("Failed to read input")?,
        };

        let Some(line) = line else {
            break;
        };

        let sample = match parse_line(&line) {
            Ok(Some(sample)) => sample,
            Ok(None) => continue,
            // Previous state stays as-is, the bad line is just skipped
            Err(why) => {
                warn!("Ignoring line: {why}");
                continue;
            }
        };

        samples
            .send(sample)
            .await
            .context("Tracker stopped unexpectedly")?;
        updates_rx
            .recv()
            .await
            .context("Tracker stopped before updating")?;

        let line = format_state(&tracker.get_ui_state().await);
        out.write_all(format!("{line}\n").as_bytes())
            .await
            .context("Failed to write readout")?;
        out.flush().await.context("Failed to write readout")?;
    }

    drop(samples);

    tracker_task.await.context("Tracker task panicked")?
}
