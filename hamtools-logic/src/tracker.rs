use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    direction::{DirectionFix, FixReadout, resolve},
    location::{GeoCoordinate, Heading},
    maidenhead::{MaidenheadLocator, encode},
    prelude::*,
};

/// Convenience alias for UTC DT
pub type UtcDT = DateTime<Utc>;

/// Notified every time the tracker has a new state to show
pub trait StateUpdateSender {
    fn send_update(&self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A new reading from one of the tracker's inputs. `None` means the input has no value right
/// now, e.g. no location fix yet or the operator cleared the target.
pub enum Sample {
    Location(Option<GeoCoordinate>),
    Heading(Option<Heading>),
    Target(Option<GeoCoordinate>),
}

pub type SampleSender = mpsc::Sender<Sample>;
type SampleReceiver = mpsc::Receiver<Sample>;

#[derive(Debug, Clone, Default, PartialEq)]
/// Latest inputs and everything derived from them
pub struct TrackerState {
    location: Option<GeoCoordinate>,
    heading: Option<Heading>,
    target: Option<GeoCoordinate>,
    my_locator: Option<MaidenheadLocator>,
    target_locator: Option<MaidenheadLocator>,
    fix: Option<DirectionFix>,
    updated_at: Option<UtcDT>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// [TrackerState] with everything already formatted for display
pub struct TrackerUiState {
    pub my_latitude: Option<String>,
    pub my_longitude: Option<String>,
    pub my_locator: Option<String>,
    pub target_locator: Option<String>,
    pub heading: Option<String>,
    pub fix: Option<FixReadout>,
    pub updated_at: Option<UtcDT>,
}

impl TrackerState {
    fn new(target: Option<GeoCoordinate>) -> Self {
        let mut state = Self {
            target,
            ..Default::default()
        };
        state.recompute(None);
        state
    }

    fn apply(&mut self, sample: Sample) {
        match sample {
            Sample::Location(location) => self.location = location,
            Sample::Heading(heading) => self.heading = heading,
            Sample::Target(target) => self.target = target,
        }
    }

    /// Derive everything from the current inputs, nothing from the previous results is kept
    fn recompute(&mut self, now: Option<UtcDT>) {
        self.my_locator = self.location.as_ref().map(encode);
        self.target_locator = self.target.as_ref().map(encode);
        self.fix = resolve(self.location, self.target, self.heading);
        self.updated_at = now;
    }

    pub fn location(&self) -> Option<GeoCoordinate> {
        self.location
    }

    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    pub fn target(&self) -> Option<GeoCoordinate> {
        self.target
    }

    pub fn fix(&self) -> Option<DirectionFix> {
        self.fix
    }

    pub fn as_ui_state(&self) -> TrackerUiState {
        TrackerUiState {
            my_latitude: self.location.map(|l| format!("{:.6}", l.lat())),
            my_longitude: self.location.map(|l| format!("{:.6}", l.long())),
            my_locator: self.my_locator.map(|l| l.to_string()),
            target_locator: self.target_locator.map(|l| l.to_string()),
            heading: self.heading.map(|h| format!("{:.1}°", h.degrees())),
            fix: self.fix.as_ref().map(DirectionFix::readout),
            updated_at: self.updated_at,
        }
    }
}

/// Keeps a [DirectionFix] current as samples come in from the location provider, the compass,
/// and the operator picking a target.
///
/// Providers push [Sample]s through the [SampleSender] returned by [Tracker::new]. Every sample
/// triggers a full recompute and a call to the [StateUpdateSender].
pub struct Tracker<S: StateUpdateSender> {
    state: RwLock<TrackerState>,
    samples: Mutex<SampleReceiver>,
    state_update_sender: S,
    cancel: CancellationToken,
}

impl<S: StateUpdateSender> Tracker<S> {
    const SAMPLE_BUFFER: usize = 64;

    pub fn new(target: Option<GeoCoordinate>, state_update_sender: S) -> (Self, SampleSender) {
        let (tx, rx) = mpsc::channel(Self::SAMPLE_BUFFER);
        let tracker = Self {
            state: RwLock::new(TrackerState::new(target)),
            samples: Mutex::new(rx),
            state_update_sender,
            cancel: CancellationToken::new(),
        };
        (tracker, tx)
    }

    pub async fn get_ui_state(&self) -> TrackerUiState {
        self.state.read().await.as_ui_state()
    }

    pub async fn get_fix(&self) -> Option<DirectionFix> {
        self.state.read().await.fix()
    }

    pub async fn clone_state(&self) -> TrackerState {
        self.state.read().await.clone()
    }

    /// Stop [Tracker::main_loop], samples still in the queue are dropped
    pub async fn quit(&self) {
        self.cancel.cancel();
    }

    fn consume_sample(&self, state: &mut TrackerState, sample: Sample) {
        state.apply(sample);
        state.recompute(Some(Utc::now()));
        debug!("Recomputed after {sample:?}: {:?}", state.fix);
        self.state_update_sender.send_update();
    }

    /// Main loop of the tracker, runs until [Tracker::quit] is called or every [SampleSender]
    /// has been dropped.
    pub async fn main_loop(&self) -> Result {
        let Ok(mut samples) = self.samples.try_lock() else {
            bail!("Tracker loop is already running");
        };

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    info!("Tracker cancelled");
                    break;
                }

                sample = samples.recv() => {
                    let Some(sample) = sample else {
                        info!("All sample providers stopped");
                        break;
                    };
                    let mut state = self.state.write().await;
                    self.consume_sample(&mut state, sample);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{CountingSender, coord};

    #[test]
    fn test_state_recompute_from_scratch() {
        let mut state = TrackerState::new(Some(coord(0.0, 10.0)));
        assert!(state.fix().is_none());
        assert_eq!(state.as_ui_state().target_locator.as_deref(), Some("JJ50AA"));

        state.apply(Sample::Location(Some(coord(0.0, 0.0))));
        state.recompute(None);
        let fix = state.fix().expect("No fix with both locations");
        assert!(fix.antenna_direction.is_none());

        state.apply(Sample::Heading(Heading::new(45.0).ok()));
        state.recompute(None);
        let ui = state.as_ui_state();
        assert_eq!(ui.my_latitude.as_deref(), Some("0.000000"));
        assert_eq!(ui.my_locator.as_deref(), Some("JJ00AA"));
        assert_eq!(ui.heading.as_deref(), Some("45.0°"));
        let readout = ui.fix.expect("No readout");
        assert_eq!(readout.antenna_direction.as_deref(), Some("45.0°"));

        state.apply(Sample::Location(None));
        state.recompute(None);
        assert!(state.fix().is_none());
        assert!(state.as_ui_state().my_locator.is_none());
    }

    #[tokio::test]
    async fn test_second_loop_refused() {
        let (tracker, _tx) = Tracker::new(None, CountingSender::default());
        let _guard = tracker.samples.lock().await;
        assert!(tracker.main_loop().await.is_err());
    }
}
