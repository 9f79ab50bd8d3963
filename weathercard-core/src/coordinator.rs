//! Fan-out/fan-in of the two fetch pipelines and the card state they feed.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    model::DisplayRecord,
    provider::{FetchError, WeatherSource},
};

/// A failed refresh, naming which pipeline(s) went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("observation fetch failed: {0}")]
    Observation(FetchError),

    #[error("forecast fetch failed: {0}")]
    Forecast(FetchError),

    #[error("observation fetch failed: {observation}; forecast fetch failed: {forecast}")]
    Both {
        observation: FetchError,
        forecast: FetchError,
    },
}

/// What a successful `refresh` did to the card state.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Both fetches succeeded and the merged record was applied.
    Updated(DisplayRecord),

    /// Both fetches succeeded, but a newer refresh had already been applied
    /// by the time this one completed; its result was discarded.
    Superseded,
}

/// Owns the single live [`DisplayRecord`] and drives its replacement.
///
/// Every `refresh` runs both fetches concurrently and replaces the record
/// wholesale once both succeed. Refreshes are tagged with a generation so a
/// slow, overlapping refresh can never overwrite a newer result. A failed
/// refresh leaves the last good record in place and is surfaced through
/// [`WeatherCoordinator::last_error`].
#[derive(Debug)]
pub struct WeatherCoordinator {
    source: Arc<dyn WeatherSource>,
    generation: AtomicU64,
    state: Mutex<CoordinatorState>,
}

#[derive(Debug, Default)]
struct CoordinatorState {
    display: DisplayRecord,
    applied_generation: u64,
    last_error: Option<RefreshError>,
    error_generation: u64,
}

impl WeatherCoordinator {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// The current card. Starts as the empty default and is only ever
    /// replaced wholesale by a successful refresh.
    pub fn display(&self) -> DisplayRecord {
        self.state.lock().display.clone()
    }

    /// The most recent refresh failure not yet superseded by a success.
    pub fn last_error(&self) -> Option<RefreshError> {
        self.state.lock().last_error.clone()
    }

    /// Run both fetches concurrently and apply the merged result.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "refresh started");

        let (observation, forecast) =
            tokio::join!(self.source.current_observation(), self.source.forecast());

        match (observation, forecast) {
            (Ok(observation), Ok(forecast)) => {
                let record = DisplayRecord::merge(observation, forecast);
                let missing = record.missing_fields();
                if !missing.is_empty() {
                    warn!(?missing, "refresh completed with absent elements");
                }

                let mut state = self.state.lock();
                if generation < state.applied_generation {
                    debug!(
                        generation,
                        applied = state.applied_generation,
                        "discarding stale refresh result"
                    );
                    return Ok(RefreshOutcome::Superseded);
                }
                state.applied_generation = generation;
                state.display = record.clone();
                if generation >= state.error_generation {
                    state.last_error = None;
                }
                Ok(RefreshOutcome::Updated(record))
            }
            (Err(observation), Err(forecast)) => Err(self.record_failure(
                generation,
                RefreshError::Both {
                    observation,
                    forecast,
                },
            )),
            (Err(observation), Ok(_)) => {
                Err(self.record_failure(generation, RefreshError::Observation(observation)))
            }
            (Ok(_), Err(forecast)) => {
                Err(self.record_failure(generation, RefreshError::Forecast(forecast)))
            }
        }
    }

    fn record_failure(&self, generation: u64, error: RefreshError) -> RefreshError {
        warn!(%error, generation, "refresh failed; keeping last good record");

        let mut state = self.state.lock();
        if generation >= state.error_generation && generation >= state.applied_generation {
            state.error_generation = generation;
            state.last_error = Some(error.clone());
        }
        error
    }
}
