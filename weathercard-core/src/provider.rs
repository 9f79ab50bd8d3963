use crate::model::{ForecastRecord, ObservationRecord};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod cwb;

/// Errors from a single fetch pipeline.
///
/// Payloads are plain strings so a failure can be kept around as the
/// coordinator's `last_error` without holding on to transport types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("request rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not valid JSON or the expected envelope was absent.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of the two datasets the card is built from.
///
/// `CwbProvider` is the real implementation; the trait exists so the
/// coordinator can be exercised against in-memory sources in tests.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Latest real-time observation for the configured station.
    async fn current_observation(&self) -> Result<ObservationRecord, FetchError>;

    /// Nearest 36-hour forecast window for the configured area.
    async fn forecast(&self) -> Result<ForecastRecord, FetchError>;
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i <= MAX)
            .last()
            .map_or(0, |(i, _)| i);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
