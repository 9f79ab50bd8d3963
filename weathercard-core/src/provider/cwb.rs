//! Client for the CWB open-data datastore.
//!
//! Two datasets back the card: `O-A0003-001` (real-time station observations)
//! and `F-C0032-001` (36-hour forecasts per administrative area). Both are
//! keyed by `Authorization` and filtered server-side with `locationName`.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    config::Config,
    model::{ForecastRecord, ObservationRecord},
    provider::{FetchError, WeatherSource, truncate_body},
};

const OBSERVATION_DATASET: &str = "O-A0003-001";
const FORECAST_DATASET: &str = "F-C0032-001";

#[derive(Debug, Clone)]
pub struct CwbProvider {
    http: Client,
    api_key: String,
    base_url: String,
    observation_station: String,
    forecast_location: String,
}

impl CwbProvider {
    /// Build a provider with an explicit API key; endpoint, locations and
    /// timeout come from `config`.
    pub fn new(api_key: String, config: &Config) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            observation_station: config.observation_station.clone(),
            forecast_location: config.forecast_location.clone(),
        })
    }

    /// Build a provider from config, resolving the API key from the
    /// environment or the config file.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self::new(api_key, config)?)
    }

    async fn get_dataset<T: DeserializeOwned>(
        &self,
        dataset: &str,
        location_name: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, dataset);
        debug!(%url, location = %location_name, "fetching dataset");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("Authorization", self.api_key.as_str()),
                ("locationName", location_name),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl WeatherSource for CwbProvider {
    async fn current_observation(&self) -> Result<ObservationRecord, FetchError> {
        let envelope: ObservationEnvelope = self
            .get_dataset(OBSERVATION_DATASET, &self.observation_station)
            .await?;

        observation_record(envelope)
    }

    async fn forecast(&self) -> Result<ForecastRecord, FetchError> {
        let envelope: ForecastEnvelope = self
            .get_dataset(FORECAST_DATASET, &self.forecast_location)
            .await?;

        forecast_record(envelope)
    }
}

// O-A0003-001 wire shape.

#[derive(Debug, Deserialize)]
struct ObservationEnvelope {
    records: ObservationRecords,
}

#[derive(Debug, Deserialize)]
struct ObservationRecords {
    location: Vec<ObservationLocation>,
}

#[derive(Debug, Deserialize)]
struct ObservationLocation {
    #[serde(rename = "locationName")]
    location_name: String,
    time: ObservationTime,
    #[serde(rename = "weatherElement")]
    weather_element: Vec<ObservationElement>,
}

#[derive(Debug, Deserialize)]
struct ObservationTime {
    #[serde(rename = "obsTime")]
    obs_time: String,
}

#[derive(Debug, Deserialize)]
struct ObservationElement {
    #[serde(rename = "elementName")]
    element_name: String,
    #[serde(rename = "elementValue")]
    element_value: String,
}

// F-C0032-001 wire shape.

#[derive(Debug, Deserialize)]
struct ForecastEnvelope {
    records: ForecastRecords,
}

#[derive(Debug, Deserialize)]
struct ForecastRecords {
    location: Vec<ForecastLocation>,
}

#[derive(Debug, Deserialize)]
struct ForecastLocation {
    #[serde(rename = "weatherElement")]
    weather_element: Vec<ForecastElement>,
}

#[derive(Debug, Deserialize)]
struct ForecastElement {
    #[serde(rename = "elementName")]
    element_name: String,
    time: Vec<ForecastSlot>,
}

#[derive(Debug, Deserialize)]
struct ForecastSlot {
    parameter: ForecastParameter,
}

#[derive(Debug, Deserialize)]
struct ForecastParameter {
    #[serde(rename = "parameterName")]
    parameter_name: String,
    // PoP and CI carry parameterUnit instead of a value.
    #[serde(rename = "parameterValue")]
    parameter_value: Option<String>,
}

/// Project the observation envelope into a flat record.
///
/// Elements are matched by exact name from the unordered list; anything else
/// is ignored. An absent or unparseable element leaves its field `None`
/// rather than failing the whole fetch.
fn observation_record(envelope: ObservationEnvelope) -> Result<ObservationRecord, FetchError> {
    let location = envelope.records.location.into_iter().next().ok_or_else(|| {
        FetchError::InvalidResponse("observation response contained no location entry".to_string())
    })?;

    let mut record = ObservationRecord {
        observation_time: location.time.obs_time,
        location_name: location.location_name,
        temperature: None,
        wind_speed: None,
        humidity: None,
        weather: None,
    };

    for element in location.weather_element {
        match element.element_name.as_str() {
            "TEMP" => record.temperature = parse_numeric(&element),
            "WDSD" => record.wind_speed = parse_numeric(&element),
            "HUMD" => record.humidity = parse_numeric(&element),
            "Weather" => record.weather = Some(element.element_value),
            _ => {}
        }
    }

    Ok(record)
}

/// Project the forecast envelope into a flat record.
///
/// Only `time[0]` of each element is read: the card shows the nearest
/// upcoming window, never later ones. An element with an empty time list
/// leaves its field `None`.
fn forecast_record(envelope: ForecastEnvelope) -> Result<ForecastRecord, FetchError> {
    let location = envelope.records.location.into_iter().next().ok_or_else(|| {
        FetchError::InvalidResponse("forecast response contained no location entry".to_string())
    })?;

    let mut record = ForecastRecord {
        description: None,
        weather_code: None,
        rain_probability: None,
        comfort_level: None,
    };

    for element in location.weather_element {
        let first = element.time.into_iter().next();
        match element.element_name.as_str() {
            "Wx" => {
                if let Some(slot) = first {
                    record.weather_code = slot.parameter.parameter_value.and_then(|raw| {
                        raw.trim().parse().ok().or_else(|| {
                            warn!(value = %raw, "non-numeric Wx parameterValue");
                            None
                        })
                    });
                    record.description = Some(slot.parameter.parameter_name);
                }
            }
            "PoP" => {
                record.rain_probability = first.and_then(|slot| {
                    let raw = slot.parameter.parameter_name;
                    raw.trim().parse().ok().or_else(|| {
                        warn!(value = %raw, "non-numeric PoP parameterName");
                        None
                    })
                });
            }
            "CI" => record.comfort_level = first.map(|slot| slot.parameter.parameter_name),
            _ => {}
        }
    }

    Ok(record)
}

fn parse_numeric(element: &ObservationElement) -> Option<f64> {
    element.element_value.trim().parse().ok().or_else(|| {
        warn!(
            element = %element.element_name,
            value = %element.element_value,
            "non-numeric element value"
        );
        None
    })
}
