use serde::{Deserialize, Serialize};

/// Latest real-time reading for one observation station.
///
/// Produced fresh on every successful fetch and never mutated; the next fetch
/// supersedes it wholesale. Element values are carried as reported by the
/// station, with no unit conversion. A field is `None` when the station
/// response did not include the corresponding element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Observation timestamp exactly as the API reported it; never validated.
    pub observation_time: String,
    pub location_name: String,
    /// `TEMP`, degrees Celsius.
    pub temperature: Option<f64>,
    /// `WDSD`, metres per second.
    pub wind_speed: Option<f64>,
    /// `HUMD`, relative humidity as a 0..=1 fraction.
    pub humidity: Option<f64>,
    /// `Weather`, free-text condition, e.g. "多雲".
    pub weather: Option<String>,
}

impl ObservationRecord {
    /// Names of the optional elements the response did not carry.
    pub fn missing_elements(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.temperature.is_none() {
            missing.push("TEMP");
        }
        if self.wind_speed.is_none() {
            missing.push("WDSD");
        }
        if self.humidity.is_none() {
            missing.push("HUMD");
        }
        if self.weather.is_none() {
            missing.push("Weather");
        }
        missing
    }
}

/// Nearest 36-hour forecast window for one administrative area.
///
/// Only the first time slot of each element is ever read; later slots are
/// deliberately ignored so the card always shows the upcoming window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// `Wx` parameter name, e.g. "多雲時晴".
    pub description: Option<String>,
    /// `Wx` parameter value, the CWB weather code.
    pub weather_code: Option<u16>,
    /// `PoP` parameter name, probability of precipitation in percent.
    pub rain_probability: Option<f64>,
    /// `CI` parameter name, comfort index label, e.g. "舒適".
    pub comfort_level: Option<String>,
}

impl ForecastRecord {
    pub fn missing_elements(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.description.is_none() || self.weather_code.is_none() {
            missing.push("Wx");
        }
        if self.rain_probability.is_none() {
            missing.push("PoP");
        }
        if self.comfort_level.is_none() {
            missing.push("CI");
        }
        missing
    }
}

/// The flat, render-ready union of one observation and one forecast.
///
/// The coordinator owns the single live instance and replaces it wholesale on
/// every successful refresh; `Default` is the empty card shown before the
/// first fetch completes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub observation_time: String,
    pub location_name: String,
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub humidity: Option<f64>,
    pub weather: Option<String>,
    pub description: Option<String>,
    pub weather_code: Option<u16>,
    pub rain_probability: Option<f64>,
    pub comfort_level: Option<String>,
}

impl DisplayRecord {
    /// Shallow merge of the two fetch results. Pure: the same inputs always
    /// produce an equal record.
    pub fn merge(observation: ObservationRecord, forecast: ForecastRecord) -> Self {
        Self {
            observation_time: observation.observation_time,
            location_name: observation.location_name,
            temperature: observation.temperature,
            wind_speed: observation.wind_speed,
            humidity: observation.humidity,
            weather: observation.weather,
            description: forecast.description,
            weather_code: forecast.weather_code,
            rain_probability: forecast.rain_probability,
            comfort_level: forecast.comfort_level,
        }
    }

    /// Every optional field the merged record is missing, by element name.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.temperature.is_none() {
            missing.push("TEMP");
        }
        if self.wind_speed.is_none() {
            missing.push("WDSD");
        }
        if self.humidity.is_none() {
            missing.push("HUMD");
        }
        if self.weather.is_none() {
            missing.push("Weather");
        }
        if self.description.is_none() || self.weather_code.is_none() {
            missing.push("Wx");
        }
        if self.rain_probability.is_none() {
            missing.push("PoP");
        }
        if self.comfort_level.is_none() {
            missing.push("CI");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_observation() -> ObservationRecord {
        ObservationRecord {
            observation_time: "2024-04-13 16:10:00".to_string(),
            location_name: "臺北".to_string(),
            temperature: Some(23.5),
            wind_speed: Some(1.1),
            humidity: Some(0.84),
            weather: Some("多雲".to_string()),
        }
    }

    fn sample_forecast() -> ForecastRecord {
        ForecastRecord {
            description: Some("多雲時晴".to_string()),
            weather_code: Some(7),
            rain_probability: Some(30.0),
            comfort_level: Some("舒適".to_string()),
        }
    }

    #[test]
    fn merge_is_a_shallow_union() {
        let merged = DisplayRecord::merge(sample_observation(), sample_forecast());

        assert_eq!(merged.location_name, "臺北");
        assert_eq!(merged.observation_time, "2024-04-13 16:10:00");
        assert_eq!(merged.temperature, Some(23.5));
        assert_eq!(merged.description.as_deref(), Some("多雲時晴"));
        assert_eq!(merged.weather_code, Some(7));
        assert_eq!(merged.rain_probability, Some(30.0));
        assert!(merged.missing_fields().is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let first = DisplayRecord::merge(sample_observation(), sample_forecast());
        let second = DisplayRecord::merge(sample_observation(), sample_forecast());

        assert_eq!(first, second);
    }

    #[test]
    fn default_record_is_the_empty_card() {
        let record = DisplayRecord::default();

        assert_eq!(record.observation_time, "");
        assert_eq!(record.location_name, "");
        assert_eq!(record.temperature, None);
        assert_eq!(
            record.missing_fields(),
            vec!["TEMP", "WDSD", "HUMD", "Weather", "Wx", "PoP", "CI"]
        );
    }

    #[test]
    fn missing_elements_reports_absent_humidity() {
        let observation = ObservationRecord {
            humidity: None,
            ..sample_observation()
        };

        assert_eq!(observation.missing_elements(), vec!["HUMD"]);
    }

    #[test]
    fn wx_is_missing_when_only_the_code_is_absent() {
        let forecast = ForecastRecord {
            weather_code: None,
            ..sample_forecast()
        };

        assert_eq!(forecast.missing_elements(), vec!["Wx"]);
    }
}
