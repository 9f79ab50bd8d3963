//! Plain-text rendering of a [`DisplayRecord`].

use chrono::NaiveDateTime;
use weathercard_core::DisplayRecord;

/// Format the card as a small block of text.
///
/// Absent fields render as `–` so partial data never hides the card. Layout
/// only; every value comes straight from the record except humidity, which is
/// shown as a percentage of its 0..=1 fraction.
pub fn render(record: &DisplayRecord) -> String {
    let location = if record.location_name.is_empty() {
        "–"
    } else {
        record.location_name.as_str()
    };

    let headline = match (&record.weather, &record.description) {
        (Some(weather), Some(description)) if weather != description => {
            format!("{weather}，{description}")
        }
        (Some(weather), _) => weather.clone(),
        (None, Some(description)) => description.clone(),
        (None, None) => "–".to_string(),
    };

    let mut card = String::new();
    card.push_str(&format!("{location}\n"));
    card.push_str(&format!("{headline}\n"));
    card.push_str(&format!(
        "Temperature  {}\n",
        fmt_value(record.temperature, " °C")
    ));
    card.push_str(&format!(
        "Humidity     {}\n",
        fmt_value(record.humidity.map(|h| (h * 100.0).round()), " %")
    ));
    card.push_str(&format!(
        "Wind         {}\n",
        fmt_value(record.wind_speed, " m/s")
    ));
    card.push_str(&format!(
        "Rain         {}\n",
        fmt_value(record.rain_probability, " %")
    ));
    card.push_str(&format!(
        "Comfort      {}\n",
        record.comfort_level.as_deref().unwrap_or("–")
    ));
    card.push_str(&format!(
        "Observed at  {}\n",
        format_observation_time(&record.observation_time)
    ));
    card
}

fn fmt_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => "–".to_string(),
    }
}

/// Shorten the verbatim observation timestamp to HH:MM for the card footer.
///
/// The API reports local time either as `2024-04-13 16:10:00` or in RFC 3339;
/// anything unrecognised is shown as-is.
fn format_observation_time(raw: &str) -> String {
    if raw.is_empty() {
        return "–".to_string();
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%H:%M").to_string();
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%H:%M").to_string();
    }

    raw.to_string()
}
