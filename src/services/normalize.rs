//! Normalization of raw OpenWeather forecast payloads.
//!
//! Pure functions, no I/O. The 5-day endpoint returns samples at three-hour
//! intervals; the forecast list is deduplicated to one entry per day by
//! keeping the midday (12:00:00) sample, which is what the original service
//! displayed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::services::openweather::{ForecastEntry, ForecastPayload};

/// Timestamp-text marker for the one-per-day forecast sample.
const MIDDAY_MARKER: &str = "12:00:00";

/// A single normalized weather reading.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeatherReading {
    /// Calendar date, e.g. "3/1/2026"
    pub date: String,
    /// Temperature in the configured unit system
    pub temperature: f64,
    /// Wind speed in the configured unit system
    pub wind_speed: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// OpenWeather icon code, e.g. "03d"
    pub condition_icon: String,
    /// Human-readable condition, e.g. "scattered clouds"
    pub condition_description: String,
}

/// Normalized weather for one city: current conditions plus the
/// one-per-day forecast, in provider (chronological) order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CityWeather {
    /// City name as the user entered it
    pub city: String,
    pub current: WeatherReading,
    pub forecast: Vec<WeatherReading>,
}

/// Map a provider payload into [`CityWeather`].
///
/// Current conditions are the first list entry; the forecast keeps only the
/// midday samples. An absent or empty list is a `Data` error — the provider
/// answered, but with nothing usable.
pub fn normalize(payload: &ForecastPayload, city_name: &str) -> Result<CityWeather, AppError> {
    let first = payload
        .list
        .first()
        .ok_or_else(|| AppError::Data("weather data not available".to_string()))?;

    let forecast = payload
        .list
        .iter()
        .filter(|entry| entry.dt_txt.contains(MIDDAY_MARKER))
        .map(normalize_entry)
        .collect();

    Ok(CityWeather {
        city: city_name.to_string(),
        current: normalize_entry(first),
        forecast,
    })
}

/// Normalize one three-hour sample.
///
/// The long description wins when present; otherwise the condition's short
/// name ("Clouds") is used. A missing condition array yields empty strings
/// rather than failing the whole lookup.
fn normalize_entry(entry: &ForecastEntry) -> WeatherReading {
    let (icon, description) = match entry.weather.first() {
        Some(cond) if !cond.description.is_empty() => {
            (cond.icon.clone(), cond.description.clone())
        }
        Some(cond) => (cond.icon.clone(), cond.main.clone()),
        None => (String::new(), String::new()),
    };

    WeatherReading {
        date: format_date(entry.dt),
        temperature: entry.main.temp,
        wind_speed: entry.wind.speed,
        humidity: entry.main.humidity,
        condition_icon: icon,
        condition_description: description,
    }
}

/// Unix seconds → "M/D/YYYY" (no zero padding, matching the original UI).
fn format_date(unix_secs: i64) -> String {
    match DateTime::<Utc>::from_timestamp(unix_secs, 0) {
        Some(dt) => dt.format("%-m/%-d/%Y").to_string(),
        None => String::new(),
    }
}
