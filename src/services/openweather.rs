//! OpenWeather API client.
//!
//! Two endpoints are used: the geocoder (city name → coordinates) and the
//! 5-day/3-hour forecast. See: https://openweathermap.org/api
//!
//! The client only moves bytes; turning a raw forecast payload into
//! normalized readings lives in [`crate::services::normalize`].

use serde::Deserialize;
use std::time::Duration;

use crate::config::Units;
use crate::errors::AppError;

/// Bound on each outbound provider call so a stalled upstream cannot
/// suspend a request indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geographic coordinates produced by the geocoder. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One entry of the geocoder response array.
#[derive(Debug, Deserialize)]
struct GeocodeCandidate {
    lat: f64,
    lon: f64,
}

/// Raw 5-day forecast payload, kept provider-shaped.
#[derive(Debug, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

/// One three-hour forecast sample as OpenWeather returns it.
#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    /// Unix timestamp of the sample (UTC seconds).
    pub dt: i64,
    /// Timestamp as text, e.g. "2026-03-01 12:00:00".
    pub dt_txt: String,
    pub main: ForecastMain,
    pub wind: ForecastWind,
    #[serde(default)]
    pub weather: Vec<ForecastCondition>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct ForecastWind {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct ForecastCondition {
    /// Short condition name, e.g. "Clouds".
    pub main: String,
    /// Long description, e.g. "scattered clouds". May be absent.
    #[serde(default)]
    pub description: String,
    /// Icon code, e.g. "03d".
    pub icon: String,
}

/// Client for the OpenWeather geocoding and forecast endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    units: Units,
}

impl OpenWeatherClient {
    pub fn new(base_url: &str, api_key: &str, units: Units) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            units,
        }
    }

    /// Resolve a free-text city name to coordinates.
    ///
    /// The geocoder does fuzzy matching; we ask for a single candidate and
    /// take its lat/lon. An empty result array means the user's input didn't
    /// match any city — that is a `NotFound`, not a provider failure.
    pub async fn geocode(&self, city_name: &str) -> Result<Coordinates, AppError> {
        let url = format!("{}/geo/1.0/direct", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city_name),
                ("limit", "1"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "geocoder returned HTTP {}",
                response.status()
            )));
        }

        let candidates: Vec<GeocodeCandidate> = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("geocoder JSON parse error: {}", e)))?;

        let first = candidates
            .first()
            .ok_or_else(|| AppError::NotFound("city not found".to_string()))?;

        Ok(Coordinates {
            latitude: first.lat,
            longitude: first.lon,
        })
    }

    /// Fetch the raw 5-day/3-hour forecast for a location.
    ///
    /// Returns the payload unmodified; normalization is a separate concern.
    pub async fn fetch_forecast(&self, coords: Coordinates) -> Result<ForecastPayload, AppError> {
        let url = format!("{}/data/2.5/forecast", self.base_url);
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", self.units.as_str()),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("forecast request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Provider(format!(
                "forecast endpoint returned HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("forecast JSON parse error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::new(&server.uri(), "test-key", Units::Imperial)
    }

    #[tokio::test]
    async fn test_geocode_takes_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Paris"))
            .and(query_param("limit", "1"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "Paris", "lat": 48.85, "lon": 2.35, "country": "FR" }
            ])))
            .mount(&server)
            .await;

        let coords = client_for(&server).geocode("Paris").await.unwrap();
        assert!((coords.latitude - 48.85).abs() < 1e-9);
        assert!((coords.longitude - 2.35).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_geocode_empty_result_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let err = client_for(&server).geocode("Xyzzyville").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_geocode_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).geocode("Paris").await.unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }

    #[tokio::test]
    async fn test_fetch_forecast_passes_units_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("lat", "48.85"))
            .and(query_param("lon", "2.35"))
            .and(query_param("units", "imperial"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [
                    {
                        "dt": 1761739200i64,
                        "dt_txt": "2025-10-29 12:00:00",
                        "main": { "temp": 60.0, "humidity": 70.0 },
                        "wind": { "speed": 5.0 },
                        "weather": [
                            { "id": 802, "main": "Clouds", "description": "scattered clouds", "icon": "03d" }
                        ]
                    }
                ]
            })))
            .mount(&server)
            .await;

        let payload = client_for(&server)
            .fetch_forecast(Coordinates {
                latitude: 48.85,
                longitude: 2.35,
            })
            .await
            .unwrap();

        assert_eq!(payload.list.len(), 1);
        assert_eq!(payload.list[0].dt_txt, "2025-10-29 12:00:00");
        assert_eq!(payload.list[0].weather[0].icon, "03d");
    }

    #[tokio::test]
    async fn test_fetch_forecast_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_forecast(Coordinates {
                latitude: 0.0,
                longitude: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }
}
