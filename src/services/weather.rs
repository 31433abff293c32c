//! Weather lookup orchestration: geocode → fetch → normalize.

use crate::errors::AppError;
use crate::services::normalize::{self, CityWeather};
use crate::services::openweather::OpenWeatherClient;

/// One city→weather call, the sole entry point used by the HTTP layer.
///
/// Stateless and side-effect free: recording the lookup in the search
/// history is the caller's job. Each stage's error kind is propagated as-is
/// so the boundary can tell "city not found" from "provider unreachable"
/// from "malformed data".
pub async fn get_weather_for_city(
    client: &OpenWeatherClient,
    city_name: &str,
) -> Result<CityWeather, AppError> {
    let coords = client.geocode(city_name).await?;
    let payload = client.fetch_forecast(coords).await?;
    normalize::normalize(&payload, city_name)
}
