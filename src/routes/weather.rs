//! Weather lookup and search-history endpoints.
//!
//! - POST   /api/v1/weather
//! - GET    /api/v1/weather/history
//! - DELETE /api/v1/weather/history/:id

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::services::history::{HistoryEntry, HistoryStore};
use crate::services::normalize::CityWeather;
use crate::services::openweather::OpenWeatherClient;
use crate::services::weather::get_weather_for_city;

/// Shared application state for weather endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) weather_client: OpenWeatherClient,
    pub(crate) history: Arc<HistoryStore>,
}

/// Request body for a weather lookup.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LookupRequest {
    /// Free-text city name, e.g. "Paris"
    pub city_name: String,
}

/// Successful lookup: the normalized weather plus the history entry that
/// was recorded for this search.
#[derive(Debug, Serialize, ToSchema)]
pub struct LookupResponse {
    pub weather: CityWeather,
    pub history: HistoryEntry,
}

/// Acknowledgement for a history removal.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveResponse {
    /// Id of the removed entry
    pub id: String,
}

/// Look up current weather and the 5-day forecast for a city.
///
/// On success the city is appended to the search history; the recorded
/// entry is returned alongside the weather so clients can render it
/// without re-fetching the history.
#[utoipa::path(
    post,
    path = "/api/v1/weather",
    tag = "Weather",
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Weather for the city", body = LookupResponse),
        (status = 400, description = "Blank city name", body = ErrorResponse),
        (status = 404, description = "City not found", body = ErrorResponse),
        (status = 502, description = "Weather provider unreachable or returned unusable data", body = ErrorResponse),
    )
)]
pub async fn lookup_weather(
    State(state): State<AppState>,
    Json(body): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, AppError> {
    if body.city_name.trim().is_empty() {
        return Err(AppError::BadRequest("city_name must not be blank".to_string()));
    }

    let weather = get_weather_for_city(&state.weather_client, &body.city_name).await?;

    // History records the name exactly as entered.
    let entry = HistoryEntry {
        id: state.history.next_id(),
        name: body.city_name,
    };
    state.history.add(entry.clone()).await?;

    tracing::info!("Weather lookup for '{}' recorded as {}", entry.name, entry.id);

    Ok(Json(LookupResponse {
        weather,
        history: entry,
    }))
}

/// List previously searched cities in search order.
#[utoipa::path(
    get,
    path = "/api/v1/weather/history",
    tag = "History",
    responses(
        (status = 200, description = "Search history, oldest first", body = Vec<HistoryEntry>),
        (status = 500, description = "History file unreadable", body = ErrorResponse),
    )
)]
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let entries = state.history.list().await?;
    Ok(Json(entries))
}

/// Remove a city from the search history.
///
/// Removing an id that does not exist is a no-op, not an error.
#[utoipa::path(
    delete,
    path = "/api/v1/weather/history/{id}",
    tag = "History",
    params(
        ("id" = String, Path, description = "History entry id"),
    ),
    responses(
        (status = 200, description = "Entry removed (or was already absent)", body = RemoveResponse),
        (status = 500, description = "History file unwritable", body = ErrorResponse),
    )
)]
pub async fn remove_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveResponse>, AppError> {
    state.history.remove(&id).await?;
    Ok(Json(RemoveResponse { id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Units;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_with(base_url: &str, dir: &tempfile::TempDir) -> AppState {
        AppState {
            weather_client: OpenWeatherClient::new(base_url, "test-key", Units::Imperial),
            history: Arc::new(HistoryStore::new(dir.path().join("db.json"))),
        }
    }

    async fn mount_paris(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "Paris", "lat": 48.85, "lon": 2.35 }
            ])))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
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
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_blank_city_name_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        // No provider mock: the guard must reject before any outbound call.
        let state = state_with("http://localhost:0", &dir);

        for raw in ["", "   ", "\t\n"] {
            let err = lookup_weather(
                State(state.clone()),
                Json(LookupRequest {
                    city_name: raw.to_string(),
                }),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }

        assert_eq!(state.history.list().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_lookup_appends_matching_history_entry() {
        let server = MockServer::start().await;
        mount_paris(&server).await;

        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&server.uri(), &dir);

        let Json(response) = lookup_weather(
            State(state.clone()),
            Json(LookupRequest {
                city_name: "Paris".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.weather.city, "Paris");
        assert_eq!(response.history.name, "Paris");

        let listed = state.history.list().await.unwrap();
        assert_eq!(listed, vec![response.history]);
    }

    // The history keeps the name exactly as the user typed it, including
    // surrounding whitespace.
    #[tokio::test]
    async fn test_history_name_is_stored_as_entered() {
        let server = MockServer::start().await;
        mount_paris(&server).await;

        let dir = tempfile::tempdir().unwrap();
        let state = state_with(&server.uri(), &dir);

        let Json(response) = lookup_weather(
            State(state.clone()),
            Json(LookupRequest {
                city_name: "  Paris ".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.history.name, "  Paris ");
        assert_eq!(state.history.list().await.unwrap()[0].name, "  Paris ");
    }

    #[tokio::test]
    async fn test_remove_handler_is_noop_for_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with("http://localhost:0", &dir);

        let Json(response) = remove_history(State(state.clone()), Path("nope".to_string()))
            .await
            .unwrap();
        assert_eq!(response.id, "nope");
        assert_eq!(state.history.list().await.unwrap(), vec![]);
    }
}
