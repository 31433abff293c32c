// City Weather API v0.1
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod routes;
mod services;

use config::AppConfig;
use routes::weather::AppState;
use services::history::HistoryStore;
use services::openweather::OpenWeatherClient;

/// City Weather API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "City Weather API",
        version = "0.1.0",
        description = "Proxies city-weather lookups to OpenWeather (geocode the city, \
            fetch the 5-day forecast, normalize to current conditions plus one midday \
            reading per day) and persists a search history to a local JSON file.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Weather", description = "City weather lookup"),
        (name = "History", description = "Search history"),
    ),
    paths(
        routes::health::health_check,
        routes::weather::lookup_weather,
        routes::weather::list_history,
        routes::weather::remove_history,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::weather::LookupRequest,
            routes::weather::LookupResponse,
            routes::weather::RemoveResponse,
            services::normalize::CityWeather,
            services::normalize::WeatherReading,
            services::history::HistoryEntry,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "city_weather_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing provider URL or credential is fatal: serve nothing.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let weather_client = OpenWeatherClient::new(&config.api_base_url, &config.api_key, config.units);
    let history = Arc::new(HistoryStore::new(&config.history_file));

    let app_state = AppState {
        weather_client,
        history: history.clone(),
    };

    // CORS — lookups are POSTs and history entries can be deleted
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);

    // Build router
    // Weather/history routes share AppState; health uses the store directly.
    let weather_routes = Router::new()
        .route("/api/v1/weather", post(routes::weather::lookup_weather))
        .route(
            "/api/v1/weather/history",
            get(routes::weather::list_history),
        )
        .route(
            "/api/v1/weather/history/:id",
            delete(routes::weather::remove_history),
        )
        .with_state(app_state);

    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(history);

    let app = Router::new()
        .merge(health_routes)
        .merge(weather_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
