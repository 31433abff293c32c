use crate::errors::ConfigError;

/// Unit system for OpenWeather requests.
///
/// The original deployment used imperial units, so that is the default;
/// set `UNITS=metric` for Celsius and metres per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Imperial,
    Metric,
}

impl Units {
    /// Query-parameter value understood by OpenWeather.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// OpenWeather base URL, e.g. "https://api.openweathermap.org".
    pub api_base_url: String,
    /// OpenWeather API key, appended to every request as `appid`.
    pub api_key: String,
    pub units: Units,
    /// Path of the JSON document holding the search history.
    pub history_file: String,
    pub port: u16,
}

impl AppConfig {
    /// Parse configuration from the environment.
    ///
    /// A missing base URL or API key is a startup-fatal error: the caller
    /// must not serve requests without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url =
            std::env::var("API_BASE_URL").map_err(|_| ConfigError::MissingVar("API_BASE_URL"))?;
        let api_key = std::env::var("API_KEY").map_err(|_| ConfigError::MissingVar("API_KEY"))?;

        let units = match std::env::var("UNITS") {
            Err(_) => Units::Imperial,
            Ok(v) if v.eq_ignore_ascii_case("imperial") => Units::Imperial,
            Ok(v) if v.eq_ignore_ascii_case("metric") => Units::Metric,
            Ok(v) => {
                return Err(ConfigError::InvalidVar {
                    name: "UNITS",
                    value: v,
                    reason: "expected 'imperial' or 'metric'".to_string(),
                })
            }
        };

        let port_raw = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_raw.parse().map_err(|e| ConfigError::InvalidVar {
            name: "PORT",
            value: port_raw,
            reason: format!("{}", e),
        })?;

        Ok(Self {
            api_base_url,
            api_key,
            units,
            history_file: std::env::var("HISTORY_FILE").unwrap_or_else(|_| "db/db.json".to_string()),
            port,
        })
    }
}
