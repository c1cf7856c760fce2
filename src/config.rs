//! Configuration management for `GeoWeather`
//!
//! Loaded once at startup from an optional TOML file and environment
//! variables, validated, and then shared read-only with every collaborator.

use crate::AppError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// PEM certificate; serving over TLS requires both paths
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

/// Third-party API endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Key for Google geolocation and places
    pub google_maps_api_key: Option<String>,
    /// Key for the OpenWeatherMap current-weather endpoint
    pub openweathermap_api_key: Option<String>,
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
    #[serde(default = "default_geolocation_base_url")]
    pub geolocation_base_url: String,
    #[serde(default = "default_places_base_url")]
    pub places_base_url: String,
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Nearby-places query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_session_ttl")]
    pub ttl_hours: u32,
    #[serde(default)]
    pub secure_cookies: bool,
}

/// User store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geolocation_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_user_agent() -> String {
    format!("GeoWeather/{}", env!("CARGO_PKG_VERSION"))
}

fn default_radius_meters() -> u32 {
    500
}

fn default_category() -> String {
    "restaurant".to_string()
}

fn default_max_results() -> usize {
    5
}

fn default_cookie_name() -> String {
    "geoweather_session".to_string()
}

fn default_session_ttl() -> u32 {
    720
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            google_maps_api_key: None,
            openweathermap_api_key: None,
            geocoding_base_url: default_geocoding_base_url(),
            geolocation_base_url: default_geolocation_base_url(),
            places_base_url: default_places_base_url(),
            weather_base_url: default_weather_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            radius_meters: default_radius_meters(),
            category: default_category(),
            max_results: default_max_results(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_hours: default_session_ttl(),
            secure_cookies: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // e.g. GEOWEATHER__SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("GEOWEATHER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_env();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("geoweather").join("config.toml"))
    }

    /// Fill API keys from the plain `GOOGLE_MAPS_API_KEY` / `OPENWEATHERMAP_API_KEY` variables
    pub fn apply_legacy_env(&mut self) {
        if self.upstream.google_maps_api_key.is_none() {
            self.upstream.google_maps_api_key = non_empty_env("GOOGLE_MAPS_API_KEY");
        }
        if self.upstream.openweathermap_api_key.is_none() {
            self.upstream.openweathermap_api_key = non_empty_env("OPENWEATHERMAP_API_KEY");
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.upstream.timeout_seconds == 0 || self.upstream.timeout_seconds > 300 {
            return Err(AppError::config("Upstream timeout must be between 1 and 300 seconds").into());
        }

        if self.upstream.connect_timeout_seconds == 0
            || self.upstream.connect_timeout_seconds > self.upstream.timeout_seconds
        {
            return Err(AppError::config(
                "Upstream connect timeout must be at least 1 second and not exceed the request timeout",
            )
            .into());
        }

        if self.places.radius_meters == 0 || self.places.radius_meters > 50_000 {
            return Err(AppError::config("Places radius must be between 1 and 50000 meters").into());
        }

        if self.places.max_results == 0 || self.places.max_results > 20 {
            return Err(AppError::config("Places max results must be between 1 and 20").into());
        }

        if self.session.ttl_hours == 0 || self.session.ttl_hours > 8760 {
            return Err(AppError::config("Session TTL must be between 1 and 8760 hours").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AppError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AppError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let base_urls = [
            ("geocoding", &self.upstream.geocoding_base_url),
            ("geolocation", &self.upstream.geolocation_base_url),
            ("places", &self.upstream.places_base_url),
            ("weather", &self.upstream.weather_base_url),
        ];
        for (name, url) in base_urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::config(format!(
                    "The {name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.places.category.trim().is_empty() {
            return Err(AppError::config("Places category cannot be empty").into());
        }

        if self.session.cookie_name.trim().is_empty() {
            return Err(AppError::config("Session cookie name cannot be empty").into());
        }

        Ok(())
    }

    fn validate_tls(&self) -> Result<()> {
        match (&self.server.tls_cert_path, &self.server.tls_key_path) {
            (Some(_), None) | (None, Some(_)) => Err(AppError::config(
                "TLS needs both tls_cert_path and tls_key_path",
            )
            .into()),
            _ => Ok(()),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
