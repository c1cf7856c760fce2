//! Current-weather lookup against the OpenWeatherMap API

use std::sync::Arc;

use reqwest::Client;
use tracing::instrument;

use crate::config::UpstreamConfig;
use crate::models::{Coordinate, WeatherReport};
use crate::upstream::{require_key, send_json};
use crate::AppError;

#[derive(Clone)]
pub struct WeatherLookup {
    client: Client,
    config: Arc<UpstreamConfig>,
}

impl WeatherLookup {
    pub fn new(client: Client, config: Arc<UpstreamConfig>) -> Self {
        Self { client, config }
    }

    /// Fetch current conditions for a coordinate.
    ///
    /// Transport failures and error statuses are `Network` errors, a body that
    /// is not JSON is a `Parse` error.
    #[instrument(skip(self), fields(lat = coord.latitude, lon = coord.longitude))]
    pub async fn fetch(&self, coord: &Coordinate) -> Result<WeatherReport, AppError> {
        let key = require_key(&self.config.openweathermap_api_key, "OPENWEATHERMAP_API_KEY")?;
        let url = format!(
            "{}/data/2.5/weather?lat={}&lon={}&appid={}",
            self.config.weather_base_url.trim_end_matches('/'),
            coord.latitude,
            coord.longitude,
            urlencoding::encode(key)
        );

        send_json("weather", &url, self.client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup(server: &MockServer) -> WeatherLookup {
        let config = UpstreamConfig {
            openweathermap_api_key: Some("owm-key".to_string()),
            weather_base_url: server.uri(),
            ..UpstreamConfig::default()
        };
        let client = crate::upstream::build_client(&config).unwrap();
        WeatherLookup::new(client, Arc::new(config))
    }

    fn amsterdam() -> Coordinate {
        Coordinate::new(52.37, 4.89).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_passes_body_through() {
        let server = MockServer::start().await;
        let body = json!({ "name": "Amsterdam", "main": { "temp": 290.0 } });
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "52.37"))
            .and(query_param("lon", "4.89"))
            .and(query_param("appid", "owm-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let report = lookup(&server).fetch(&amsterdam()).await.unwrap();
        assert_eq!(report.into_inner(), body);
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = lookup(&server).fetch(&amsterdam()).await.unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "cod": 401 })))
            .mount(&server)
            .await;

        let err = lookup(&server).fetch(&amsterdam()).await.unwrap_err();
        assert!(matches!(err, AppError::Network { .. }));
        assert!(err.message().contains("401"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_network_error() {
        let config = UpstreamConfig {
            openweathermap_api_key: Some("owm-key".to_string()),
            weather_base_url: "http://127.0.0.1:9".to_string(),
            ..UpstreamConfig::default()
        };
        let client = crate::upstream::build_client(&config).unwrap();
        let lookup = WeatherLookup::new(client, Arc::new(config));

        let err = lookup.fetch(&amsterdam()).await.unwrap_err();
        assert!(matches!(err, AppError::Network { .. }));
    }

    #[tokio::test]
    async fn test_fetch_requires_key() {
        let lookup = WeatherLookup::new(
            Client::new(),
            Arc::new(UpstreamConfig::default()),
        );
        let err = lookup.fetch(&amsterdam()).await.unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "Amsterdam" }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = UpstreamConfig {
            openweathermap_api_key: Some("owm-key".to_string()),
            weather_base_url: server.uri(),
            timeout_seconds: 1,
            ..UpstreamConfig::default()
        };
        let client = crate::upstream::build_client(&config).unwrap();
        let lookup = WeatherLookup::new(client, Arc::new(config));

        let started = std::time::Instant::now();
        let err = lookup.fetch(&amsterdam()).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(matches!(err, AppError::Network { .. }));
        assert!(err.message().contains("timed out"), "{}", err.message());
    }
}
