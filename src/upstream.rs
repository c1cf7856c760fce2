//! Shared HTTP plumbing for the third-party services
//!
//! One `reqwest::Client` is built at startup with bounded timeouts and
//! shared by every lookup. Each lookup makes exactly one request; there is
//! no retry.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{AppError, config::UpstreamConfig};

const SLOW_REQUEST: Duration = Duration::from_secs(5);

/// Build the HTTP client used for all upstream calls
pub fn build_client(config: &UpstreamConfig) -> Result<Client, AppError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds.into()))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| AppError::config(format!("Failed to create HTTP client: {e}")))
}

/// Require an API key, naming the setting when it is missing
pub fn require_key<'a>(key: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    key.as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::config(format!("{name} is not configured")))
}

/// Send a request and decode its JSON body.
///
/// Transport failures and non-2xx statuses become `Network` errors; a body
/// that is not the expected JSON becomes a `Parse` error.
pub async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    url: &str,
    request: RequestBuilder,
) -> Result<T, AppError> {
    debug!(service, url = %redact(url), "Sending upstream request");
    let start = Instant::now();

    let response = request.send().await.map_err(|e| {
        let e = e.without_url();
        warn!(service, "Upstream request failed: {}", e);
        AppError::network(describe_transport_error(service, e))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        let e = e.without_url();
        warn!(service, "Failed to read upstream body: {}", e);
        AppError::network(describe_transport_error(service, e))
    })?;

    let elapsed = start.elapsed();
    if elapsed > SLOW_REQUEST {
        warn!(service, "Slow upstream response: {:.3}s", elapsed.as_secs_f64());
    }

    if !status.is_success() {
        warn!(service, status = status.as_u16(), "Upstream returned an error status");
        return Err(AppError::network(format!(
            "{service} returned HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        )));
    }

    let parsed = serde_json::from_str(&body).map_err(|e| {
        warn!(service, "Failed to parse upstream response: {}", e);
        AppError::parse(format!("{service} returned an unreadable response: {e}"))
    })?;

    info!(
        service,
        "Upstream request succeeded in {:.3}s",
        elapsed.as_secs_f64()
    );
    Ok(parsed)
}

fn describe_transport_error(service: &str, err: reqwest::Error) -> String {
    if err.is_timeout() {
        format!("{service} timed out")
    } else if err.is_connect() {
        format!("{service} is unreachable")
    } else {
        format!("{service} request failed: {err}")
    }
}

/// Hide API keys before a URL reaches the logs
#[must_use]
pub fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if matches!(name, "key" | "appid") => format!("{name}=REDACTED"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_hides_keys() {
        assert_eq!(
            redact("https://api.example.com/data?lat=1&lon=2&appid=secret"),
            "https://api.example.com/data?lat=1&lon=2&appid=REDACTED"
        );
        assert_eq!(
            redact("https://maps.example.com/x?key=abc&radius=500"),
            "https://maps.example.com/x?key=REDACTED&radius=500"
        );
        assert_eq!(redact("https://example.com/plain"), "https://example.com/plain");
    }

    #[test]
    fn test_require_key() {
        assert!(require_key(&Some("abc".to_string()), "KEY").is_ok());
        let err = require_key(&None, "OPENWEATHERMAP_API_KEY").unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
        assert!(err.to_string().contains("OPENWEATHERMAP_API_KEY"));
        assert!(require_key(&Some(String::new()), "KEY").is_err());
    }

    #[test]
    fn test_build_client_with_defaults() {
        assert!(build_client(&UpstreamConfig::default()).is_ok());
    }
}
