//! Location Resolution Module
//!
//! Turns an optional place name into a coordinate: a name is forward
//! geocoded through Nominatim (OpenStreetMap), no name means an IP based
//! lookup through the Google Geolocation API. One upstream call per
//! resolution, no caching.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::config::UpstreamConfig;
use crate::models::Coordinate;
use crate::upstream::{require_key, send_json};
use crate::AppError;

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeolocateResponse {
    location: Option<GeolocateLocation>,
    accuracy: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeolocateLocation {
    lat: f64,
    lng: f64,
}

/// Service for resolving place names or the caller's address to coordinates
#[derive(Clone)]
pub struct LocationResolver {
    client: Client,
    config: Arc<UpstreamConfig>,
}

impl LocationResolver {
    pub fn new(client: Client, config: Arc<UpstreamConfig>) -> Self {
        Self { client, config }
    }

    /// Resolve a place name, or the caller's IP location when no name is given.
    ///
    /// Every failure, including an unreachable service, is a `Resolution` error.
    #[instrument(skip(self))]
    pub async fn resolve(&self, place_name: Option<&str>) -> Result<Coordinate, AppError> {
        let coordinate = match place_name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::resolution("Place name cannot be empty"));
                }
                self.resolve_name(name).await?
            }
            None => self.resolve_ip().await?,
        };

        debug!("Resolved location: {}", coordinate.format_coordinates());
        Ok(coordinate)
    }

    /// Forward geocode a name, taking the best match
    async fn resolve_name(&self, name: &str) -> Result<Coordinate, AppError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.config.geocoding_base_url.trim_end_matches('/'),
            urlencoding::encode(name)
        );

        let places: Vec<NominatimPlace> = send_json("geocoding", &url, self.client.get(&url))
            .await
            .map_err(|e| AppError::resolution(format!("Geocoding '{name}' failed: {}", e.message())))?;

        let Some(best) = places.into_iter().next() else {
            warn!("No geocoding results found for '{}'", name);
            return Err(AppError::resolution(format!("Location not found: {name}")));
        };

        let latitude = best
            .lat
            .parse::<f64>()
            .map_err(|_| AppError::resolution(format!("Invalid latitude for '{name}': {}", best.lat)))?;
        let longitude = best
            .lon
            .parse::<f64>()
            .map_err(|_| AppError::resolution(format!("Invalid longitude for '{name}': {}", best.lon)))?;

        info!(
            "Geocoded '{}' to {} ({:.4}, {:.4})",
            name,
            best.display_name.as_deref().unwrap_or(name),
            latitude,
            longitude
        );

        Coordinate::new(latitude, longitude)
    }

    /// Estimate the location from the network address
    async fn resolve_ip(&self) -> Result<Coordinate, AppError> {
        let key = require_key(&self.config.google_maps_api_key, "GOOGLE_MAPS_API_KEY")
            .map_err(|e| AppError::resolution(e.message()))?;
        let url = format!(
            "{}/geolocation/v1/geolocate?key={}",
            self.config.geolocation_base_url.trim_end_matches('/'),
            urlencoding::encode(key)
        );

        let request = self.client.post(&url).json(&json!({ "considerIp": true }));
        let response: GeolocateResponse = send_json("geolocation", &url, request)
            .await
            .map_err(|e| AppError::resolution(format!("Geolocation failed: {}", e.message())))?;

        let Some(location) = response.location else {
            warn!("Geolocation response carried no location");
            return Err(AppError::resolution("Geolocation data not found"));
        };

        info!(
            "Geolocated caller to ({:.4}, {:.4}), accuracy {:.0} m",
            location.lat,
            location.lng,
            response.accuracy.unwrap_or(f64::NAN)
        );

        Coordinate::new(location.lat, location.lng)
    }
}
