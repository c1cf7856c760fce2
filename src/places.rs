//! Nearby places lookup against the Google Places Nearby Search API

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::UpstreamConfig;
use crate::models::place::rank_places;
use crate::models::{Coordinate, PlaceResult};
use crate::upstream::{require_key, send_json};
use crate::AppError;

/// Message used when a search comes back empty
pub const NO_PLACES_FOUND: &str = "No places found nearby";

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Clone)]
pub struct PlacesLookup {
    client: Client,
    config: Arc<UpstreamConfig>,
    max_results: usize,
}

impl PlacesLookup {
    pub fn new(client: Client, config: Arc<UpstreamConfig>, max_results: usize) -> Self {
        Self {
            client,
            config,
            max_results,
        }
    }

    /// Fetch places of `category` within `radius_meters`, best rated first.
    ///
    /// Returns at most `max_results` places; an empty search is a `NotFound` error.
    #[instrument(skip(self), fields(lat = coord.latitude, lon = coord.longitude))]
    pub async fn fetch(
        &self,
        coord: &Coordinate,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<PlaceResult>, AppError> {
        let key = require_key(&self.config.google_maps_api_key, "GOOGLE_MAPS_API_KEY")?;
        let url = format!(
            "{}/maps/api/place/nearbysearch/json?location={},{}&radius={}&type={}&key={}",
            self.config.places_base_url.trim_end_matches('/'),
            coord.latitude,
            coord.longitude,
            radius_meters,
            urlencoding::encode(category),
            urlencoding::encode(key)
        );

        let response: NearbySearchResponse =
            send_json("places", &url, self.client.get(&url)).await?;

        match response.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            status => {
                warn!(status, "Places search was rejected");
                let detail = response
                    .error_message
                    .map(|m| format!(": {m}"))
                    .unwrap_or_default();
                return Err(AppError::network(format!(
                    "places search failed with status {status}{detail}"
                )));
            }
        }

        if response.results.is_empty() {
            return Err(AppError::not_found(NO_PLACES_FOUND));
        }

        debug!("Places search returned {} results", response.results.len());

        let mut places = rank_places(response.results, self.max_results);
        for place in &mut places {
            place.distance_meters = place
                .coordinate()
                .map(|location| coord.distance_meters(&location).round());
        }

        Ok(places)
    }
}
