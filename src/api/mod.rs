//! JSON endpoints mounted under `/api`.
//!
//! Errors always use the `{"error": ..., "details"?: ...}` body of [`ApiError`].

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde_json::Value;
use tracing::{error, info};

use crate::AppError;
use crate::error::ApiError;
use crate::models::PlaceResult;
use crate::web::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/weather/{city}", get(weather_for_city))
        .route("/places", get(nearby_places))
        .route("/geolocation", get(weather_here))
}

/// Weather for a named place
async fn weather_for_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let lookup = async {
        let coord = state.resolver.resolve(Some(&city)).await?;
        state.weather.fetch(&coord).await
    };

    match lookup.await {
        Ok(report) => Ok(Json(report.into_inner())),
        Err(err) => {
            error!(city = %city, "Weather lookup failed: {}", err);
            let summary = match &err {
                AppError::Parse { .. } => "Failed to parse weather data",
                _ => "Failed to retrieve weather data",
            };
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, summary)
                .with_details(err.message()))
        }
    }
}

/// Best rated places near the caller
async fn nearby_places(State(state): State<AppState>) -> Result<Json<Vec<PlaceResult>>, ApiError> {
    let coord = state.resolver.resolve(None).await?;
    let places = state
        .places
        .fetch(
            &coord,
            state.config.places.radius_meters,
            &state.config.places.category,
        )
        .await?;

    info!(count = places.len(), "Returning nearby places");
    Ok(Json(places))
}

/// Weather at the caller's own location
async fn weather_here(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let lookup = async {
        let coord = state.resolver.resolve(None).await?;
        state.weather.fetch(&coord).await
    };

    match lookup.await {
        Ok(report) => Ok(Json(report.into_inner())),
        Err(err) => {
            error!("Geolocation weather failed: {}", err);
            Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.message()))
        }
    }
}
