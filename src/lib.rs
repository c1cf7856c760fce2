//! `GeoWeather` - location-aware weather and nearby places behind a login
//!
//! This library resolves place names or the caller's address to coordinates,
//! looks up current weather and highly rated places nearby, and serves both
//! as HTML pages and a small JSON API for registered users.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod pages;
pub mod places;
pub mod store;
pub mod telemetry;
pub mod upstream;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::AppConfig;
pub use error::{ApiError, AppError};
pub use location_resolver::LocationResolver;
pub use models::{Coordinate, PlaceResult, User, WeatherReport};
pub use places::PlacesLookup;
pub use store::UserStore;
pub use weather::WeatherLookup;
pub use web::AppState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AppError>;
