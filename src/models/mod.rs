//! Data models for the GeoWeather application
//!
//! - Coordinate: a resolved latitude/longitude pair
//! - Place: ranked nearby points of interest
//! - Weather: upstream weather reports and their page summary
//! - User: registered accounts

pub mod coordinate;
pub mod place;
pub mod user;
pub mod weather;

pub use coordinate::Coordinate;
pub use place::PlaceResult;
pub use user::{NewUser, User};
pub use weather::{WeatherReport, WeatherSummary};
