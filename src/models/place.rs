//! Nearby point of interest as returned by the places service

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::Coordinate;

/// A single nearby place.
///
/// Known fields are typed; every other upstream field is kept in `extra`
/// so the API can return the result as the service described it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaceResult {
    #[serde(default)]
    pub name: String,
    /// Missing or null ratings count as 0
    #[serde(default, deserialize_with = "null_as_zero")]
    pub rating: f64,
    /// Categories such as "restaurant", "food"
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    /// Distance from the query coordinate, filled in after the lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Geometry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl PlaceResult {
    /// Where the place is, when the service reported it
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        let location = self.geometry.as_ref()?.location?;
        Coordinate::new(location.lat, location.lng).ok()
    }
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Sort by rating (highest first) and keep at most `limit` places.
///
/// The sort is stable, so places with equal ratings keep the service's order.
#[must_use]
pub fn rank_places(mut places: Vec<PlaceResult>, limit: usize) -> Vec<PlaceResult> {
    places.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    places.truncate(limit);
    places
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn place(name: &str, rating: Option<f64>) -> PlaceResult {
        let mut value = json!({ "name": name });
        if let Some(rating) = rating {
            value["rating"] = json!(rating);
        }
        serde_json::from_value(value).unwrap()
    }

    fn names(places: &[PlaceResult]) -> Vec<&str> {
        places.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let places = vec![
            place("a", Some(3.1)),
            place("b", Some(4.8)),
            place("c", Some(2.0)),
            place("d", Some(4.9)),
            place("e", Some(3.9)),
            place("f", Some(4.0)),
            place("g", Some(1.0)),
        ];

        let ranked = rank_places(places, 5);
        assert_eq!(names(&ranked), vec!["d", "b", "f", "e", "a"]);
        assert!(ranked.windows(2).all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn test_missing_rating_sorts_as_zero() {
        let places = vec![place("unrated", None), place("low", Some(0.5)), place("zero", Some(0.0))];
        let ranked = rank_places(places, 5);
        assert_eq!(names(&ranked), vec!["low", "unrated", "zero"]);
        assert_eq!(ranked[1].rating, 0.0);
    }

    #[test]
    fn test_ties_keep_service_order() {
        let places = vec![
            place("first", Some(4.0)),
            place("second", Some(4.0)),
            place("top", Some(5.0)),
            place("third", Some(4.0)),
        ];
        let ranked = rank_places(places, 5);
        assert_eq!(names(&ranked), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_short_lists_are_not_padded() {
        let ranked = rank_places(vec![place("only", Some(2.0))], 5);
        assert_eq!(ranked.len(), 1);
        assert!(rank_places(Vec::new(), 5).is_empty());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let value = json!({
            "name": "Cafe",
            "rating": 4.2,
            "types": ["cafe", "food"],
            "opening_hours": { "open_now": true },
            "geometry": { "location": { "lat": 52.0, "lng": 4.0 }, "viewport": {} }
        });
        let place: PlaceResult = serde_json::from_value(value).unwrap();
        assert_eq!(place.types, vec!["cafe", "food"]);
        assert_eq!(place.coordinate(), Some(Coordinate { latitude: 52.0, longitude: 4.0 }));

        let out = serde_json::to_value(&place).unwrap();
        assert_eq!(out["opening_hours"]["open_now"], true);
        assert!(out["geometry"].get("viewport").is_some());
    }

    #[test]
    fn test_incomplete_entries_do_not_spoil_the_list() {
        let value = json!([
            { "name": "Complete", "rating": 4.5, "geometry": { "location": { "lat": 52.0, "lng": 4.0 } } },
            { "name": "No location", "rating": 4.0, "geometry": { "viewport": {} } },
            { "name": "Null rating", "rating": null }
        ]);
        let places: Vec<PlaceResult> = serde_json::from_value(value).unwrap();
        assert_eq!(places.len(), 3);

        assert!(places[1].coordinate().is_none());
        assert!(places[1].geometry.as_ref().unwrap().extra.contains_key("viewport"));
        assert_eq!(places[2].rating, 0.0);

        let ranked = rank_places(places, 5);
        assert_eq!(names(&ranked), vec!["Complete", "No location", "Null rating"]);
    }
}
