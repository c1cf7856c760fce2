//! Weather report passed through from the weather service

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current conditions exactly as the weather service returned them
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct WeatherReport(pub Value);

impl WeatherReport {
    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }

    fn number(&self, pointer: &str) -> Option<f64> {
        self.0.pointer(pointer).and_then(Value::as_f64)
    }

    fn text(&self, pointer: &str) -> Option<&str> {
        self.0.pointer(pointer).and_then(Value::as_str)
    }

    /// Display-ready view of the fields the weather page shows
    #[must_use]
    pub fn summary(&self) -> WeatherSummary {
        let wind = self.number("/wind/speed").map(|speed| {
            match self.number("/wind/deg") {
                Some(deg) => format!(
                    "{speed:.1} m/s {}",
                    WeatherSummary::wind_direction_to_cardinal(deg.round() as u16)
                ),
                None => format!("{speed:.1} m/s"),
            }
        });

        WeatherSummary {
            place: self.text("/name").filter(|s| !s.is_empty()).map(str::to_string),
            description: self
                .text("/weather/0/description")
                .map(WeatherSummary::capitalize),
            temperature: self
                .number("/main/temp")
                .map(|k| format!("{:.1}°C", WeatherSummary::kelvin_to_celsius(k))),
            feels_like: self
                .number("/main/feels_like")
                .map(|k| format!("{:.1}°C", WeatherSummary::kelvin_to_celsius(k))),
            humidity: self.number("/main/humidity").map(|h| format!("{h:.0}%")),
            pressure: self.number("/main/pressure").map(|p| format!("{p:.0} hPa")),
            wind,
        }
    }
}

/// Formatted weather values; `None` when the report lacks the field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherSummary {
    pub place: Option<String>,
    pub description: Option<String>,
    pub temperature: Option<String>,
    pub feels_like: Option<String>,
    pub humidity: Option<String>,
    pub pressure: Option<String>,
    pub wind: Option<String>,
}

impl WeatherSummary {
    /// OpenWeatherMap reports temperatures in Kelvin unless told otherwise
    #[must_use]
    pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
        kelvin - 273.15
    }

    #[must_use]
    pub fn wind_direction_to_cardinal(degrees: u16) -> &'static str {
        match degrees {
            0..=11 | 349..=360 => "N",
            12..=33 => "NNE",
            34..=56 => "NE",
            57..=78 => "ENE",
            79..=101 => "E",
            102..=123 => "ESE",
            124..=146 => "SE",
            147..=168 => "SSE",
            169..=191 => "S",
            192..=213 => "SSW",
            214..=236 => "SW",
            237..=258 => "WSW",
            259..=281 => "W",
            282..=303 => "WNW",
            304..=326 => "NW",
            327..=348 => "NNW",
            _ => "Unknown",
        }
    }

    fn capitalize(text: &str) -> String {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
