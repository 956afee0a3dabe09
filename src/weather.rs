use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::types::{Coordinates, WeatherSnapshot};

pub const DEFAULT_API_URL: &str = "https://api.weatherapi.com/v1";

/// Best-effort current-conditions lookup. Callers treat failures as
/// non-events: log and move on.
pub trait WeatherProvider: Send + Sync {
    fn current(&self, at: Coordinates) -> Result<WeatherSnapshot>;
}

pub struct WeatherApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl WeatherProvider for WeatherApiClient {
    fn current(&self, at: Coordinates) -> Result<WeatherSnapshot> {
        // The key rides in the query string; keep the URL out of logs.
        let url = format!(
            "{}/current.json?key={}&q={},{}&aqi=no",
            self.base_url, self.api_key, at.lat, at.lng
        );
        crate::dlog!("weather request lat={} lng={}", at.lat, at.lng);

        let response = self.client.get(url).send().context("Requesting weather")?;
        let status = response.status();
        if !status.is_success() {
            bail!("Weather endpoint returned {status}");
        }
        let body: ApiResponse = response.json().context("Parsing weather response")?;
        Ok(snapshot_from(body))
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    location: ApiLocation,
    current: ApiCurrent,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_c: f64,
}

fn snapshot_from(body: ApiResponse) -> WeatherSnapshot {
    WeatherSnapshot {
        location: body.location.name,
        temp_c: body.current.temp_c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_body_maps_to_a_snapshot() {
        // Trimmed from a real weatherapi.com payload.
        let raw = r#"{
            "location": {"name": "Quimper", "country": "France"},
            "current": {"temp_c": 18.4, "humidity": 77}
        }"#;
        let body: ApiResponse = serde_json::from_str(raw).unwrap();
        let snapshot = snapshot_from(body);
        assert_eq!(snapshot.location, "Quimper");
        assert!((snapshot.temp_c - 18.4).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_fields_fail_to_parse() {
        let raw = r#"{"location": {"name": "Quimper"}}"#;
        assert!(serde_json::from_str::<ApiResponse>(raw).is_err());
    }
}
