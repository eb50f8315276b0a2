use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::model::{Condition, CurrentSnapshot, RawSample, UnitMode};

use super::{FetchError, WeatherProvider};

/// Format of the `dt_txt` field of forecast entries.
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// GET `{base_url}/{endpoint}` and decode the body.
    ///
    /// The service reports unknown cities through the `cod` field of the body,
    /// so the HTTP status is not consulted. Send, read and non-JSON failures are
    /// [`FetchError::Transport`]; JSON of the wrong shape is
    /// [`FetchError::Malformed`].
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &str,
        units: UnitMode,
    ) -> Result<T, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, query, units = units.as_str(), "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                FetchError::Transport(format!(
                    "Failed to send request to OpenWeather ({endpoint}): {e}"
                ))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            FetchError::Transport(format!(
                "Failed to read OpenWeather {endpoint} response body: {e}"
            ))
        })?;

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            FetchError::Transport(format!(
                "OpenWeather {endpoint} returned non-JSON body (status {status}): {e}: {}",
                truncate_body(&body)
            ))
        })?;

        if is_not_found(&value) {
            debug!(endpoint, query, "OpenWeather reported city not found");
            return Err(FetchError::NotFound);
        }

        serde_json::from_value(value).map_err(|e| {
            FetchError::Malformed(format!(
                "Failed to parse OpenWeather {endpoint} JSON (status {status}): {e}: {}",
                truncate_body(&body)
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

impl From<OwWeather> for Condition {
    fn from(w: OwWeather) -> Self {
        Condition {
            main: w.main,
            description: w.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl From<OwCurrentResponse> for CurrentSnapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        CurrentSnapshot {
            city: parsed.name,
            temperature: parsed.main.temp,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            wind_deg: parsed.wind.deg,
            conditions: parsed.weather.into_iter().map(Condition::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    #[serde(deserialize_with = "deserialize_dt_txt")]
    dt_txt: NaiveDateTime,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwForecastEntry> for RawSample {
    fn from(entry: OwForecastEntry) -> Self {
        RawSample {
            timestamp: entry.dt_txt,
            temperature: entry.main.temp,
            conditions: entry.weather.into_iter().map(Condition::from).collect(),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(
        &self,
        query: &str,
        units: UnitMode,
    ) -> Result<CurrentSnapshot, FetchError> {
        let parsed: OwCurrentResponse = self.get("weather", query, units).await?;
        Ok(parsed.into())
    }

    async fn fetch_forecast(
        &self,
        query: &str,
        units: UnitMode,
    ) -> Result<Vec<RawSample>, FetchError> {
        let parsed: OwForecastResponse = self.get("forecast", query, units).await?;
        Ok(parsed.list.into_iter().map(RawSample::from).collect())
    }
}

fn is_not_found(body: &Value) -> bool {
    matches!(body.get("cod"), Some(Value::String(cod)) if cod == "404")
}

fn deserialize_dt_txt<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, DT_TXT_FORMAT).map_err(serde::de::Error::custom)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_found_requires_string_cod() {
        assert!(is_not_found(&json!({"cod": "404", "message": "city not found"})));
        assert!(!is_not_found(&json!({"cod": 404})));
        assert!(!is_not_found(&json!({"cod": "200"})));
        assert!(!is_not_found(&json!({})));
    }

    #[test]
    fn forecast_entry_parses_dt_txt() {
        let entry: OwForecastEntry = serde_json::from_value(json!({
            "dt": 1705320000,
            "dt_txt": "2024-01-15 12:00:00",
            "main": {"temp": 4.2, "humidity": 80},
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds"}]
        }))
        .expect("entry should parse");

        let sample = RawSample::from(entry);
        assert_eq!(sample.timestamp.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 12:00");
        assert_eq!(sample.temperature, 4.2);
        assert_eq!(sample.primary_condition().map(|c| c.main.as_str()), Some("Clouds"));
    }

    #[test]
    fn forecast_entry_rejects_bad_timestamp() {
        let res: Result<OwForecastEntry, _> = serde_json::from_value(json!({
            "dt_txt": "yesterday",
            "main": {"temp": 1.0},
            "weather": []
        }));
        assert!(res.is_err());
    }

    #[test]
    fn current_response_maps_to_snapshot() {
        let parsed: OwCurrentResponse = serde_json::from_value(json!({
            "cod": 200,
            "name": "Noida",
            "main": {
                "temp": 30.1,
                "temp_min": 28.0,
                "temp_max": 31.5,
                "humidity": 40,
                "feels_like": 33.0
            },
            "wind": {"speed": 3.6, "deg": 270},
            "weather": [{"main": "Haze", "description": "haze"}]
        }))
        .expect("current should parse");

        let snapshot = CurrentSnapshot::from(parsed);
        assert_eq!(snapshot.city, "Noida");
        assert_eq!(snapshot.humidity_pct, 40);
        assert_eq!(snapshot.wind_deg, 270.0);
        assert_eq!(snapshot.primary_condition().map(|c| c.description.as_str()), Some("haze"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
