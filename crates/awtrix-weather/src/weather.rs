//! wttr.in client: one GET, one normalized reading.

use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Current conditions as shown on the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReading {
    pub temperature_celsius: i32,
    /// Untranslated condition text, e.g. `Partly cloudy`.
    pub condition_text: String,
}

/// Errors from fetching or parsing the weather.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("weather API returned status {0}")]
    Status(u16),
    #[error("malformed weather response: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// A source of current weather readings.
pub trait WeatherSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<WeatherReading>> + Send;
}

// ── wttr.in wire format ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WttrResponse {
    current_condition: Vec<CurrentCondition>,
}

#[derive(Debug, Deserialize)]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: Temperature,
    #[serde(rename = "weatherDesc")]
    weather_desc: Vec<TextValue>,
}

/// wttr.in sends numbers as strings; accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Temperature {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

impl Temperature {
    fn truncated(&self) -> Result<i32> {
        let value = match self {
            Temperature::Number(n) => *n,
            Temperature::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| FetchError::Malformed(format!("temp_C is not a number: {:?}", s)))?,
        };
        if !value.is_finite() || value < i32::MIN as f64 || value > i32::MAX as f64 {
            return Err(FetchError::Malformed(format!(
                "temp_C out of range: {}",
                value
            )));
        }
        Ok(value.trunc() as i32)
    }
}

/// Parse a wttr.in `format=j1` body into a reading.
pub fn parse_reading(body: &[u8]) -> Result<WeatherReading> {
    let response: WttrResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let current = response
        .current_condition
        .first()
        .ok_or_else(|| FetchError::Malformed("current_condition is empty".to_string()))?;
    let desc = current
        .weather_desc
        .first()
        .ok_or_else(|| FetchError::Malformed("weatherDesc is empty".to_string()))?;

    Ok(WeatherReading {
        temperature_celsius: current.temp_c.truncated()?,
        condition_text: desc.value.clone(),
    })
}

// ── HTTP client ─────────────────────────────────────────────────────

/// HTTP weather client backed by reqwest.
#[derive(Debug, Clone)]
pub struct WttrClient {
    client: reqwest::Client,
}

impl WttrClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("awtrix-weather/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl WeatherSource for WttrClient {
    async fn fetch(&self, url: &str) -> Result<WeatherReading> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.bytes().await?;
        let reading = parse_reading(&body)?;
        log::debug!("Weather description: {}", reading.condition_text);
        Ok(reading)
    }
}
