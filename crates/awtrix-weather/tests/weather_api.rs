//! WttrClient against a local fake weather API.

mod common;

use awtrix_weather::{FetchError, WeatherReading, WeatherSource, WttrClient};
use std::time::Duration;

fn client() -> WttrClient {
    WttrClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_string_temperature() {
    let base = common::spawn_server(common::weather_api()).await;
    let reading = client().fetch(&format!("{}/sunny", base)).await.unwrap();
    assert_eq!(
        reading,
        WeatherReading {
            temperature_celsius: 21,
            condition_text: "Sunny".to_string(),
        }
    );
}

#[tokio::test]
async fn test_fetch_numeric_temperature_truncates() {
    let base = common::spawn_server(common::weather_api()).await;
    let reading = client().fetch(&format!("{}/numeric", base)).await.unwrap();
    assert_eq!(reading.temperature_celsius, -7);
    assert_eq!(reading.condition_text, "Heavy Rain Shower");
}

#[tokio::test]
async fn test_fetch_non_2xx_is_status_error() {
    let base = common::spawn_server(common::weather_api()).await;
    let result = client().fetch(&format!("{}/unavailable", base)).await;
    assert!(matches!(result, Err(FetchError::Status(503))));

    let result = client().fetch(&format!("{}/no-such-route", base)).await;
    assert!(matches!(result, Err(FetchError::Status(404))));
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let base = common::spawn_server(common::weather_api()).await;
    for path in ["/html", "/missing-desc"] {
        let result = client().fetch(&format!("{}{}", base, path)).await;
        assert!(
            matches!(result, Err(FetchError::Malformed(_))),
            "expected Malformed for {}",
            path
        );
    }
}

#[tokio::test]
async fn test_fetch_network_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = client().fetch(&format!("http://127.0.0.1:{}/", port)).await;
    assert!(matches!(result, Err(FetchError::Http(_))));
}
