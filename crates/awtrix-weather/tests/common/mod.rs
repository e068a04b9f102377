//! Shared helpers for awtrix-weather integration tests.

#![allow(dead_code)]

use awtrix_weather::{DisplayMessage, PublishError, Publisher};
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use std::sync::Mutex;

pub const SUNNY_21: &str = r#"{
    "current_condition": [
        {
            "FeelsLikeC": "21",
            "humidity": "40",
            "temp_C": "21",
            "temp_F": "70",
            "weatherCode": "113",
            "weatherDesc": [{"value": "Sunny"}]
        }
    ],
    "nearest_area": [],
    "weather": []
}"#;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A fake wttr.in with a few canned endpoints.
pub fn weather_api() -> Router {
    Router::new()
        .route(
            "/sunny",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], SUNNY_21) }),
        )
        .route(
            "/numeric",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"current_condition":[{"temp_C":-7.9,"weatherDesc":[{"value":"Heavy Rain Shower"}]}]}"#,
                )
            }),
        )
        .route(
            "/unavailable",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "Unknown location") }),
        )
        .route(
            "/html",
            get(|| async { "<html>Follow @igor_chubin for wttr.in updates</html>" }),
        )
        .route(
            "/missing-desc",
            get(|| async { r#"{"current_condition":[{"temp_C":"12"}]}"# }),
        )
}

/// Records every publish as `(topic, payload)`.
#[derive(Default)]
pub struct RecordingPublisher {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingPublisher {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, message: &DisplayMessage) -> Result<(), PublishError> {
        let payload = String::from_utf8(message.to_payload()?).unwrap();
        self.sent.lock().unwrap().push((topic.to_string(), payload));
        Ok(())
    }
}
