//! YAML configuration for the display loop.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::message::{self, DisplayMessage, Rgb, CONDITION_TOPIC, TEMPERATURE_TOPIC};
use crate::validation::{self, ValidationError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC_PREFIX: &str = "awtrix/custom";
/// Frankfurt am Main.
pub const DEFAULT_WEATHER_URL: &str = "https://wttr.in/50.0104,9.0294?format=j1";
pub const DEFAULT_DURATION_SECS: u32 = 5;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Where display messages are published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerTarget {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
}

impl Default for BrokerTarget {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            topic_prefix: default_topic_prefix(),
        }
    }
}

/// A user-defined message shown after the weather.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Rgb,
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Explicit topic. Derived from the message position when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// Everything the display loop needs, as written by `awtrix-weather generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub broker: BrokerTarget,
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    #[serde(default)]
    pub messages: Vec<CustomMessage>,
    /// Wait after a successful cycle.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Wait after a failed cycle.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// MQTT client id, `awtrix-weather-<hostname>` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Log the startup banner once before connecting.
    #[serde(default)]
    pub show_banner: bool,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_topic_prefix() -> String {
    DEFAULT_TOPIC_PREFIX.to_string()
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

fn default_interval_secs() -> u64 {
    30
}

fn default_backoff_secs() -> u64 {
    60
}

fn default_keepalive_secs() -> u64 {
    60
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            broker: BrokerTarget::default(),
            weather_url: default_weather_url(),
            messages: Vec::new(),
            interval_secs: default_interval_secs(),
            backoff_secs: default_backoff_secs(),
            keepalive_secs: default_keepalive_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            client_id: None,
            show_banner: false,
        }
    }
}

impl DisplayConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.broker.host.trim().is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        if self.broker.port == 0 {
            return Err(ValidationError::Port("0".to_string()));
        }
        validation::validate_topic_prefix(&self.broker.topic_prefix)?;
        validation::validate_weather_url(&self.weather_url)?;

        for (field, secs) in [
            ("interval_secs", self.interval_secs),
            ("backoff_secs", self.backoff_secs),
            ("keepalive_secs", self.keepalive_secs),
            ("http_timeout_secs", self.http_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ValidationError::ZeroSeconds { field });
            }
        }
        // Sent as a u16 in the CONNECT packet.
        if self.keepalive_secs > u64::from(u16::MAX) {
            return Err(ValidationError::KeepAlive(self.keepalive_secs));
        }
        if self.backoff_secs < self.interval_secs {
            return Err(ValidationError::BackoffTooShort {
                backoff: self.backoff_secs,
                interval: self.interval_secs,
            });
        }

        for msg in &self.messages {
            if msg.text.is_empty() {
                return Err(ValidationError::EmptyText);
            }
            if let Some(icon) = &msg.icon {
                validation::validate_icon(icon)?;
            }
            if msg.duration == 0 {
                return Err(ValidationError::Duration("0".to_string()));
            }
        }

        let mut seen = HashSet::new();
        for topic in self.topics() {
            if topic.is_empty() || topic.contains(['+', '#']) {
                return Err(ValidationError::TopicPrefix(topic));
            }
            if !seen.insert(topic.clone()) {
                return Err(ValidationError::DuplicateTopic(topic));
            }
        }
        Ok(())
    }

    /// Every topic published in one cycle, in publish order.
    pub fn topics(&self) -> Vec<String> {
        let prefix = &self.broker.topic_prefix;
        let mut topics = vec![
            message::topic(prefix, CONDITION_TOPIC),
            message::topic(prefix, TEMPERATURE_TOPIC),
        ];
        topics.extend(self.custom_messages().into_iter().map(|m| m.topic));
        topics
    }

    /// Custom messages with their topics resolved, in configured order.
    pub fn custom_messages(&self) -> Vec<DisplayMessage> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, msg)| DisplayMessage {
                text: msg.text.clone(),
                icon: msg.icon.clone(),
                color: msg.color,
                duration: msg.duration,
                topic: msg
                    .topic
                    .clone()
                    .unwrap_or_else(|| message::custom_topic(&self.broker.topic_prefix, i + 1)),
            })
            .collect()
    }

    pub fn client_id(&self) -> String {
        self.client_id.clone().unwrap_or_else(|| {
            let host = hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            format!("awtrix-weather-{}", host)
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
