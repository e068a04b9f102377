//! Display messages and their MQTT payload encoding.

use serde::{Deserialize, Serialize};

use crate::weather::WeatherReading;

/// Sub-topic of the weather condition message.
pub const CONDITION_TOPIC: &str = "Wetter";
/// Sub-topic of the temperature message.
pub const TEMPERATURE_TOPIC: &str = "Temp";

/// An RGB color, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{},{},{}", r, g, b)
    }
}

/// One notification for the display, bound to the topic it is published on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub text: String,
    pub icon: Option<String>,
    pub color: Rgb,
    /// Seconds the display shows the message.
    pub duration: u32,
    pub topic: String,
}

/// Wire format of a display message. `icon` is left out when absent.
#[derive(Debug, Serialize)]
struct Payload<'a> {
    text: &'a str,
    duration: u32,
    color: Rgb,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon: Option<&'a str>,
}

impl DisplayMessage {
    /// Encode as the compact JSON payload the display expects.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&Payload {
            text: &self.text,
            duration: self.duration,
            color: self.color,
            icon: self.icon.as_deref(),
        })
    }
}

/// Join a topic prefix and a sub-topic with exactly one `/`.
pub fn topic(prefix: &str, sub: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), sub)
}

/// Topic of the `index`-th custom message, counting from 1.
pub fn custom_topic(prefix: &str, index: usize) -> String {
    topic(prefix, &format!("custom_msg_{}", index))
}

/// Fixed styling of one of the weather messages.
#[derive(Debug, Clone, Copy)]
pub struct FixedStyle {
    pub icon: &'static str,
    pub color: Rgb,
    pub duration: u32,
}

pub const CONDITION_STYLE: FixedStyle = FixedStyle {
    icon: "16785",
    color: Rgb([0, 200, 255]),
    duration: 5,
};

pub const TEMPERATURE_STYLE: FixedStyle = FixedStyle {
    icon: "2497",
    color: Rgb([255, 0, 255]),
    duration: 5,
};

/// Build the condition message. `condition` is the already translated text.
pub fn condition_message(prefix: &str, condition: &str) -> DisplayMessage {
    DisplayMessage {
        text: condition.to_string(),
        icon: Some(CONDITION_STYLE.icon.to_string()),
        color: CONDITION_STYLE.color,
        duration: CONDITION_STYLE.duration,
        topic: topic(prefix, CONDITION_TOPIC),
    }
}

/// Build the temperature message, e.g. `21°C`.
pub fn temperature_message(prefix: &str, reading: &WeatherReading) -> DisplayMessage {
    DisplayMessage {
        text: format!("{}°C", reading.temperature_celsius),
        icon: Some(TEMPERATURE_STYLE.icon.to_string()),
        color: TEMPERATURE_STYLE.color,
        duration: TEMPERATURE_STYLE.duration,
        topic: topic(prefix, TEMPERATURE_TOPIC),
    }
}
