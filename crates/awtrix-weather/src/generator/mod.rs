//! Interactive builder for the display configuration.
//!
//! Walks the operator through broker, weather source and custom messages,
//! re-prompting on invalid input, and renders the result into the config
//! template consumed by `awtrix-weather run`.

mod prompt;
mod template;

pub use prompt::Prompter;
pub use template::{process_template, quoted, render, TemplateVars, CONFIG_TEMPLATE};

use std::io::{BufRead, Write};
use std::path::Path;

use crate::config::{
    BrokerTarget, CustomMessage, DisplayConfig, DEFAULT_DURATION_SECS, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_TOPIC_PREFIX, DEFAULT_WEATHER_URL,
};
use crate::message::Rgb;
use crate::validation::{self, ValidationError};

/// Answer that ends the custom message list.
pub const DONE_SENTINEL: &str = "done";

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input closed before the configuration was complete")]
    InputClosed,
    #[error("Output file already exists: {0} (use --force to overwrite)")]
    OutputExists(String),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Map the compile-time target OS to a display name.
pub fn detect_os() -> Option<&'static str> {
    os_display_name(std::env::consts::OS)
}

fn os_display_name(os: &str) -> Option<&'static str> {
    let os = os.to_lowercase();
    if os.contains("macos") || os.contains("osx") || os == "darwin" {
        Some("macOS")
    } else if os.contains("windows") {
        Some("Windows")
    } else if os.contains("linux") {
        Some("Linux")
    } else {
        None
    }
}

/// Interactive configuration session.
pub struct ScriptGenerator<R, W> {
    prompter: Prompter<R, W>,
    detected_os: Option<&'static str>,
}

impl<R: BufRead, W: Write> ScriptGenerator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            prompter: Prompter::new(input, output),
            detected_os: detect_os(),
        }
    }

    /// Override OS detection.
    pub fn with_detected_os(mut self, os: Option<&'static str>) -> Self {
        self.detected_os = os;
        self
    }

    /// Ask for the OS when detection failed. Informational only.
    fn resolve_os(&mut self) -> Result<String> {
        if let Some(os) = self.detected_os {
            return Ok(os.to_string());
        }
        self.prompter
            .say("\nCould not automatically detect the operating system.")?;
        let answer = self
            .prompter
            .ask("What OS is this (e.g., macOS, Windows, Linux)?", None)?;
        Ok(match os_display_name(&answer) {
            Some(os) => os.to_string(),
            None => {
                self.prompter.say("Unrecognized OS. Using 'Unknown'.")?;
                "Unknown".to_string()
            }
        })
    }

    fn ask_broker(&mut self) -> Result<BrokerTarget> {
        let host = self.prompter.ask_valid(
            "Enter MQTT Broker IP/Hostname",
            Some(DEFAULT_HOST),
            |s| {
                if s.is_empty() {
                    Err(ValidationError::EmptyHost)
                } else {
                    Ok(s.to_string())
                }
            },
        )?;
        let port = self.prompter.ask_valid(
            "Enter MQTT Port",
            Some(&DEFAULT_PORT.to_string()),
            validation::parse_port,
        )?;
        let topic_prefix = self.prompter.ask_valid(
            "Enter Base MQTT Topic (e.g., awtrix/custom)",
            Some(DEFAULT_TOPIC_PREFIX),
            |s| {
                validation::validate_topic_prefix(s)?;
                Ok(s.trim_end_matches('/').to_string())
            },
        )?;
        Ok(BrokerTarget {
            host,
            port,
            topic_prefix,
        })
    }

    /// Ask for one message. `None` when the operator typed the sentinel.
    fn ask_message(&mut self, index: usize) -> Result<Option<CustomMessage>> {
        self.prompter.say(&format!("\n--- Message {} ---", index))?;
        let text = self.prompter.ask_valid(
            &format!(
                "Enter text for message {} (or '{}' to finish)",
                index, DONE_SENTINEL
            ),
            None,
            |s| {
                if s.eq_ignore_ascii_case(DONE_SENTINEL) {
                    Ok(None)
                } else if s.is_empty() {
                    Err(ValidationError::EmptyText)
                } else {
                    Ok(Some(s.to_string()))
                }
            },
        )?;
        let Some(text) = text else {
            return Ok(None);
        };

        let icon = self.prompter.ask_valid(
            &format!(
                "Enter icon ID for message {} (optional, leave empty for no icon)",
                index
            ),
            None,
            validation::parse_icon,
        )?;
        let color = self.prompter.ask_valid(
            &format!("Enter color for message {} (R,G,B)", index),
            Some(&Rgb::WHITE.to_string()),
            validation::parse_color,
        )?;
        let duration = self.prompter.ask_valid(
            &format!("Enter duration in seconds for message {}", index),
            Some(&DEFAULT_DURATION_SECS.to_string()),
            validation::parse_duration,
        )?;

        Ok(Some(CustomMessage {
            text,
            icon,
            color,
            duration,
            topic: None,
        }))
    }

    /// Run the whole session. Returns the config and the OS name.
    pub fn collect(&mut self) -> Result<(DisplayConfig, String)> {
        self.prompter.say("--- AWTRIX Weather Config Builder ---")?;
        let os = self.resolve_os()?;
        self.prompter.say(&format!("\nDetected OS: {}", os))?;
        self.prompter.say(&"-".repeat(30))?;

        let broker = self.ask_broker()?;
        let weather_url = self.prompter.ask_valid(
            "Enter wttr.in weather URL (e.g., https://wttr.in/Frankfurt?format=j1)",
            Some(DEFAULT_WEATHER_URL),
            |s| {
                validation::validate_weather_url(s)?;
                Ok(s.to_string())
            },
        )?;

        self.prompter.say("\n--- Custom Messages ---")?;
        self.prompter
            .say("You can add multiple custom messages to be displayed on your AWTRIX.")?;
        self.prompter.say(&format!(
            "Type '{}' for the text to finish adding messages.",
            DONE_SENTINEL
        ))?;

        let mut messages = Vec::new();
        while let Some(msg) = self.ask_message(messages.len() + 1)? {
            messages.push(msg);
        }

        let config = DisplayConfig {
            broker,
            weather_url,
            messages,
            ..Default::default()
        };
        config.validate()?;
        Ok((config, os))
    }

    /// Run the session and render the config file contents.
    pub fn generate(&mut self) -> Result<String> {
        let (config, os) = self.collect()?;
        Ok(render(&config, &os))
    }

    pub fn into_output(self) -> W {
        self.prompter.into_output()
    }
}

/// Write the rendered config. Refuses to overwrite unless `force` is set.
pub fn write_output(path: &Path, contents: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(GeneratorError::OutputExists(path.display().to_string()));
    }
    std::fs::write(path, contents).map_err(|source| GeneratorError::Write {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("Created file: {}", path.display());
    Ok(())
}
