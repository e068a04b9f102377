//! Weather and custom messages for an AWTRIX display, over MQTT.
//!
//! Every cycle fetches the current conditions from wttr.in, translates the
//! description to German and publishes it, the temperature, and each
//! configured custom message to its own topic under the configured prefix.
//! Failed cycles back off and retry forever.

pub mod cli;
pub mod config;
pub mod display_loop;
pub mod generator;
pub mod message;
pub mod publisher;
pub mod translate;
pub mod validation;
pub mod weather;

pub use config::{BrokerTarget, ConfigError, CustomMessage, DisplayConfig};
pub use display_loop::{CycleError, DisplayLoop, LoopPlan, LoopState};
pub use generator::{GeneratorError, ScriptGenerator};
pub use message::{DisplayMessage, Rgb};
pub use publisher::{ConnectError, MqttPublisher, PublishError, Publisher};
pub use translate::translate;
pub use validation::ValidationError;
pub use weather::{FetchError, WeatherReading, WeatherSource, WttrClient};

/// Initialize logging with env_logger.
///
/// Respects RUST_LOG environment variable. Defaults to "info" level.
pub fn setup_logging() {
    drop(
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init(),
    );
}
