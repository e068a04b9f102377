//! The fetch → translate → publish loop.
//!
//! Each cycle fetches the weather once, publishes the condition and
//! temperature messages, then every custom message in order. Any failure
//! aborts the rest of the cycle and the loop waits the backoff before
//! trying again. It never gives up.

use std::time::Duration;
use tokio::sync::watch;

use crate::config::DisplayConfig;
use crate::message::{self, DisplayMessage};
use crate::publisher::{ConnectError, MqttPublisher, PublishError, Publisher};
use crate::translate::translate;
use crate::weather::{FetchError, WeatherReading, WeatherSource};

/// Failure inside one cycle. Logged and turned into a backoff.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("weather fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
}

/// Where the loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Built around an existing publisher, no cycle run yet.
    Idle,
    /// Broker session established by [`DisplayLoop::connect`], no cycle run yet.
    Connecting,
    /// The last started cycle is running or completed normally.
    Running { cycle: u64 },
    /// The last cycle failed; the next one starts after the backoff.
    Backoff { cycle: u64 },
}

/// Timings and message set of a running loop.
#[derive(Debug, Clone)]
pub struct LoopPlan {
    pub weather_url: String,
    pub topic_prefix: String,
    pub custom: Vec<DisplayMessage>,
    pub interval: Duration,
    pub backoff: Duration,
}

impl LoopPlan {
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            weather_url: config.weather_url.clone(),
            topic_prefix: config.broker.topic_prefix.clone(),
            custom: config.custom_messages(),
            interval: config.interval(),
            backoff: config.backoff(),
        }
    }

    /// All messages for one cycle: condition, temperature, then custom.
    pub fn messages_for(&self, reading: &WeatherReading) -> Vec<DisplayMessage> {
        let condition = translate(&reading.condition_text);
        let mut messages = Vec::with_capacity(self.custom.len() + 2);
        messages.push(message::condition_message(&self.topic_prefix, condition));
        messages.push(message::temperature_message(&self.topic_prefix, reading));
        messages.extend(self.custom.iter().cloned());
        messages
    }
}

pub struct DisplayLoop<S, P> {
    source: S,
    publisher: P,
    plan: LoopPlan,
    state: LoopState,
    cycle: u64,
}

impl<S: WeatherSource> DisplayLoop<S, MqttPublisher> {
    /// Connect to the broker from `config`. Failure here is fatal.
    pub async fn connect(source: S, config: &DisplayConfig) -> Result<Self, ConnectError> {
        let publisher =
            MqttPublisher::connect(&config.broker, &config.client_id(), config.keepalive()).await?;
        let mut display = Self::new(source, publisher, LoopPlan::from_config(config));
        display.state = LoopState::Connecting;
        Ok(display)
    }
}

impl<S: WeatherSource, P: Publisher> DisplayLoop<S, P> {
    pub fn new(source: S, publisher: P, plan: LoopPlan) -> Self {
        Self {
            source,
            publisher,
            plan,
            state: LoopState::Idle,
            cycle: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn plan(&self) -> &LoopPlan {
        &self.plan
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Run one cycle, stopping at the first error. Returns messages sent.
    pub async fn run_cycle(&self) -> Result<usize, CycleError> {
        let reading = self.source.fetch(&self.plan.weather_url).await?;
        let messages = self.plan.messages_for(&reading);
        for msg in &messages {
            self.publisher.publish(&msg.topic, msg).await?;
        }
        Ok(messages.len())
    }

    /// Run one cycle and return how long to wait before the next one.
    pub async fn step(&mut self) -> Duration {
        self.cycle += 1;
        let cycle = self.cycle;
        self.state = LoopState::Running { cycle };

        match self.run_cycle().await {
            Ok(sent) => {
                log::info!("Cycle {} complete: {} messages sent", cycle, sent);
                self.plan.interval
            }
            Err(e) => {
                log::error!("Cycle {} failed: {}", cycle, e);
                log::warn!(
                    "Waiting {} seconds before trying again...",
                    self.plan.backoff.as_secs()
                );
                self.state = LoopState::Backoff { cycle };
                self.plan.backoff
            }
        }
    }

    /// Run cycles until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: watch::Receiver<()>) {
        log::info!(
            "Publishing {} messages every {}s to {}/*",
            self.plan.custom.len() + 2,
            self.plan.interval.as_secs(),
            self.plan.topic_prefix
        );
        loop {
            let wait = tokio::select! {
                wait = self.step() => wait,
                _ = shutdown.changed() => break,
            };
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.changed() => break,
            }
        }
        log::info!("Display loop stopped after {} cycles", self.cycle);
    }
}
