//! MQTT publishing of display messages.
//!
//! [`MqttPublisher::connect`] waits for the broker to acknowledge the session
//! and then hands the rumqttc event loop to a background task, which keeps
//! the connection alive and reconnects after network errors.

use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Packet, QoS};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::BrokerTarget;
use crate::message::DisplayMessage;

/// How long to wait for the broker's CONNACK at startup.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between reconnect attempts of the background event loop.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Capacity of the request channel between client and event loop.
const REQUEST_CAPACITY: usize = 10;

/// Initial broker connection failure. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("failed to connect to MQTT broker {broker}: {source}")]
    Broker {
        broker: String,
        #[source]
        source: ConnectionError,
    },
    #[error("timed out after {timeout:?} waiting for MQTT broker {broker}")]
    Timeout { broker: String, timeout: Duration },
}

/// A single publish failed.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("not connected to MQTT broker {0}")]
    NotConnected(String),
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("broker rejected publish to {topic}: {source}")]
    Rejected {
        topic: String,
        #[source]
        source: rumqttc::ClientError,
    },
}

/// Publishes display messages to topics.
pub trait Publisher: Send + Sync {
    fn publish(
        &self,
        topic: &str,
        message: &DisplayMessage,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// Publisher backed by a rumqttc client with a background event loop.
pub struct MqttPublisher {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    broker: String,
}

impl MqttPublisher {
    /// Connect to the broker and wait for it to accept the session.
    pub async fn connect(
        target: &BrokerTarget,
        client_id: &str,
        keepalive: Duration,
    ) -> Result<Self, ConnectError> {
        let broker = format!("{}:{}", target.host, target.port);
        log::info!("Connecting to MQTT broker at {} as '{}'", broker, client_id);

        let mut options = MqttOptions::new(client_id, target.host.clone(), target.port);
        options.set_keep_alive(keepalive);
        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);

        match tokio::time::timeout(CONNECT_TIMEOUT, wait_for_connack(&mut event_loop)).await {
            Ok(Ok(())) => {}
            Ok(Err(source)) => {
                return Err(ConnectError::Broker { broker, source });
            }
            Err(_) => {
                return Err(ConnectError::Timeout {
                    broker,
                    timeout: CONNECT_TIMEOUT,
                });
            }
        }
        log::info!("Connected to MQTT broker {}", broker);

        let connected = Arc::new(AtomicBool::new(true));
        spawn_event_loop(event_loop, broker.clone(), connected.clone());

        Ok(Self {
            client,
            connected,
            broker,
        })
    }

    /// Whether the background event loop currently holds a session.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, message: &DisplayMessage) -> Result<(), PublishError> {
        if !self.is_connected() {
            return Err(PublishError::NotConnected(self.broker.clone()));
        }
        let payload = message.to_payload()?;
        log::info!(
            "Sending to {}: {}",
            topic,
            String::from_utf8_lossy(&payload)
        );
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|source| PublishError::Rejected {
                topic: topic.to_string(),
                source,
            })
    }
}

async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<(), ConnectionError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(_)) = event_loop.poll().await? {
            return Ok(());
        }
    }
}

/// Drive the event loop in a background task.
///
/// Polling handles network I/O, keepalive pings and reconnection. The
/// `connected` flag follows the session state so publishes fail fast while
/// the broker is unreachable.
fn spawn_event_loop(mut event_loop: EventLoop, broker: String, connected: Arc<AtomicBool>) {
    tokio::spawn(async move {
        log::debug!("MQTT event loop started for {}", broker);
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    if !connected.swap(true, Ordering::Relaxed) {
                        log::info!("Reconnected to MQTT broker {}", broker);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    if connected.swap(false, Ordering::Relaxed) {
                        log::warn!("MQTT connection to {} lost: {}", broker, e);
                    } else {
                        log::debug!("MQTT reconnect to {} failed: {}", broker, e);
                    }
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_refused_is_connect_error() {
        // Bind and drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let target = BrokerTarget {
            host: "127.0.0.1".to_string(),
            port,
            topic_prefix: "awtrix/custom".to_string(),
        };
        let result = MqttPublisher::connect(&target, "test-client", Duration::from_secs(60)).await;
        match result {
            Err(ConnectError::Broker { broker, .. }) => {
                assert_eq!(broker, format!("127.0.0.1:{}", port));
            }
            Err(other) => panic!("expected Broker error, got {}", other),
            Ok(_) => panic!("connect to a closed port must fail"),
        }
    }

    #[tokio::test]
    async fn test_connect_fails_without_connack() {
        // Accepts TCP but never speaks MQTT.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let target = BrokerTarget {
            host: "127.0.0.1".to_string(),
            port,
            topic_prefix: "awtrix/custom".to_string(),
        };
        let result = MqttPublisher::connect(&target, "test-client", Duration::from_secs(60)).await;
        // rumqttc's own handshake timeout may fire before ours.
        assert!(matches!(
            result,
            Err(ConnectError::Timeout { .. }) | Err(ConnectError::Broker { .. })
        ));
        server.abort();
    }

    fn message() -> DisplayMessage {
        DisplayMessage {
            text: "Hi".to_string(),
            icon: None,
            color: crate::message::Rgb::WHITE,
            duration: 5,
            topic: "awtrix/custom/custom_msg_1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_fails_after_broker_drops_session() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Accepts the session, then hangs up when told to.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (drop_tx, drop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut connect = [0u8; 256];
            let _ = socket.read(&mut connect).await.unwrap();
            socket.write_all(&[0x20, 0x02, 0x00, 0x00]).await.unwrap();
            let _ = drop_rx.await;
        });

        let target = BrokerTarget {
            host: "127.0.0.1".to_string(),
            port,
            topic_prefix: "awtrix/custom".to_string(),
        };
        let publisher = MqttPublisher::connect(&target, "test-client", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(publisher.is_connected());
        publisher
            .publish("awtrix/custom/custom_msg_1", &message())
            .await
            .unwrap();

        drop_tx.send(()).unwrap();
        server.await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while publisher.is_connected() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("event loop did not notice the dropped session");

        match publisher.publish("awtrix/custom/custom_msg_1", &message()).await {
            Err(PublishError::NotConnected(broker)) => {
                assert_eq!(broker, format!("127.0.0.1:{}", port));
            }
            other => panic!("expected NotConnected, got {:?}", other),
        }
    }
}
