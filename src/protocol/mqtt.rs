// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT session with a Dyson device.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

use chrono::Utc;
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError, Event, EventLoop, MqttOptions, Outgoing,
    Packet, QoS,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::command::Command;
use crate::error::{DeviceError, Error, ParseError, ProtocolError};
use crate::protocol::{MessageCallback, Session};
use crate::telemetry::parse_message;
use crate::types::DeviceModel;

/// Port the device's broker listens on.
const DEFAULT_PORT: u16 = 1883;

/// How long to wait for the device to accept the connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long `close` waits for queued messages to go out.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Capacity of the message callback channel.
const CALLBACK_CAPACITY: usize = 16;

/// Pause between reconnection attempts after the connection drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// MQTT client connected to one Dyson device.
///
/// Uses the Dyson local topic structure:
/// - Commands: `<model>/<serial>/command`
/// - Messages: `<model>/<serial>/status/current`
///
/// Messages from the device are decoded and delivered on the channel returned
/// alongside the client. A dropped connection is reported on the channel and
/// retried until the client is closed.
///
/// # Examples
///
/// ```ignore
/// use dyslink::protocol::{DeviceClient, Session};
/// use dyslink::command::FanState;
/// use dyslink::types::{DeviceModel, Toggle};
///
/// let (client, mut messages) = DeviceClient::builder()
///     .address("tcp://192.168.1.20:1883")
///     .model(DeviceModel::N475)
///     .credentials("AB1-EU-XYZ", "local-password")
///     .build()
///     .await?;
///
/// client.set_state(FanState::oscillation(Toggle::On)).await?;
/// client.request_current_state().await?;
/// let first = messages.recv().await;
/// client.close().await;
/// ```
#[derive(Debug)]
pub struct DeviceClient {
    client: AsyncClient,
    model: DeviceModel,
    serial: String,
    event_task: JoinHandle<()>,
}

impl DeviceClient {
    /// Creates a builder for a device connection.
    #[must_use]
    pub fn builder() -> DeviceClientBuilder {
        DeviceClientBuilder::new()
    }

    /// Returns the device model.
    #[must_use]
    pub fn model(&self) -> DeviceModel {
        self.model
    }

    /// Returns the device serial.
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Returns the topic commands are published to.
    #[must_use]
    pub fn command_topic(&self) -> String {
        command_topic(self.model, &self.serial)
    }

    /// Disconnects, giving queued messages a moment to reach the device.
    pub async fn close(self) {
        if let Err(e) = self.client.disconnect().await {
            tracing::warn!(error = %e, "Failed to queue MQTT disconnect");
            self.event_task.abort();
            return;
        }
        if tokio::time::timeout(CLOSE_TIMEOUT, self.event_task)
            .await
            .is_err()
        {
            tracing::warn!("MQTT event loop did not stop in time");
        }
    }

    /// Publishes a payload to the command topic.
    async fn publish(&self, payload: String) -> Result<(), ProtocolError> {
        let topic = self.command_topic();

        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT command");

        self.client
            .publish(&topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(ProtocolError::Mqtt)
    }
}

impl Session for DeviceClient {
    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<(), ProtocolError> {
        self.publish(command.mqtt_payload(Utc::now())).await
    }
}

fn command_topic(model: DeviceModel, serial: &str) -> String {
    format!("{}/{serial}/command", model.product_type())
}

fn status_topic(model: DeviceModel, serial: &str) -> String {
    format!("{}/{serial}/status/current", model.product_type())
}

/// Parses a device address into host and port.
///
/// Accepts `tcp://host:port`, `mqtt://host:port`, `host:port` and `host`,
/// with IPv6 hosts in brackets.
pub(crate) fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    if url.is_empty() {
        return Err(ProtocolError::InvalidAddress("empty address".to_string()));
    }

    if let Some(rest) = url.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| ProtocolError::InvalidAddress(format!("Unclosed bracket: {url}")))?;
        let port = match after.strip_prefix(':') {
            Some(p) => parse_port(p)?,
            None if after.is_empty() => DEFAULT_PORT,
            None => return Err(ProtocolError::InvalidAddress(format!("Invalid address: {url}"))),
        };
        return Ok((host.to_string(), port));
    }

    // A bare IPv6 address has more than one colon and no port.
    if url.matches(':').count() > 1 {
        return Ok((url.to_string(), DEFAULT_PORT));
    }

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        (h.to_string(), parse_port(p)?)
    } else {
        (url.to_string(), DEFAULT_PORT)
    };

    Ok((host, port))
}

fn parse_port(port: &str) -> Result<u16, ProtocolError> {
    port.parse()
        .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {port}")))
}

/// Polls the event loop until the device acknowledges the connection.
async fn wait_for_connack(
    event_loop: &mut EventLoop,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let handshake = async {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                    tracing::debug!(?connack, "MQTT connected");
                    return Ok(());
                }
                Ok(_) => {}
                Err(ConnectionError::ConnectionRefused(
                    ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized,
                )) => return Err(ProtocolError::AuthenticationFailed),
                Err(e) => return Err(ProtocolError::ConnectionFailed(e.to_string())),
            }
        }
    };

    // Safe: connect timeouts are seconds, far below u64::MAX milliseconds
    #[allow(clippy::cast_possible_truncation)]
    let timeout_ms = timeout.as_millis() as u64;

    tokio::time::timeout(timeout, handshake)
        .await
        .map_err(|_| ProtocolError::Timeout(timeout_ms))?
}

/// Decodes a publication, or returns `None` if it is not on the status topic.
fn decode_publish(topic: &str, payload: &[u8], status_topic: &str) -> Option<MessageCallback> {
    if topic != status_topic {
        tracing::trace!(topic, "Ignoring message on foreign topic");
        return None;
    }
    let Ok(payload) = std::str::from_utf8(payload) else {
        return Some(Err(ParseError::InvalidUtf8(topic.to_string()).into()));
    };
    tracing::debug!(topic, payload, "Received MQTT message");
    Some(parse_message(payload).map_err(Error::from))
}

/// Handles MQTT events in the background, decoding device messages.
///
/// Connection errors are forwarded and the loop keeps polling, which makes
/// the event loop reconnect. It stops once a disconnect was sent or the
/// receiver is gone.
async fn handle_mqtt_events(
    client: AsyncClient,
    mut event_loop: EventLoop,
    status_topic: String,
    callback_tx: mpsc::Sender<MessageCallback>,
) {
    let mut closing = false;

    loop {
        let callback = match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                // Clean sessions drop subscriptions on reconnect.
                tracing::info!(?connack, "MQTT reconnected");
                if let Err(e) = client.try_subscribe(status_topic.as_str(), QoS::AtLeastOnce) {
                    tracing::warn!(error = %e, "Failed to renew MQTT subscription");
                }
                continue;
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
                continue;
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match decode_publish(&publish.topic, &publish.payload, &status_topic) {
                    Some(callback) => callback,
                    None => continue,
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::debug!("MQTT disconnect sent");
                closing = true;
                continue;
            }
            Ok(_) => continue,
            Err(e) if closing => {
                tracing::debug!(error = %e, "MQTT connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(error = %e, "MQTT event loop error");
                let failure = Err(ProtocolError::ConnectionFailed(e.to_string()).into());
                if callback_tx.send(failure).await.is_err() {
                    break;
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
                continue;
            }
        };

        if callback_tx.send(callback).await.is_err() {
            tracing::debug!("Message receiver dropped, stopping event loop");
            break;
        }
    }
}

/// Builder for a [`DeviceClient`].
#[derive(Debug, Default)]
pub struct DeviceClientBuilder {
    address: Option<String>,
    model: Option<DeviceModel>,
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
    keep_alive: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl DeviceClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the device address (e.g. `tcp://192.168.1.20:1883`).
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the device model.
    #[must_use]
    pub fn model(mut self, model: DeviceModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the device credentials.
    ///
    /// The username is the device serial, which also names the device's
    /// topics. The password is handed to the broker unchanged.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets a custom client ID.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = Some(duration);
        self
    }

    /// Sets how long to wait for the device to accept the connection.
    #[must_use]
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Connects to the device and subscribes to its status topic.
    ///
    /// Returns the client and the channel on which device messages arrive.
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing, the address is invalid,
    /// or the device refuses or does not answer the connection.
    pub async fn build(self) -> Result<(DeviceClient, mpsc::Receiver<MessageCallback>), Error> {
        let address = self
            .address
            .ok_or_else(|| ProtocolError::InvalidAddress("address is required".to_string()))?;
        let model = self
            .model
            .ok_or_else(|| DeviceError::InvalidConfiguration("model is required".to_string()))?;
        let serial = self.username.clone().unwrap_or_default();
        if serial.is_empty() {
            return Err(DeviceError::InvalidConfiguration(
                "user (device serial) is required".to_string(),
            )
            .into());
        }

        let (host, port) = parse_mqtt_url(&address)?;

        // Generate or use provided client ID (PID + counter to avoid conflicts)
        let client_id = self.client_id.unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("dyslink_{}_{}", std::process::id(), counter)
        });

        let mut mqtt_options = MqttOptions::new(&client_id, host.as_str(), port);
        mqtt_options.set_keep_alive(self.keep_alive.unwrap_or(Duration::from_secs(30)));
        mqtt_options.set_clean_session(true);

        if let (Some(username), Some(password)) = (self.username, self.password) {
            mqtt_options.set_credentials(username, password);
        }

        tracing::info!(%host, port, %model, %serial, "Connecting to device");

        let (client, mut event_loop) = AsyncClient::new(mqtt_options, 10);

        wait_for_connack(
            &mut event_loop,
            self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
        )
        .await?;

        let topic = status_topic(model, &serial);
        client
            .subscribe(topic.as_str(), QoS::AtLeastOnce)
            .await
            .map_err(ProtocolError::Mqtt)?;

        let (callback_tx, callback_rx) = mpsc::channel(CALLBACK_CAPACITY);
        let event_task = tokio::spawn(handle_mqtt_events(
            client.clone(),
            event_loop,
            topic,
            callback_tx,
        ));

        Ok((
            DeviceClient {
                client,
                model,
                serial,
                event_task,
            },
            callback_rx,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::DeviceMessage;

    #[test]
    fn parse_mqtt_url_with_port() {
        let (host, port) = parse_mqtt_url("mqtt://192.168.1.50:1883").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_default_port() {
        let (host, port) = parse_mqtt_url("192.168.1.50").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_tcp_scheme() {
        let (host, port) = parse_mqtt_url("tcp://dyson.local:8883").unwrap();
        assert_eq!(host, "dyson.local");
        assert_eq!(port, 8883);
    }

    #[test]
    fn parse_mqtt_url_ipv6() {
        let (host, port) = parse_mqtt_url("tcp://[fe80::1]:1883").unwrap();
        assert_eq!(host, "fe80::1");
        assert_eq!(port, 1883);

        let (host, port) = parse_mqtt_url("[fe80::1]").unwrap();
        assert_eq!(host, "fe80::1");
        assert_eq!(port, 1883);

        let (host, port) = parse_mqtt_url("fe80::1").unwrap();
        assert_eq!(host, "fe80::1");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_invalid() {
        assert!(parse_mqtt_url("host:notaport").is_err());
        assert!(parse_mqtt_url("tcp://").is_err());
        assert!(parse_mqtt_url("[fe80::1").is_err());
        assert!(parse_mqtt_url("[fe80::1]1883").is_err());
    }

    #[test]
    fn device_topics() {
        assert_eq!(command_topic(DeviceModel::N475, "AB1"), "475/AB1/command");
        assert_eq!(
            status_topic(DeviceModel::N455, "AB1"),
            "455/AB1/status/current"
        );
    }

    const STATUS: &str = "475/AB1/status/current";

    #[test]
    fn decode_publish_on_status_topic() {
        let payload = br#"{"msg":"CURRENT-STATE","product-state":{"fmod":"AUTO"}}"#;

        let message = decode_publish(STATUS, payload, STATUS).unwrap().unwrap();
        match message {
            DeviceMessage::ProductState(state) => {
                assert_eq!(state.fan_mode.as_deref(), Some("AUTO"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn decode_publish_ignores_other_topics() {
        let payload = br#"{"msg":"CURRENT-STATE"}"#;

        assert!(decode_publish("475/AB1/status/software", payload, STATUS).is_none());
        assert!(decode_publish("475/OTHER/status/current", payload, STATUS).is_none());
    }

    #[test]
    fn decode_publish_rejects_invalid_utf8() {
        let err = decode_publish(STATUS, &[0xff, 0xfe, 0x7b], STATUS)
            .unwrap()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::InvalidUtf8(ref topic)) if topic == STATUS
        ));
    }

    #[test]
    fn decode_publish_reports_malformed_json() {
        let result = decode_publish(STATUS, b"{not json", STATUS).unwrap();
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn event_loop_keeps_reporting_lost_connection() {
        // Nothing listens on a port just released by the OS.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let options = MqttOptions::new("dyslink_test", "127.0.0.1", port);
        let (client, event_loop) = AsyncClient::new(options, 10);
        let (tx, mut rx) = mpsc::channel(CALLBACK_CAPACITY);

        let task = tokio::spawn(handle_mqtt_events(
            client,
            event_loop,
            STATUS.to_string(),
            tx,
        ));

        for _ in 0..2 {
            let callback = tokio::time::timeout(Duration::from_secs(10), rx.recv())
                .await
                .expect("event loop stalled")
                .expect("event loop stopped after the first error");
            assert!(matches!(
                callback,
                Err(Error::Protocol(ProtocolError::ConnectionFailed(_)))
            ));
        }

        drop(rx);
        tokio::time::timeout(Duration::from_secs(10), task)
            .await
            .expect("event loop kept running without a receiver")
            .unwrap();
    }

    #[test]
    fn builder_records_settings() {
        let builder = DeviceClientBuilder::new()
            .address("tcp://10.0.0.2:1883")
            .model(DeviceModel::N469)
            .credentials("serial", "pass")
            .client_id("my_client")
            .keep_alive(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(3));

        assert_eq!(builder.address.as_deref(), Some("tcp://10.0.0.2:1883"));
        assert_eq!(builder.model, Some(DeviceModel::N469));
        assert_eq!(builder.username.as_deref(), Some("serial"));
        assert_eq!(builder.password.as_deref(), Some("pass"));
        assert_eq!(builder.client_id.as_deref(), Some("my_client"));
        assert_eq!(builder.keep_alive, Some(Duration::from_secs(60)));
        assert_eq!(builder.connect_timeout, Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn build_requires_address() {
        let err = DeviceClientBuilder::new()
            .model(DeviceModel::N475)
            .credentials("serial", "pass")
            .build()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn build_requires_serial() {
        let err = DeviceClientBuilder::new()
            .address("127.0.0.1:1")
            .model(DeviceModel::N475)
            .build()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Device(DeviceError::InvalidConfiguration(_))
        ));
    }
}
