// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the device session using mockforge-mqtt.

use std::time::Duration;

use dyslink::command::FanState;
use dyslink::protocol::{DeviceClient, Session};
use dyslink::types::{DeviceModel, FanMode, FanSpeed, HeatSetting, Toggle};
use dyslink::{Error, ProtocolError};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::time::sleep;

const SERIAL: &str = "AB1-EU-XYZ";

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind before clients connect
    sleep(Duration::from_millis(500)).await;
}

async fn connect(address: &str) -> dyslink::Result<DeviceClient> {
    let (client, _messages) = DeviceClient::builder()
        .address(address)
        .model(DeviceModel::N475)
        .credentials(SERIAL, "local-password")
        .connect_timeout(Duration::from_secs(5))
        .build()
        .await?;
    Ok(client)
}

// ============================================================================
// Connection Tests
// ============================================================================

mod connection {
    use super::*;

    #[tokio::test]
    async fn connect_with_tcp_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = connect(&format!("tcp://127.0.0.1:{port}")).await;
        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());

        let client = result.unwrap();
        assert_eq!(client.serial(), SERIAL);
        assert_eq!(client.model(), DeviceModel::N475);
        assert_eq!(client.command_topic(), "475/AB1-EU-XYZ/command");
        client.close().await;
    }

    #[tokio::test]
    async fn connect_with_mqtt_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let client = connect(&format!("mqtt://127.0.0.1:{port}")).await.unwrap();
        client.close().await;
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let client = connect(&format!("127.0.0.1:{port}")).await.unwrap();
        client.close().await;
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let port = get_test_port();

        let err = connect(&format!("tcp://127.0.0.1:{port}"))
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                Error::Protocol(ProtocolError::ConnectionFailed(_) | ProtocolError::Timeout(_))
            ),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn connect_to_invalid_address_fails() {
        let err = connect("tcp://127.0.0.1:notaport").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::InvalidAddress(_))
        ));
    }
}

// ============================================================================
// Builder Tests
// ============================================================================

mod builder {
    use super::*;

    #[tokio::test]
    async fn build_missing_address_fails() {
        let result = DeviceClient::builder()
            .model(DeviceModel::N455)
            .credentials(SERIAL, "pw")
            .build()
            .await;

        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::InvalidAddress(_)))
        ));
    }

    #[tokio::test]
    async fn build_missing_model_fails() {
        let result = DeviceClient::builder()
            .address("tcp://127.0.0.1:1883")
            .credentials(SERIAL, "pw")
            .build()
            .await;

        assert!(matches!(result, Err(Error::Device(_))));
    }

    #[tokio::test]
    async fn build_missing_serial_fails() {
        let result = DeviceClient::builder()
            .address("tcp://127.0.0.1:1883")
            .model(DeviceModel::N469)
            .build()
            .await;

        assert!(matches!(result, Err(Error::Device(_))));
    }
}

// ============================================================================
// Command Publishing Tests
// ============================================================================

mod publishing {
    use super::*;

    #[tokio::test]
    async fn publish_state_changes() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let client = connect(&format!("tcp://127.0.0.1:{port}")).await.unwrap();

        client
            .set_state(FanState::fan_mode(FanMode::Fan))
            .await
            .unwrap();
        client
            .set_state(FanState::fan_speed(FanSpeed::new(4).unwrap()))
            .await
            .unwrap();
        client
            .set_state(FanState::oscillation(Toggle::On))
            .await
            .unwrap();
        client
            .set_state(FanState::heat(HeatSetting::Off))
            .await
            .unwrap();
        client.set_state(FanState::reset_filter()).await.unwrap();

        client.close().await;
    }

    #[tokio::test]
    async fn publish_requests() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let client = connect(&format!("tcp://127.0.0.1:{port}")).await.unwrap();

        client.request_current_state().await.unwrap();
        client.wifi_bootstrap("home", "secret").await.unwrap();

        client.close().await;
    }
}

// ============================================================================
// Message Delivery
// ============================================================================
//
// The mockforge-mqtt broker does not forward publications between clients,
// so decoding of device messages is covered by the unit tests in
// src/telemetry and the handler tests in src/cli/handlers.rs.
