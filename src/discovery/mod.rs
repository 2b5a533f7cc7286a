// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! mDNS discovery of Dyson devices.
//!
//! Dyson devices on the local network advertise their MQTT broker as the
//! `_dyson_mqtt._tcp` service. Discovery browses for that service for a fixed
//! window and yields one [`ServiceRecord`] per resolved device.
//!
//! # Examples
//!
//! ```no_run
//! use dyslink::discovery::{DiscoveryOptions, browse};
//! use std::time::Duration;
//!
//! # async fn example() -> dyslink::Result<()> {
//! let options = DiscoveryOptions::new().with_timeout(Duration::from_secs(5));
//! let mut records = browse(&options)?;
//!
//! while let Some(record) = records.recv().await {
//!     for address in record.connection_strings() {
//!         println!("{} at {address}", record.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use tokio::sync::mpsc;

use crate::error::ProtocolError;

/// Service type Dyson devices advertise.
pub const SERVICE_TYPE: &str = "_dyson_mqtt._tcp.local.";

/// Default discovery timeout.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Options for mDNS discovery.
///
/// # Examples
///
/// ```
/// use dyslink::discovery::DiscoveryOptions;
/// use std::time::Duration;
///
/// let options = DiscoveryOptions::new().with_timeout(Duration::from_secs(5));
/// assert_eq!(options.timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// How long to listen for announcements.
    timeout: Option<Duration>,
}

impl DiscoveryOptions {
    /// Creates options with default settings.
    ///
    /// Default timeout is 15 seconds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the discovery timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the discovery timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_DISCOVERY_TIMEOUT)
    }
}

/// One discovered device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Full service instance name.
    pub name: String,
    /// Advertised host name.
    pub hostname: String,
    /// Resolved addresses, IPv4 first.
    pub addresses: Vec<IpAddr>,
    /// Broker port.
    pub port: u16,
}

impl ServiceRecord {
    /// Creates a record, ordering addresses IPv4 first.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        hostname: impl Into<String>,
        mut addresses: Vec<IpAddr>,
        port: u16,
    ) -> Self {
        addresses.sort_by_key(|ip| (ip.is_ipv6(), *ip));
        addresses.dedup();
        Self {
            name: name.into(),
            hostname: hostname.into(),
            addresses,
            port,
        }
    }

    fn from_info(info: &ServiceInfo) -> Self {
        Self::new(
            info.get_fullname(),
            info.get_hostname(),
            info.get_addresses().iter().map(|ip| IpAddr::from(*ip)).collect(),
            info.get_port(),
        )
    }

    /// Returns the connection string for one address.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyslink::discovery::ServiceRecord;
    ///
    /// let record = ServiceRecord::new("fan", "fan.local.", vec![], 1883);
    /// assert_eq!(
    ///     record.connection_string("192.168.1.20".parse().unwrap()),
    ///     "tcp://192.168.1.20:1883"
    /// );
    /// ```
    #[must_use]
    pub fn connection_string(&self, ip: IpAddr) -> String {
        format!("tcp://{}", SocketAddr::new(ip, self.port))
    }

    /// Returns a connection string for every address.
    #[must_use]
    pub fn connection_strings(&self) -> Vec<String> {
        self.addresses
            .iter()
            .map(|ip| self.connection_string(*ip))
            .collect()
    }
}

/// Addresses already reported, per service instance name.
type SeenAddresses = HashMap<String, HashSet<IpAddr>>;

/// Narrows a resolved record to the addresses not reported yet.
///
/// Returns `None` when every address of the record was already reported.
/// A record that resolves without addresses is reported once.
fn unreported(seen: &mut SeenAddresses, record: ServiceRecord) -> Option<ServiceRecord> {
    let first = !seen.contains_key(&record.name);
    let known = seen.entry(record.name.clone()).or_default();
    let fresh: Vec<IpAddr> = record
        .addresses
        .iter()
        .copied()
        .filter(|ip| known.insert(*ip))
        .collect();

    if fresh.is_empty() && !first {
        return None;
    }
    Some(ServiceRecord {
        addresses: fresh,
        ..record
    })
}

/// Browses for Dyson devices until the options' timeout elapses.
///
/// Records are delivered as they resolve; the channel closes when the window
/// ends. A service instance that resolves again with more addresses is
/// reported again with only the new ones. Must be called from within a Tokio
/// runtime.
///
/// # Errors
///
/// Returns `ProtocolError::Discovery` if the mDNS daemon cannot start.
pub fn browse(options: &DiscoveryOptions) -> Result<mpsc::Receiver<ServiceRecord>, ProtocolError> {
    let timeout = options.timeout();

    tracing::info!(
        service_type = SERVICE_TYPE,
        timeout_secs = timeout.as_secs(),
        "Starting mDNS discovery"
    );

    let daemon = ServiceDaemon::new()?;
    let events = daemon.browse(SERVICE_TYPE)?;
    let (record_tx, record_rx) = mpsc::channel(4);

    tokio::task::spawn_blocking(move || {
        let deadline = Instant::now() + timeout;
        let mut seen = SeenAddresses::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match events.recv_timeout(remaining) {
                Ok(ServiceEvent::ServiceResolved(info)) => {
                    let Some(record) = unreported(&mut seen, ServiceRecord::from_info(&info))
                    else {
                        continue;
                    };
                    tracing::debug!(
                        name = %record.name,
                        addresses = record.addresses.len(),
                        "Resolved device"
                    );
                    if record_tx.blocking_send(record).is_err() {
                        break;
                    }
                }
                Ok(event) => tracing::trace!(?event, "mDNS event"),
                Err(_) => break,
            }
        }

        tracing::info!(discovered = seen.len(), "mDNS discovery completed");

        if let Err(e) = daemon.shutdown() {
            tracing::warn!(error = %e, "Failed to stop mDNS daemon");
        }
    });

    Ok(record_rx)
}
