// ── Runtime configuration ──
//
// These types describe how to reach the Hue bridge and the relay. They
// carry credentials and timing, but never touch disk: the binary builds
// them from huelink-config and hands them in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Path of the relay's websocket endpoint.
pub const RELAY_PATH: &str = "/ws";

/// How to reach the Hue bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Bridge base URL (e.g., `http://192.168.1.2`).
    pub address: Url,
    /// Application key ("username") issued by the bridge at pairing.
    pub app_key: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// How to reach the relay and how often to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Peer `host[:port]`, without scheme or path.
    pub address: String,
    /// Dial `wss://` instead of `ws://`.
    pub secure: bool,
    /// Fixed pause between a failed dial (or a broken session) and the next dial.
    ///
    /// This also applies after a live session is lost, so a dropped relay
    /// is redialed `retry_delay` later, never immediately.
    pub retry_delay: Duration,
    /// Pause between periodic `group_state` broadcasts.
    pub broadcast_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            address: "localhost:4000".into(),
            secure: false,
            retry_delay: Duration::from_secs(3),
            broadcast_interval: Duration::from_secs(5),
        }
    }
}

impl RelayConfig {
    /// Websocket URL of the relay endpoint.
    pub fn url(&self) -> Result<Url, CoreError> {
        let scheme = if self.secure { "wss" } else { "ws" };
        let address = self.address.trim().trim_end_matches('/');
        if address.is_empty() {
            return Err(CoreError::Config {
                message: "relay address is empty".into(),
            });
        }
        Url::parse(&format!("{scheme}://{address}{RELAY_PATH}")).map_err(|e| CoreError::Config {
            message: format!("Invalid relay address '{address}': {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn default_relay_url() {
        let url = RelayConfig::default().url().unwrap();
        assert_eq!(url.as_str(), "ws://localhost:4000/ws");
    }

    #[test]
    fn secure_relay_url() {
        let config = RelayConfig {
            address: "relay.example.com/".into(),
            secure: true,
            ..RelayConfig::default()
        };
        assert_eq!(config.url().unwrap().as_str(), "wss://relay.example.com/ws");
    }

    #[test]
    fn empty_address_is_rejected() {
        let config = RelayConfig {
            address: "  ".into(),
            ..RelayConfig::default()
        };
        assert!(matches!(config.url(), Err(CoreError::Config { .. })));
    }
}
