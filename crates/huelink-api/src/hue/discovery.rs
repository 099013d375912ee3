// Bridge discovery
//
// Uses the Hue cloud N-UPnP endpoint, which lists bridges that have
// recently checked in from the caller's public IP.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::hue::client::parse_response;

/// Public N-UPnP discovery endpoint.
pub const DISCOVERY_URL: &str = "https://discovery.meethue.com/";

/// A bridge reported by the discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    pub id: String,

    #[serde(rename = "internalipaddress")]
    pub internal_ip: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl DiscoveredBridge {
    /// Base URL for talking to this bridge over the local network.
    pub fn base_url(&self) -> Result<Url, Error> {
        let host = match self.port {
            Some(port) if port != 80 && port != 443 => format!("{}:{port}", self.internal_ip),
            _ => self.internal_ip.clone(),
        };
        Ok(Url::parse(&format!("http://{host}"))?)
    }
}

/// Query the discovery endpoint and return every bridge it lists.
///
/// Returns [`Error::NoBridgeFound`] when the list is empty.
pub async fn discover(
    http: &reqwest::Client,
    discovery_url: &Url,
) -> Result<Vec<DiscoveredBridge>, Error> {
    debug!(url = %discovery_url, "discovering bridges");

    let resp = http
        .get(discovery_url.clone())
        .send()
        .await
        .map_err(Error::Transport)?;

    let bridges: Vec<DiscoveredBridge> = parse_response(resp).await?;
    if bridges.is_empty() {
        return Err(Error::NoBridgeFound);
    }
    Ok(bridges)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn base_url_skips_default_ports() {
        let bridge = DiscoveredBridge {
            id: "001788fffe000001".into(),
            internal_ip: "192.168.1.20".into(),
            port: Some(443),
        };
        assert_eq!(bridge.base_url().unwrap().as_str(), "http://192.168.1.20/");

        let custom = DiscoveredBridge {
            port: Some(8080),
            ..bridge
        };
        assert_eq!(custom.base_url().unwrap().as_str(), "http://192.168.1.20:8080/");
    }
}
