// Hue bridge HTTP client
//
// Wraps `reqwest::Client` with key-scoped URL construction and the
// bridge's error convention: failures arrive as HTTP 200 with a body of
// `[{"error": {...}}]`. Endpoint groups (groups, system) are implemented
// as inherent methods in separate files.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::hue::models::BridgeResponseItem;
use crate::transport::TransportConfig;

/// Raw HTTP client for a single Hue bridge.
///
/// Every authenticated endpoint lives under `/api/<application key>/`.
/// All methods return decoded payloads; bridge-reported errors are
/// surfaced as [`Error`] variants before the caller sees them.
pub struct HueClient {
    http: reqwest::Client,
    base_url: Url,
    app_key: SecretString,
}

impl HueClient {
    /// Create a new bridge client from a `TransportConfig`.
    ///
    /// `base_url` is the bridge root, e.g. `http://192.168.1.20`.
    pub fn new(
        base_url: Url,
        app_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, app_key))
    }

    /// Create a bridge client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, app_key: SecretString) -> Self {
        Self {
            http,
            base_url,
            app_key,
        }
    }

    /// The bridge base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a key-scoped URL: `{base}/api/{key}/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/api/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.app_key.expose_secret(),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request for a key-scoped path and decode the response body.
    ///
    /// Only the relative path is logged; the full URL embeds the key.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        debug!("GET {path}");

        let url = self.api_url(path)?;
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        parse_response(resp).await
    }

    /// Send a PUT request with JSON body to a key-scoped path.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {path}");

        let url = self.api_url(path)?;
        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_response(resp).await
    }
}

/// Decode a bridge response, translating `[{"error": ...}]` bodies.
///
/// The bridge reports most failures with HTTP 200, so the status code
/// alone is not enough: the body is parsed once as loose JSON, checked
/// for error items, then decoded into `T`.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(_) if !status.is_success() => {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }
        Err(e) => return Err(deserialization_error(&e, &body)),
    };

    if let Some(err) = first_bridge_error(&value) {
        return Err(err);
    }

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
        });
    }

    serde_json::from_value(value).map_err(|e| deserialization_error(&e, &body))
}

/// Extract the first error item from an array-shaped bridge response.
fn first_bridge_error(value: &serde_json::Value) -> Option<Error> {
    let items = value.as_array()?;
    items.iter().find_map(|item| {
        let parsed: BridgeResponseItem = serde_json::from_value(item.clone()).ok()?;
        parsed
            .error
            .map(|e| Error::from_bridge(e.kind, e.address, e.description))
    })
}

fn deserialization_error(err: &serde_json::Error, body: &str) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body: body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn api_url_is_key_scoped() {
        let client = HueClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://10.0.0.2/").unwrap(),
            SecretString::from("abc123".to_string()),
        );
        let url = client.api_url("groups/4/action").unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.2/api/abc123/groups/4/action");
    }

    #[test]
    fn first_error_item_wins() {
        let body = serde_json::json!([
            { "success": { "/groups/1/action/on": true } },
            { "error": { "type": 7, "address": "/groups/1/action/bri", "description": "invalid value" } }
        ]);
        let err = first_bridge_error(&body).unwrap();
        assert!(matches!(err, Error::Bridge { kind: 7, .. }));
    }

    #[test]
    fn object_bodies_are_not_errors() {
        let body = serde_json::json!({ "1": { "name": "Office" } });
        assert!(first_bridge_error(&body).is_none());
    }
}
