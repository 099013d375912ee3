// Bridge-level endpoints
//
// Bridge configuration and link-button pairing.

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::hue::client::{HueClient, parse_response};
use crate::hue::models::BridgeInfo;

impl HueClient {
    /// Get bridge identity and firmware information.
    ///
    /// `GET /api/<key>/config`
    pub async fn bridge_info(&self) -> Result<BridgeInfo, Error> {
        debug!("fetching bridge config");
        self.get("config").await
    }
}

#[derive(Debug, Deserialize)]
struct CreateUserSuccess {
    success: CreatedUser,
}

#[derive(Debug, Deserialize)]
struct CreatedUser {
    username: String,
}

/// Register a new application on the bridge and return its key.
///
/// `POST /api` with `{"devicetype": "<app>#<device>"}`
///
/// Fails with [`Error::LinkButtonNotPressed`] until the physical link
/// button on the bridge has been pressed within the last 30 seconds.
pub async fn create_user(
    http: &reqwest::Client,
    base_url: &Url,
    device_type: &str,
) -> Result<SecretString, Error> {
    let url = Url::parse(&format!(
        "{}/api",
        base_url.as_str().trim_end_matches('/')
    ))?;
    debug!(device_type, "requesting application key");

    let resp = http
        .post(url)
        .json(&json!({ "devicetype": device_type }))
        .send()
        .await
        .map_err(Error::Transport)?;

    let mut items: Vec<CreateUserSuccess> = parse_response(resp).await?;
    let created = items.pop().ok_or_else(|| Error::Deserialization {
        message: "empty pairing response".into(),
        body: String::new(),
    })?;

    info!("bridge pairing succeeded");
    Ok(SecretString::from(created.success.username))
}
