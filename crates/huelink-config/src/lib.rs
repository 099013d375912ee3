//! Configuration for huelink.
//!
//! TOML file layered with `HUELINK_*` environment variables, app-key
//! resolution (env var, system keyring, plaintext), and translation to
//! the runtime `BridgeConfig` / `RelayConfig` consumed by huelink-core.
//! The binary adds CLI-flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use huelink_core::{BridgeConfig, RelayConfig};

/// Keyring service name under which app keys are stored.
const KEYRING_SERVICE: &str = "huelink";

/// Keyring entry name for the bridge app key.
const KEYRING_APP_KEY: &str = "bridge/app-key";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no Hue bridge address configured")]
    NoBridgeAddress,

    #[error("no app key configured for the Hue bridge")]
    NoAppKey,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeSection,

    #[serde(default)]
    pub relay: RelaySection,

    #[serde(default)]
    pub http: HttpSection,
}

/// `[bridge]`: where the Hue bridge is and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BridgeSection {
    /// Bridge IP, host, or base URL (e.g., "192.168.1.2").
    pub address: Option<String>,

    /// App key (plaintext -- prefer keyring or env var).
    pub app_key: Option<String>,

    /// Environment variable name containing the app key.
    pub app_key_env: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            address: None,
            app_key: None,
            app_key_env: None,
            timeout: default_timeout(),
        }
    }
}

/// `[relay]`: the remote websocket peer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelaySection {
    #[serde(default)]
    pub enabled: bool,

    /// Peer `host[:port]`.
    #[serde(default = "default_relay_address")]
    pub address: String,

    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    #[serde(default = "default_broadcast_interval")]
    pub broadcast_interval_secs: u64,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            enabled: false,
            address: default_relay_address(),
            secure: false,
            retry_delay_secs: default_retry_delay(),
            broadcast_interval_secs: default_broadcast_interval(),
        }
    }
}

/// `[http]`: the local HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpSection {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            environment: Environment::default(),
        }
    }
}

/// Deployment environment, reported by the health check.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

fn default_timeout() -> u64 {
    10
}
fn default_relay_address() -> String {
    "localhost:4000".into()
}
fn default_retry_delay() -> u64 {
    3
}
fn default_broadcast_interval() -> u64 {
    5
}
fn default_port() -> u16 {
    4000
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "huelink", "huelink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("huelink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
/// Environment keys nest with a double underscore, e.g.
/// `HUELINK_RELAY__ADDRESS`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HUELINK_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject values that would make the runtime misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.retry_delay_secs == 0 {
            return Err(ConfigError::Validation {
                field: "relay.retry_delay_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.relay.broadcast_interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "relay.broadcast_interval_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.bridge.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "bridge.timeout".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── App key resolution ──────────────────────────────────────────────

/// Resolve the bridge app key: `app_key_env` → system keyring → plaintext.
pub fn resolve_app_key(bridge: &BridgeSection) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(ref env_name) = bridge.app_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_APP_KEY) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = bridge.app_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoAppKey)
}

/// Store an app key in the system keyring.
pub fn store_app_key(app_key: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_APP_KEY)?;
    entry.set_password(app_key)?;
    Ok(())
}

// ── Runtime config translation ──────────────────────────────────────

/// Normalize a bridge address into a base URL. Bare hosts get `http://`.
pub fn bridge_url(address: &str) -> Result<url::Url, ConfigError> {
    let trimmed = address.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    url::Url::parse(&with_scheme).map_err(|e| ConfigError::Validation {
        field: "bridge.address".into(),
        reason: format!("invalid address '{trimmed}': {e}"),
    })
}

/// Build a `BridgeConfig`, resolving the app key through the credential chain.
pub fn to_bridge_config(bridge: &BridgeSection) -> Result<BridgeConfig, ConfigError> {
    let address = bridge
        .address
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .ok_or(ConfigError::NoBridgeAddress)?;

    Ok(BridgeConfig {
        address: bridge_url(address)?,
        app_key: resolve_app_key(bridge)?,
        timeout: Duration::from_secs(bridge.timeout),
    })
}

/// Build a `RelayConfig` from the `[relay]` section.
pub fn to_relay_config(relay: &RelaySection) -> RelayConfig {
    RelayConfig {
        address: relay.address.clone(),
        secure: relay.secure,
        retry_delay: Duration::from_secs(relay.retry_delay_secs),
        broadcast_interval: Duration::from_secs(relay.broadcast_interval_secs),
    }
}
