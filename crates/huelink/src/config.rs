//! CLI configuration -- thin wrapper around `huelink_config`.
//!
//! Loads the file named by `--config` (or the platform default) and lays
//! CLI flag overrides on top before handing runtime configs to the core.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use huelink_config::{Config, Environment};
use huelink_core::{BridgeConfig, RelayConfig};

use crate::cli::{GlobalOpts, ServeArgs};
use crate::error::CliError;

/// The config file this invocation reads and writes.
pub fn active_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(huelink_config::config_path)
}

/// Load the config file with bridge-level flag overrides applied.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = huelink_config::load_config_from(&active_path(global))?;

    if let Some(ref ip) = global.hue_ip {
        cfg.bridge.address = Some(ip.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.bridge.timeout = timeout;
    }
    Ok(cfg)
}

/// Apply `serve` flag overrides and re-validate.
pub fn apply_serve_overrides(cfg: &mut Config, args: &ServeArgs) -> Result<(), CliError> {
    if let Some(port) = args.port {
        cfg.http.port = port;
    }
    if let Some(ref env) = args.environment {
        cfg.http.environment = Environment::from_str(env).map_err(|_| CliError::Validation {
            field: "env".into(),
            reason: format!("expected development, staging or production, got '{env}'"),
        })?;
    }
    if args.remote {
        cfg.relay.enabled = true;
    }
    if let Some(ref url) = args.remote_url {
        cfg.relay.address.clone_from(url);
    }
    if args.remote_secure {
        cfg.relay.secure = true;
    }
    if let Some(secs) = args.retry_delay {
        cfg.relay.retry_delay_secs = secs;
    }
    if let Some(secs) = args.broadcast_interval {
        cfg.relay.broadcast_interval_secs = secs;
    }
    cfg.validate()?;
    Ok(())
}

/// Build the bridge config. `--hue-username` beats every stored key.
pub fn bridge_config(cfg: &Config, global: &GlobalOpts) -> Result<BridgeConfig, CliError> {
    let Some(ref key) = global.hue_username else {
        return Ok(huelink_config::to_bridge_config(&cfg.bridge)?);
    };

    let address = cfg
        .bridge
        .address
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| CliError::NoBridge {
            path: active_path(global).display().to_string(),
        })?;

    Ok(BridgeConfig {
        address: huelink_config::bridge_url(address)?,
        app_key: SecretString::from(key.clone()),
        timeout: Duration::from_secs(cfg.bridge.timeout),
    })
}

pub fn relay_config(cfg: &Config) -> RelayConfig {
    huelink_config::to_relay_config(&cfg.relay)
}
