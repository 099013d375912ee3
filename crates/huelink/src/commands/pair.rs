//! Pairing: discover a bridge, wait for its link button, store the key.

use std::io::IsTerminal;
use std::time::Duration;

use dialoguer::Select;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

use huelink_api::hue::DISCOVERY_URL;
use huelink_api::{DiscoveredBridge, TransportConfig};

use crate::cli::{GlobalOpts, PairArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{confirm, prompt_err};

/// Pause between pairing attempts while the link button is unpressed.
const LINK_POLL: Duration = Duration::from_secs(2);

/// How to register with the bridge.
#[derive(Debug, Clone)]
pub struct PairOptions {
    pub device_type: String,
    pub wait: Duration,
    pub plaintext: bool,
}

impl Default for PairOptions {
    fn default() -> Self {
        Self {
            device_type: "huelink#cli".into(),
            wait: Duration::from_secs(30),
            plaintext: false,
        }
    }
}

impl From<&PairArgs> for PairOptions {
    fn from(args: &PairArgs) -> Self {
        Self {
            device_type: args.device_type.clone(),
            wait: Duration::from_secs(args.wait),
            plaintext: args.plaintext,
        }
    }
}

/// A freshly paired bridge.
#[derive(Debug)]
pub struct Paired {
    pub address: Url,
    pub app_key: SecretString,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &PairArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let opts = PairOptions::from(args);
    let paired = pair_bridge(global, &opts).await?;

    let stored = if opts.plaintext {
        "config file"
    } else {
        "system keyring"
    };
    output::print_output(
        &format!(
            "Paired with {}\nApp key saved to the {stored}\nConfig: {}",
            paired.address,
            config::active_path(global).display()
        ),
        global.quiet,
    );
    Ok(())
}

/// Locate the bridge, register a new app key, and persist both.
///
/// `--hue-ip` skips discovery. The key goes to the system keyring unless
/// `plaintext` is set, and the bridge address is written to the config file.
pub async fn pair_bridge(global: &GlobalOpts, opts: &PairOptions) -> Result<Paired, CliError> {
    let path = config::active_path(global);
    let mut cfg = huelink_config::load_config_from(&path)?;

    let timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.bridge.timeout));
    let http = TransportConfig::with_timeout(timeout).build_client()?;

    let address = if let Some(ref ip) = global.hue_ip {
        huelink_config::bridge_url(ip)?
    } else {
        let discovery_url = Url::parse(DISCOVERY_URL).map_err(|e| CliError::Validation {
            field: "discovery".into(),
            reason: e.to_string(),
        })?;
        let bridges = huelink_api::discover(&http, &discovery_url).await?;
        choose_bridge(&bridges, global)?.base_url()?
    };
    info!(bridge = %address, "found hue bridge");

    if !confirm(
        &format!("Pair with the Hue bridge at {address}? Press its link button first"),
        global.yes,
    )? {
        return Err(CliError::Validation {
            field: "pair".into(),
            reason: "cancelled".into(),
        });
    }

    let spinner = if global.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Waiting for the link button on the bridge");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let deadline = Instant::now() + opts.wait;
    let app_key = loop {
        match huelink_api::create_user(&http, &address, &opts.device_type).await {
            Ok(key) => break key,
            Err(huelink_api::Error::LinkButtonNotPressed) if Instant::now() < deadline => {
                debug!("link button not pressed yet");
                tokio::time::sleep(LINK_POLL).await;
            }
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e.into());
            }
        }
    };
    spinner.finish_and_clear();

    if opts.plaintext {
        cfg.bridge.app_key = Some(app_key.expose_secret().to_owned());
    } else {
        huelink_config::store_app_key(app_key.expose_secret())?;
    }
    cfg.bridge.address = Some(address.as_str().trim_end_matches('/').to_owned());
    huelink_config::save_config_to(&cfg, &path)?;
    info!(path = %path.display(), "saved bridge configuration");

    Ok(Paired { address, app_key })
}

/// Pick one of the discovered bridges, prompting when there is a choice.
fn choose_bridge<'a>(
    bridges: &'a [DiscoveredBridge],
    global: &GlobalOpts,
) -> Result<&'a DiscoveredBridge, CliError> {
    let [first, rest @ ..] = bridges else {
        return Err(huelink_api::Error::NoBridgeFound.into());
    };
    if rest.is_empty() || global.yes || !std::io::stdin().is_terminal() {
        return Ok(first);
    }

    let items: Vec<String> = bridges
        .iter()
        .map(|b| format!("{} ({})", b.internal_ip, b.id))
        .collect();
    let picked = Select::new()
        .with_prompt("Several bridges found; pick one")
        .items(&items)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    bridges.get(picked).ok_or_else(|| CliError::Validation {
        field: "bridge".into(),
        reason: "selection out of range".into(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn defaults_match_pair_flags() {
        let opts = PairOptions::default();
        assert_eq!(opts.device_type, "huelink#cli");
        assert_eq!(opts.wait, Duration::from_secs(30));
        assert!(!opts.plaintext);
    }
}
