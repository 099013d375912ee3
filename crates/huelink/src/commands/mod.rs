//! Command handlers: config + flags -> bridge -> output formatting.

pub mod groups;
pub mod pair;
pub mod serve;

use std::io::IsTerminal;

use huelink_config::Config;
use huelink_core::{Bridge, HueProvider};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

/// Build a bridge handle from the config file and flag overrides.
///
/// Nothing is fetched yet; call [`Bridge::refresh`] to load groups.
pub fn connect(cfg: &Config, global: &GlobalOpts) -> Result<Bridge<HueProvider>, CliError> {
    let bridge_config = config::bridge_config(cfg, global)?;
    let provider = HueProvider::new(&bridge_config)?;
    Ok(Bridge::new(provider))
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is mandatory.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer failure into CliError.
pub fn prompt_err(e: dialoguer::Error) -> CliError {
    CliError::Io(std::io::Error::other(e))
}
