//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use huelink_config::ConfigError;
use huelink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Bridge ───────────────────────────────────────────────────────
    #[error("Could not reach the Hue bridge")]
    #[diagnostic(
        code(huelink::bridge_unreachable),
        help(
            "Check that the bridge is powered and on the same network.\n\
             Reason: {reason}"
        )
    )]
    BridgeUnreachable { reason: String },

    #[error("The Hue bridge rejected the app key")]
    #[diagnostic(
        code(huelink::unauthorized),
        help("Pair again with: huelink pair\nOr pass a valid key with --hue-username.")
    )]
    Unauthorized,

    #[error("The bridge's link button was not pressed in time")]
    #[diagnostic(
        code(huelink::link_button),
        help("Press the round button on top of the bridge, then rerun: huelink pair")
    )]
    LinkButtonNotPressed,

    #[error("No Hue bridge address configured")]
    #[diagnostic(
        code(huelink::no_bridge),
        help(
            "Pair with a bridge: huelink pair\n\
             Or pass --hue-ip, or set [bridge].address in {path}"
        )
    )]
    NoBridge { path: String },

    #[error("No app key configured for the Hue bridge")]
    #[diagnostic(
        code(huelink::no_app_key),
        help(
            "Pair with the bridge: huelink pair\n\
             Or pass --hue-username / set HUELINK_HUE_USERNAME."
        )
    )]
    NoAppKey,

    #[error("Bridge request failed: {message}")]
    #[diagnostic(code(huelink::bridge_error))]
    Bridge { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("No group named '{name}'")]
    #[diagnostic(
        code(huelink::group_not_found),
        help("Run: huelink groups list to see available groups (names are case-sensitive)")
    )]
    GroupNotFound { name: String },

    // ── Validation / configuration ──────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(huelink::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(huelink::config), help("Config file: {path}"))]
    Config { message: String, path: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Pairing requires confirmation")]
    #[diagnostic(
        code(huelink::confirmation_required),
        help("Use --yes (-y) to skip the prompt in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes,

    // ── Runtime ──────────────────────────────────────────────────────
    #[error("HTTP server error: {0}")]
    #[diagnostic(code(huelink::server))]
    Server(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BridgeUnreachable { .. } => exit_code::CONNECTION,
            Self::Unauthorized
            | Self::LinkButtonNotPressed
            | Self::NoAppKey
            | Self::NoBridge { .. } => exit_code::AUTH,
            Self::GroupNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized => CliError::Unauthorized,
            CoreError::LinkButtonNotPressed => CliError::LinkButtonNotPressed,
            CoreError::ProviderUnavailable { reason } => CliError::BridgeUnreachable { reason },
            CoreError::Dial { url, reason } => CliError::BridgeUnreachable {
                reason: format!("{url}: {reason}"),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other => CliError::Bridge {
                message: other.to_string(),
            },
        }
    }
}

impl From<huelink_api::Error> for CliError {
    fn from(err: huelink_api::Error) -> Self {
        match err {
            huelink_api::Error::NoBridgeFound => CliError::BridgeUnreachable {
                reason: "discovery found no bridge on this network".into(),
            },
            other => CoreError::from(other).into(),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = huelink_config::config_path().display().to_string();
        match err {
            ConfigError::NoBridgeAddress => CliError::NoBridge { path },
            ConfigError::NoAppKey => CliError::NoAppKey,
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
                path,
            },
        }
    }
}
