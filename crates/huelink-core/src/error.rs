// ── Core error types ──
//
// Errors surfaced by huelink-core. Bridge REST failures arrive as
// `huelink_api::Error` and are translated into provider-level variants;
// relay failures are expressed in terms of the session they broke.

use thiserror::Error;

use crate::protocol::CodecError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Relay session errors ─────────────────────────────────────────
    #[error("Cannot connect to relay at {url}: {reason}")]
    Dial { url: String, reason: String },

    #[error("Relay transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    // ── Provider errors ──────────────────────────────────────────────
    #[error("Provider request failed: {message}")]
    Provider { message: String },

    #[error("Provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    #[error("The bridge rejected the application key -- run `huelink pair`")]
    Unauthorized,

    #[error("Link button not pressed on the bridge")]
    LinkButtonNotPressed,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether a later retry against the same provider could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. } | Self::Dial { .. } | Self::Transport(_)
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<huelink_api::Error> for CoreError {
    fn from(err: huelink_api::Error) -> Self {
        match err {
            huelink_api::Error::Unauthorized => CoreError::Unauthorized,
            huelink_api::Error::LinkButtonNotPressed => CoreError::LinkButtonNotPressed,
            huelink_api::Error::Transport(ref e) if e.is_connect() || e.is_timeout() => {
                CoreError::ProviderUnavailable {
                    reason: e.to_string(),
                }
            }
            huelink_api::Error::Http { status } if status >= 500 => {
                CoreError::ProviderUnavailable {
                    reason: format!("bridge returned HTTP {status}"),
                }
            }
            huelink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid bridge URL: {e}"),
            },
            huelink_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            other => CoreError::Provider {
                message: other.to_string(),
            },
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CoreError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        CoreError::Transport(err.to_string())
    }
}
