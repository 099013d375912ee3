use thiserror::Error;

/// Hue error type for an unauthorized application key.
const HUE_UNAUTHORIZED_USER: u16 = 1;

/// Hue error type returned by `POST /api` until the link button is pressed.
const HUE_LINK_BUTTON_NOT_PRESSED: u16 = 101;

/// Top-level error type for the `huelink-api` crate.
///
/// Covers every failure mode of the bridge REST API: transport,
/// bridge-reported errors, pairing, discovery, and decoding.
/// `huelink-core` maps these into provider-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The application key is unknown to the bridge (Hue error type 1).
    #[error("Unauthorized: the bridge rejected the application key")]
    Unauthorized,

    /// Pairing attempted before the bridge's link button was pressed.
    #[error("Link button not pressed -- press the button on the bridge and retry")]
    LinkButtonNotPressed,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Bridge API ──────────────────────────────────────────────────
    /// Structured error from the bridge, parsed from
    /// `[{"error": {"type", "address", "description"}}]`.
    #[error("Bridge error {kind} at {address}: {description}")]
    Bridge {
        kind: u16,
        address: String,
        description: String,
    },

    /// Non-2xx HTTP status with no structured error payload.
    #[error("Bridge returned HTTP {status}")]
    Http { status: u16 },

    // ── Discovery ───────────────────────────────────────────────────
    /// The discovery endpoint answered, but listed no bridges.
    #[error("No Hue bridge found on the local network")]
    NoBridgeFound,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Build an error from a bridge error item, mapping the well-known
    /// type codes onto dedicated variants.
    pub(crate) fn from_bridge(kind: u16, address: String, description: String) -> Self {
        match kind {
            HUE_UNAUTHORIZED_USER => Self::Unauthorized,
            HUE_LINK_BUTTON_NOT_PRESSED => Self::LinkButtonNotPressed,
            _ => Self::Bridge {
                kind,
                address,
                description,
            },
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status } => *status >= 500,
            Self::LinkButtonNotPressed => true,
            _ => false,
        }
    }

    /// Returns `true` if re-pairing with the bridge might resolve this error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
