// huelink-core: Group state store and relay session manager between huelink-api and the binary.

pub mod bridge;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod protocol;
pub mod provider;
pub mod relay;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::Bridge;
pub use config::{BridgeConfig, RelayConfig};
pub use error::CoreError;
pub use model::DeviceGroup;
pub use protocol::{CodecError, Envelope, GroupsStateMessage, UpdateCommand};
pub use provider::{DeviceGroupProvider, HueProvider};
pub use relay::{Dial, RelayHandle, RelayStatus, SessionInfo, SessionState, WsDialer};
pub use store::{GroupChange, GroupStore};
