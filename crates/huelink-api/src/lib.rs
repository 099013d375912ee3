// huelink-api: Async Rust client for the Philips Hue bridge REST API (v1)

pub mod error;
pub mod hue;
pub mod transport;

pub use error::Error;
pub use hue::{
    BridgeInfo, DiscoveredBridge, GroupActionRequest, GroupStatus, HueClient, HueGroup,
    LightState, create_user, discover,
};
pub use transport::TransportConfig;
