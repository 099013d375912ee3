// Hue bridge REST API (v1)
//
// Hand-written client for the bridge's `/api/<key>/...` endpoints.
// Covers group listing and actions, bridge configuration, link-button
// pairing, and N-UPnP discovery.

pub mod client;
pub mod discovery;
pub mod groups;
pub mod models;
pub mod system;

pub use client::HueClient;
pub use discovery::{DISCOVERY_URL, DiscoveredBridge, discover};
pub use models::{BridgeInfo, GroupActionRequest, GroupStatus, HueGroup, LightState};
pub use system::create_user;
