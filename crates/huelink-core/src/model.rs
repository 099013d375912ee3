// ── Domain model ──
//
// Provider-agnostic view of a controllable device group. This is the
// shape held in the store, broadcast to the relay, and served locally.

use serde::{Deserialize, Serialize};

/// A controllable group of devices (a room, zone, or light group).
///
/// `id`, `name`, `isOn` and `brightness` are understood by huelink; every
/// other provider field is carried through untouched in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroup {
    /// Provider-assigned identifier, used to address mutations.
    pub id: String,

    /// Display name. Not guaranteed unique.
    pub name: String,

    /// Whether any device in the group is powered on.
    pub is_on: bool,

    /// Brightness on the provider's native 0-255 scale.
    pub brightness: u8,

    /// Opaque provider-specific fields.
    #[serde(flatten)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl DeviceGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_on: bool, brightness: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_on,
            brightness,
            metadata: serde_json::Map::new(),
        }
    }
}
