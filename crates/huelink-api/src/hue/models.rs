// Hue bridge wire models
//
// Shapes returned by the v1 REST API. Unknown fields are captured with
// `#[serde(flatten)]` so nothing the bridge sends is silently dropped.

use serde::{Deserialize, Serialize};

// ── Groups ───────────────────────────────────────────────────────────

/// A group (room, zone, or light group) as returned by `GET /api/<key>/groups`.
///
/// The bridge keys groups by id in a JSON object; the id itself is not
/// part of the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HueGroup {
    pub name: String,

    /// Light ids belonging to this group.
    #[serde(default)]
    pub lights: Vec<String>,

    /// `"Room"`, `"Zone"`, `"LightGroup"`, `"Entertainment"`, ...
    #[serde(rename = "type", default)]
    pub group_type: String,

    /// Room class, e.g. `"Office"`, `"Living room"`. Rooms and zones only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    /// Aggregate on/off state of the member lights.
    #[serde(default)]
    pub state: GroupStatus,

    /// Last action applied to the whole group.
    #[serde(default)]
    pub action: LightState,

    #[serde(default)]
    pub recycle: bool,

    /// All remaining fields the bridge sends.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Aggregate state of a group's lights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStatus {
    #[serde(default)]
    pub all_on: bool,
    #[serde(default)]
    pub any_on: bool,
}

/// Light state, as carried in a group's `action` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    #[serde(default)]
    pub on: bool,

    /// Brightness, 1-254 on the bridge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,

    /// Color temperature in mireds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colormode: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `PUT /api/<key>/groups/<id>/action`.
///
/// Only the fields that are set are sent, so a power change never
/// touches brightness and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupActionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
}

impl GroupActionRequest {
    pub fn power(on: bool) -> Self {
        Self {
            on: Some(on),
            ..Self::default()
        }
    }

    pub fn brightness(bri: u8) -> Self {
        Self {
            bri: Some(bri),
            ..Self::default()
        }
    }
}

// ── Bridge ───────────────────────────────────────────────────────────

/// Subset of `GET /api/<key>/config` used for startup diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeInfo {
    pub name: String,

    #[serde(rename = "bridgeid", default)]
    pub bridge_id: String,

    #[serde(rename = "apiversion", default)]
    pub api_version: String,

    #[serde(rename = "swversion", default)]
    pub sw_version: String,

    #[serde(default)]
    pub mac: Option<String>,
}

// ── Response items ───────────────────────────────────────────────────

/// One element of an array-shaped bridge response. Only the error half
/// of `{"success": {...}}` / `{"error": {...}}` is inspected.
#[derive(Debug, Deserialize)]
pub(crate) struct BridgeResponseItem {
    #[serde(default)]
    pub error: Option<BridgeErrorItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BridgeErrorItem {
    #[serde(rename = "type")]
    pub kind: u16,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}
