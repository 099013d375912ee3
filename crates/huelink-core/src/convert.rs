// ── API → domain conversion ──
//
// Hue groups become `DeviceGroup`s. The fields huelink acts on are
// lifted out; the rest of the bridge's description rides along as
// metadata so relay consumers still see it.

use huelink_api::HueGroup;
use serde_json::{Value, json};

use crate::model::DeviceGroup;

impl DeviceGroup {
    /// Build a domain group from a bridge group and its id.
    ///
    /// Power reflects `state.any_on` (what the lights are actually doing)
    /// rather than the last requested `action.on`.
    pub fn from_hue(id: String, group: HueGroup) -> Self {
        let mut metadata = group.extra;
        metadata.insert("type".into(), Value::String(group.group_type));
        metadata.insert("lights".into(), json!(group.lights));
        metadata.insert("allOn".into(), Value::Bool(group.state.all_on));
        if let Some(class) = group.class {
            metadata.insert("class".into(), Value::String(class));
        }
        if let Some(ct) = group.action.ct {
            metadata.insert("colorTemperature".into(), json!(ct));
        }
        if let Some(mode) = group.action.colormode {
            metadata.insert("colorMode".into(), Value::String(mode));
        }

        Self {
            id,
            name: group.name,
            is_on: group.state.any_on,
            brightness: group.action.bri.unwrap_or(0),
            metadata,
        }
    }
}
