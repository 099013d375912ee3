//! Relay wire protocol.
//!
//! One JSON object per websocket text frame, shaped
//! `{"type": <kind>, "data": <payload>}`:
//!
//! | kind          | direction | payload                                   |
//! |---------------|-----------|-------------------------------------------|
//! | `status`      | inbound   | empty                                     |
//! | `update`      | inbound   | `{"group", "isOn", "brightness"?}`        |
//! | `group_state` | outbound  | `{"groups": [DeviceGroup, ...]}`          |
//!
//! Frames are parsed once into a loose `{type, data}` pair; the payload is
//! then decoded straight from the parsed `serde_json::Value` according to
//! the discriminator. A malformed frame is a [`CodecError::Decode`]; a
//! well-formed frame whose payload does not fit its kind is a
//! [`CodecError::Payload`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::DeviceGroup;

// ── Message kinds ────────────────────────────────────────────────────

pub const KIND_STATUS: &str = "status";
pub const KIND_UPDATE: &str = "update";
pub const KIND_GROUP_STATE: &str = "group_state";

// ── Payloads ─────────────────────────────────────────────────────────

/// Command to change the power (and optionally brightness) of every group
/// named `group`.
///
/// A brightness outside `0..=255` fails payload decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommand {
    /// Target group name, matched exactly (case-sensitive).
    pub group: String,
    pub is_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
}

/// Full snapshot of every group, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupsStateMessage {
    pub groups: Vec<DeviceGroup>,
}

// ── Envelope ─────────────────────────────────────────────────────────

/// A decoded relay message.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Request for an immediate snapshot.
    Status,
    /// Group mutation command.
    Update(UpdateCommand),
    /// Outbound snapshot broadcast.
    GroupState(GroupsStateMessage),
    /// Any kind this side does not understand. Ignored by the read pump.
    Unknown { kind: String },
}

/// Loose frame shape used for the first decoding step.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Borrowed frame shape used for encoding.
#[derive(Serialize)]
struct OutFrame<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: T,
}

#[derive(Serialize)]
struct EmptyPayload {}

/// Codec failures.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not JSON, or lacks a `type` string.
    #[error("malformed frame: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame is well formed but its `data` does not match `kind`.
    #[error("invalid '{kind}' payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Envelope {
    /// Decode one text frame.
    pub fn decode(raw: &str) -> Result<Self, CodecError> {
        let frame: RawFrame = serde_json::from_str(raw).map_err(CodecError::Decode)?;

        match frame.kind.as_str() {
            KIND_STATUS => Ok(Self::Status),
            KIND_UPDATE => serde_json::from_value(frame.data)
                .map(Self::Update)
                .map_err(|source| CodecError::Payload {
                    kind: frame.kind,
                    source,
                }),
            KIND_GROUP_STATE => serde_json::from_value(frame.data)
                .map(Self::GroupState)
                .map_err(|source| CodecError::Payload {
                    kind: frame.kind,
                    source,
                }),
            _ => Ok(Self::Unknown { kind: frame.kind }),
        }
    }

    /// Encode as a single JSON text frame.
    ///
    /// Unknown envelopes encode with an empty payload so they round-trip
    /// back to `Unknown`.
    pub fn encode(&self) -> String {
        let encoded = match self {
            Self::Status => serde_json::to_string(&OutFrame {
                kind: KIND_STATUS,
                data: EmptyPayload {},
            }),
            Self::Update(cmd) => serde_json::to_string(&OutFrame {
                kind: KIND_UPDATE,
                data: cmd,
            }),
            Self::GroupState(msg) => serde_json::to_string(&OutFrame {
                kind: KIND_GROUP_STATE,
                data: msg,
            }),
            Self::Unknown { kind } => serde_json::to_string(&OutFrame {
                kind,
                data: EmptyPayload {},
            }),
        };
        // Every payload is a struct with string keys; serde_json cannot fail here.
        encoded.expect("relay envelopes always serialize")
    }

    /// Wire name of this envelope's kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Status => KIND_STATUS,
            Self::Update(_) => KIND_UPDATE,
            Self::GroupState(_) => KIND_GROUP_STATE,
            Self::Unknown { kind } => kind,
        }
    }

    /// Wrap a snapshot for broadcast.
    pub fn group_state(groups: Vec<DeviceGroup>) -> Self {
        Self::GroupState(GroupsStateMessage { groups })
    }
}
