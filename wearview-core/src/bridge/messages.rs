// File: wearview-core/src/bridge/messages.rs
//
// Parent-window protocol envelope. Every frame is `{"type": ...,
// "payload": ...}`; unknown or malformed frames fail deserialization and
// are rejected at the transport boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use wearview_common::models::PreviewOptions;

use crate::emote::EmoteEvent;

/// Generic controller RPC call from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerRequest {
    pub id: String,
    pub namespace: String,
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

/// Reply to a [`ControllerRequest`], echoing its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerResponse {
    pub id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ControllerResponse {
    pub fn success(id: String, result: Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: String, error: String) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

/// Messages exchanged with the parent window, both directions.
///
/// READY is sent once as soon as the session exists, LOAD once on the
/// first successful resolution/render, ERROR once if it fails; LOAD and
/// ERROR are mutually exclusive for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PreviewMessage {
    Ready,
    Load,
    Error {
        message: String,
    },
    Update {
        options: PreviewOptions,
    },
    ControllerRequest(ControllerRequest),
    ControllerResponse(ControllerResponse),
    EmoteEvent {
        #[serde(rename = "type")]
        event: EmoteEvent,
    },
}
