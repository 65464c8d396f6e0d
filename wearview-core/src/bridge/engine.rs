// File: wearview-core/src/bridge/engine.rs
//
// Client side of the embedded-engine boundary. Outbound traffic is a
// stream of fire-and-forget `SendMessage` commands (property changes
// take effect only after an explicit reload command); inbound traffic is
// "unity-renderer"-tagged frames. Queries carry a request id that the
// engine echoes back, so overlapping queries of the same kind resolve to
// their own callers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use wearview_common::Error;

use crate::emote::{EmoteEvent, EmoteEventSender};

/// Engine-side object every `SendMessage` is addressed to.
pub const ENGINE_OBJECT: &str = "PreviewController";

/// Tag of every frame the engine emits.
pub const ENGINE_FRAME_TYPE: &str = "unity-renderer";

/// Outbound `SendMessage(objectName, methodName, stringValue)` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineCommand {
    pub object_name: String,
    pub method_name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnginePayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

/// Inbound frame from the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: EnginePayload,
}

impl EngineFrame {
    /// Reply to a query, echoing its request id.
    pub fn response(kind: &str, id: u64, payload: Value) -> Self {
        Self {
            kind: ENGINE_FRAME_TYPE.to_string(),
            payload: EnginePayload {
                kind: kind.to_string(),
                payload: Some(payload),
                id: Some(id),
            },
        }
    }

    /// Unsolicited event frame.
    pub fn event(kind: &str, payload: Value) -> Self {
        Self {
            kind: ENGINE_FRAME_TYPE.to_string(),
            payload: EnginePayload {
                kind: kind.to_string(),
                payload: Some(payload),
                id: None,
            },
        }
    }
}

struct EngineInner {
    outbound: mpsc::UnboundedSender<EngineCommand>,
    pending: DashMap<u64, oneshot::Sender<Value>>,
    next_id: AtomicU64,
    emote_events: EmoteEventSender,
}

/// Handle for talking to the embedded engine. The paired receiver is
/// consumed by whatever transport carries commands to the engine; inbound
/// frames are pumped back through [`EngineHandle::handle_frame`].
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<EngineInner>,
}

impl EngineHandle {
    pub fn new(emote_events: EmoteEventSender) -> (Self, mpsc::UnboundedReceiver<EngineCommand>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let handle = Self {
            inner: Arc::new(EngineInner {
                outbound,
                pending: DashMap::new(),
                next_id: AtomicU64::new(1),
                emote_events,
            }),
        };
        (handle, rx)
    }

    /// Fire-and-forget command. Takes effect on the next reload for
    /// property changes.
    pub fn send_message(&self, method: &str, value: String) -> Result<(), Error> {
        let command = EngineCommand {
            object_name: ENGINE_OBJECT.to_string(),
            method_name: method.to_string(),
            value,
        };
        self.inner
            .outbound
            .send(command)
            .map_err(|_| Error::Transport("engine channel closed".to_string()))
    }

    pub fn reload(&self) -> Result<(), Error> {
        self.send_message("Reload", String::new())
    }

    /// Query round trip. The value string carries the request id (and
    /// optional params); the matching response frame echoes the id.
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, Error> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.inner.pending.insert(id, tx);

        let mut query = json!({ "id": id });
        if let Some(params) = params {
            query["params"] = params;
        }
        if let Err(e) = self.send_message(method, query.to_string()) {
            self.inner.pending.remove(&id);
            return Err(e);
        }

        rx.await
            .map_err(|_| Error::Transport("engine connection dropped before response".to_string()))
    }

    /// Routes one inbound frame: id-carrying frames complete their pending
    /// query, emote event frames feed the playback event channel, anything
    /// else is dropped.
    pub fn handle_frame(&self, frame: EngineFrame) {
        if frame.kind != ENGINE_FRAME_TYPE {
            debug!("Ignoring frame with unknown tag '{}'", frame.kind);
            return;
        }
        let payload = frame.payload;
        if let Some(id) = payload.id {
            match self.inner.pending.remove(&id) {
                Some((_, tx)) => {
                    let _ = tx.send(payload.payload.unwrap_or(Value::Null));
                }
                None => debug!("Engine response with unmatched id {id}"),
            }
            return;
        }
        match payload.kind.as_str() {
            "emoteEvent" => {
                let Some(value) = payload.payload else {
                    warn!("Engine emote event without payload");
                    return;
                };
                match serde_json::from_value::<EmoteEvent>(value) {
                    Ok(event) => {
                        let _ = self.inner.emote_events.send(event);
                    }
                    Err(e) => warn!("Engine emote event not understood: {e}"),
                }
            }
            other => debug!("Unhandled engine frame '{other}'"),
        }
    }

    /// Parses and routes a raw JSON frame off the transport.
    pub fn handle_raw(&self, text: &str) {
        match serde_json::from_str::<EngineFrame>(text) {
            Ok(frame) => self.handle_frame(frame),
            Err(e) => warn!("Malformed engine frame: {e}"),
        }
    }
}
