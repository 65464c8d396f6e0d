// File: wearview-core/src/emote/mod.rs
//
// Emote playback: a uniform async play/pause/stop/seek contract over
// whatever actually drives the animation (a local clock or an embedded
// engine reached over the bridge), plus the event stream forwarded to
// the parent window.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use wearview_common::models::{EmoteDefinition, PreviewEmote};
use wearview_common::Error;

pub mod local;
pub mod remote;

pub use local::LocalEmoteController;
pub use remote::RemoteEmoteController;

/// Playback notification, forwarded 1:1 to the parent window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmoteEvent {
    Play,
    Pause,
    Loop,
    End,
}

impl EmoteEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmoteEvent::Play => "play",
            EmoteEvent::Pause => "pause",
            EmoteEvent::Loop => "loop",
            EmoteEvent::End => "end",
        }
    }
}

pub type EmoteEventSender = mpsc::UnboundedSender<EmoteEvent>;
pub type EmoteEventReceiver = mpsc::UnboundedReceiver<EmoteEvent>;

/// Fire-and-forget event channel between a controller and the session
/// that forwards its events.
pub fn emote_event_channel() -> (EmoteEventSender, EmoteEventReceiver) {
    mpsc::unbounded_channel()
}

/// Whether playback should loop: a featured emote definition carries its
/// own flag; otherwise a small fixed set of named emotes loops.
pub fn emote_loops(emote: Option<PreviewEmote>, definition: Option<&EmoteDefinition>) -> bool {
    if let Some(def) = definition {
        return def.emote_data.loops;
    }
    emote.map(|e| e.loops()).unwrap_or(false)
}

#[async_trait]
pub trait EmoteController: Send + Sync {
    async fn play(&self) -> Result<(), Error>;
    async fn pause(&self) -> Result<(), Error>;
    async fn stop(&self) -> Result<(), Error>;
    async fn go_to(&self, seconds: f64) -> Result<(), Error>;
    async fn length(&self) -> Result<f64, Error>;
    async fn is_playing(&self) -> Result<bool, Error>;
}

/// Stand-in controller for previews that hold no emote. Every operation
/// fails so RPC callers get a definite error instead of silence.
pub struct InvalidEmoteController;

#[async_trait]
impl EmoteController for InvalidEmoteController {
    async fn play(&self) -> Result<(), Error> {
        Err(Error::InvalidEmoteController)
    }

    async fn pause(&self) -> Result<(), Error> {
        Err(Error::InvalidEmoteController)
    }

    async fn stop(&self) -> Result<(), Error> {
        Err(Error::InvalidEmoteController)
    }

    async fn go_to(&self, _seconds: f64) -> Result<(), Error> {
        Err(Error::InvalidEmoteController)
    }

    async fn length(&self) -> Result<f64, Error> {
        Err(Error::InvalidEmoteController)
    }

    async fn is_playing(&self) -> Result<bool, Error> {
        Err(Error::InvalidEmoteController)
    }
}
