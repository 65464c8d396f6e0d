// File: wearview-core/src/emote/remote.rs
//
// Playback proxied to an embedded engine. Transport commands are
// fire-and-forget; the two queries ride the bridge's id-correlated
// round trip. Playback events come back as engine frames and reach the
// session through the bridge, not from here.

use async_trait::async_trait;

use wearview_common::Error;

use crate::bridge::EngineHandle;
use crate::emote::EmoteController;

pub struct RemoteEmoteController {
    engine: EngineHandle,
}

impl RemoteEmoteController {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EmoteController for RemoteEmoteController {
    async fn play(&self) -> Result<(), Error> {
        self.engine.send_message("PlayEmote", String::new())
    }

    async fn pause(&self) -> Result<(), Error> {
        self.engine.send_message("PauseEmote", String::new())
    }

    async fn stop(&self) -> Result<(), Error> {
        self.engine.send_message("StopEmote", String::new())
    }

    async fn go_to(&self, seconds: f64) -> Result<(), Error> {
        self.engine.send_message("GoToEmote", seconds.to_string())
    }

    async fn length(&self) -> Result<f64, Error> {
        let result = self.engine.request("GetEmoteLength", None).await?;
        result
            .as_f64()
            .ok_or_else(|| Error::Parse("engine returned a non-numeric emote length".to_string()))
    }

    async fn is_playing(&self) -> Result<bool, Error> {
        let result = self.engine.request("IsEmotePlaying", None).await?;
        result
            .as_bool()
            .ok_or_else(|| Error::Parse("engine returned a non-boolean playing flag".to_string()))
    }
}
