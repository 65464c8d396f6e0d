// File: wearview-core/src/renderer/engine.rs
//
// Backend proxying to an embedded engine. A render pushes the whole
// config as one property set followed by the reload trigger; scene and
// emote operations then travel over the bridge.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use wearview_common::models::PreviewConfig;
use wearview_common::Error;

use crate::bridge::EngineHandle;
use crate::emote::{EmoteController, EmoteEventSender, InvalidEmoteController, RemoteEmoteController};
use crate::renderer::{
    has_emote, CameraOffset, CameraPosition, PreviewRenderer, SceneController, SceneHandles,
    SceneMetrics,
};

struct EngineScene {
    engine: EngineHandle,
}

#[async_trait]
impl SceneController for EngineScene {
    async fn screenshot(&self, width: u32, height: u32) -> Result<String, Error> {
        let result = self
            .engine
            .request("GetScreenshot", Some(json!({"width": width, "height": height})))
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Parse("engine returned a non-string screenshot".to_string()))
    }

    async fn metrics(&self) -> Result<SceneMetrics, Error> {
        let result = self.engine.request("GetMetrics", None).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn change_zoom(&self, delta: f64) -> Result<(), Error> {
        self.engine.send_message("ChangeZoom", delta.to_string())
    }

    async fn pan_camera(&self, offset: CameraOffset) -> Result<(), Error> {
        self.engine
            .send_message("PanCamera", serde_json::to_string(&offset)?)
    }

    async fn change_camera_position(&self, position: CameraPosition) -> Result<(), Error> {
        self.engine
            .send_message("ChangeCameraPosition", serde_json::to_string(&position)?)
    }
}

/// Renderer backed by an [`EngineHandle`]. Emote events arrive through
/// the handle's own event channel, wired when the engine was attached,
/// so the per-render sender is unused here.
pub struct EngineRenderer {
    engine: EngineHandle,
}

impl EngineRenderer {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl PreviewRenderer for EngineRenderer {
    async fn render(
        &self,
        config: &PreviewConfig,
        _events: EmoteEventSender,
    ) -> Result<SceneHandles, Error> {
        debug!("Pushing config to engine and reloading");
        self.engine
            .send_message("SetConfig", serde_json::to_string(config)?)?;
        self.engine.reload()?;

        let emote: Box<dyn EmoteController> = if has_emote(config) {
            Box::new(RemoteEmoteController::new(self.engine.clone()))
        } else {
            Box::new(InvalidEmoteController)
        };

        Ok(SceneHandles {
            scene: Box::new(EngineScene {
                engine: self.engine.clone(),
            }),
            emote,
        })
    }
}
