// File: wearview-core/src/renderer/headless.rs
//
// In-process backend for deployments without an embedded engine. Emote
// playback runs on the local clock controller against a nominal clip
// length; screenshots degrade to a flat background-colored SVG data URL.

use async_trait::async_trait;
use tokio::sync::Mutex;

use wearview_common::models::{Background, PreviewConfig};
use wearview_common::Error;

use crate::emote::{
    emote_loops, EmoteController, EmoteEventSender, InvalidEmoteController, LocalEmoteController,
};
use crate::renderer::{
    has_emote, CameraOffset, CameraPosition, PreviewRenderer, SceneController, SceneHandles,
    SceneMetrics,
};

/// Clip length assumed for playback when no engine reports a real one.
pub const NOMINAL_CLIP_LENGTH: f64 = 2.0;

const MIN_ZOOM: f64 = 1.0;
const MAX_ZOOM: f64 = 2.8;

struct CameraState {
    zoom: f64,
    offset: (f64, f64, f64),
    position: CameraPosition,
}

struct HeadlessScene {
    background: Background,
    entities: u64,
    camera: Mutex<CameraState>,
}

#[async_trait]
impl SceneController for HeadlessScene {
    async fn screenshot(&self, width: u32, height: u32) -> Result<String, Error> {
        let fill = if self.background.transparent {
            "none".to_string()
        } else {
            self.background.color.clone()
        };
        let svg = format!(
            "<svg xmlns='http://www.w3.org/2000/svg' width='{width}' height='{height}'>\
             <rect width='100%' height='100%' fill='{fill}'/></svg>"
        );
        Ok(format!(
            "data:image/svg+xml,{}",
            urlencoding::encode(&svg)
        ))
    }

    async fn metrics(&self) -> Result<SceneMetrics, Error> {
        Ok(SceneMetrics {
            meshes: self.entities,
            entities: self.entities,
            ..Default::default()
        })
    }

    async fn change_zoom(&self, delta: f64) -> Result<(), Error> {
        let mut camera = self.camera.lock().await;
        camera.zoom = (camera.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        Ok(())
    }

    async fn pan_camera(&self, offset: CameraOffset) -> Result<(), Error> {
        let mut camera = self.camera.lock().await;
        camera.offset.0 += offset.x.unwrap_or(0.0);
        camera.offset.1 += offset.y.unwrap_or(0.0);
        camera.offset.2 += offset.z.unwrap_or(0.0);
        Ok(())
    }

    async fn change_camera_position(&self, position: CameraPosition) -> Result<(), Error> {
        let mut camera = self.camera.lock().await;
        if position.alpha.is_some() {
            camera.position.alpha = position.alpha;
        }
        if position.beta.is_some() {
            camera.position.beta = position.beta;
        }
        if position.radius.is_some() {
            camera.position.radius = position.radius;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct HeadlessRenderer;

#[async_trait]
impl PreviewRenderer for HeadlessRenderer {
    async fn render(
        &self,
        config: &PreviewConfig,
        events: EmoteEventSender,
    ) -> Result<SceneHandles, Error> {
        let entities =
            config.wearables.len() as u64 + u64::from(config.item.is_some());
        let scene = HeadlessScene {
            background: config.background.clone(),
            entities,
            camera: Mutex::new(CameraState {
                zoom: config.zoom,
                offset: (config.offset_x, config.offset_y, config.offset_z),
                position: CameraPosition::default(),
            }),
        };

        let emote: Box<dyn EmoteController> = if has_emote(config) {
            let looping = emote_loops(
                config.emote,
                config.item.as_ref().and_then(|item| item.as_emote()),
            );
            Box::new(LocalEmoteController::new(NOMINAL_CLIP_LENGTH, looping, events))
        } else {
            Box::new(InvalidEmoteController)
        };

        Ok(SceneHandles {
            scene: Box::new(scene),
            emote,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wearview_common::models::{
        BodyShape, PreviewCamera, PreviewEmote, PreviewProjection, PreviewType,
    };

    use crate::emote::emote_event_channel;

    fn config(emote: Option<PreviewEmote>) -> PreviewConfig {
        PreviewConfig {
            wearables: vec![],
            item: None,
            body_shape: BodyShape::Male,
            skin: "#cc9b76".to_string(),
            hair: "#000000".to_string(),
            eyes: "#000000".to_string(),
            preview_type: PreviewType::Avatar,
            background: Background {
                color: "#18141a".to_string(),
                gradient: None,
                image: None,
                transparent: false,
            },
            emote,
            camera: PreviewCamera::Interactive,
            projection: PreviewProjection::Perspective,
            zoom: 1.75,
            offset_x: 0.0,
            offset_y: 0.0,
            offset_z: 0.0,
        }
    }

    #[tokio::test]
    async fn test_screenshot_is_background_data_url() {
        let (tx, _rx) = emote_event_channel();
        let handles = HeadlessRenderer
            .render(&config(None), tx)
            .await
            .unwrap();
        let shot = handles.scene.screenshot(512, 512).await.unwrap();
        assert!(shot.starts_with("data:image/svg+xml,"));
        assert!(shot.contains(urlencoding::encode("#18141a").as_ref()));
    }

    #[tokio::test]
    async fn test_emote_config_gets_live_controller() {
        let (tx, _rx) = emote_event_channel();
        let handles = HeadlessRenderer
            .render(&config(Some(PreviewEmote::Dance)), tx)
            .await
            .unwrap();
        assert_eq!(handles.emote.length().await.unwrap(), NOMINAL_CLIP_LENGTH);
    }

    #[tokio::test]
    async fn test_emoteless_config_gets_invalid_controller() {
        let (tx, _rx) = emote_event_channel();
        let handles = HeadlessRenderer.render(&config(None), tx).await.unwrap();
        assert!(matches!(
            handles.emote.play().await,
            Err(Error::InvalidEmoteController)
        ));
    }

    #[tokio::test]
    async fn test_zoom_clamps() {
        let scene = HeadlessScene {
            background: config(None).background,
            entities: 0,
            camera: Mutex::new(CameraState {
                zoom: 1.75,
                offset: (0.0, 0.0, 0.0),
                position: CameraPosition::default(),
            }),
        };
        scene.change_zoom(100.0).await.unwrap();
        assert_eq!(scene.camera.lock().await.zoom, MAX_ZOOM);
        scene.change_zoom(-100.0).await.unwrap();
        assert_eq!(scene.camera.lock().await.zoom, MIN_ZOOM);
    }

    #[tokio::test]
    async fn test_pan_accumulates() {
        let scene = HeadlessScene {
            background: config(None).background,
            entities: 0,
            camera: Mutex::new(CameraState {
                zoom: 1.75,
                offset: (0.0, 0.0, 0.0),
                position: CameraPosition::default(),
            }),
        };
        scene
            .pan_camera(CameraOffset {
                x: Some(0.5),
                y: None,
                z: Some(-0.25),
            })
            .await
            .unwrap();
        scene
            .pan_camera(CameraOffset {
                x: Some(0.5),
                y: Some(1.0),
                z: None,
            })
            .await
            .unwrap();
        let camera = scene.camera.lock().await;
        assert_eq!(camera.offset, (1.0, 1.0, -0.25));
    }
}
