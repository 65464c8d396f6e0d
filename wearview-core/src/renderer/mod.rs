// File: wearview-core/src/renderer/mod.rs
//
// Rendering backends. A renderer turns an immutable `PreviewConfig` into
// a pair of live controllers: one for the scene (screenshot, metrics,
// camera) and one for emote playback. The engine-backed implementation
// proxies to an embedded engine over the bridge; the headless one answers
// in-process for server deployments without a rasterizer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use wearview_common::models::PreviewConfig;
use wearview_common::Error;

use crate::emote::{EmoteController, EmoteEventSender};

pub mod engine;
pub mod headless;

pub use engine::EngineRenderer;
pub use headless::HeadlessRenderer;

/// Scene statistics reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneMetrics {
    pub triangles: u64,
    pub materials: u64,
    pub textures: u64,
    pub meshes: u64,
    pub bodies: u64,
    pub entities: u64,
}

/// Partial camera pan, axes in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOffset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

/// Partial orbital camera placement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraPosition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[async_trait]
pub trait SceneController: Send + Sync {
    /// Data URL of a rendered frame at the requested size.
    async fn screenshot(&self, width: u32, height: u32) -> Result<String, Error>;
    async fn metrics(&self) -> Result<SceneMetrics, Error>;
    async fn change_zoom(&self, delta: f64) -> Result<(), Error>;
    async fn pan_camera(&self, offset: CameraOffset) -> Result<(), Error>;
    async fn change_camera_position(&self, position: CameraPosition) -> Result<(), Error>;
}

/// Live controllers for one rendered config.
pub struct SceneHandles {
    pub scene: Box<dyn SceneController>,
    pub emote: Box<dyn EmoteController>,
}

#[async_trait]
pub trait PreviewRenderer: Send + Sync {
    /// Renders `config`, wiring emote playback notifications into
    /// `events`.
    async fn render(
        &self,
        config: &PreviewConfig,
        events: EmoteEventSender,
    ) -> Result<SceneHandles, Error>;
}

/// Whether the preview animates an emote at all: either a named emote is
/// configured or the featured item is one.
pub fn has_emote(config: &PreviewConfig) -> bool {
    config.emote.is_some() || config.item.as_ref().is_some_and(|item| item.is_emote())
}
