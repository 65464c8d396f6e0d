// File: wearview-core/src/bridge/mod.rs
//
// Message boundaries of a preview session: the parent-window protocol
// envelope, the controller RPC command set, and the embedded-engine
// bridge.

pub mod dispatch;
pub mod engine;
pub mod messages;

pub use dispatch::{execute, parse_request, ControllerCommand, EmoteCommand, SceneCommand};
pub use engine::{EngineCommand, EngineFrame, EngineHandle, EnginePayload};
pub use messages::{ControllerRequest, ControllerResponse, PreviewMessage};
