// File: wearview-core/src/bridge/dispatch.rs
//
// Controller RPC boundary. Host requests name a namespace and method as
// strings; they are parsed here into a closed command set and matched
// exhaustively, so an unknown capability fails at the boundary instead
// of somewhere inside a controller.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use wearview_common::Error;

use crate::bridge::messages::ControllerRequest;
use crate::renderer::{CameraOffset, CameraPosition, SceneHandles};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCommand {
    Screenshot { width: u32, height: u32 },
    Metrics,
    ChangeZoom(f64),
    PanCamera(CameraOffset),
    ChangeCameraPosition(CameraPosition),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmoteCommand {
    Play,
    Pause,
    Stop,
    GoTo(f64),
    GetLength,
    IsPlaying,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerCommand {
    Scene(SceneCommand),
    Emote(EmoteCommand),
}

fn invalid_params(request: &ControllerRequest) -> Error {
    Error::ControllerDispatch(format!(
        "Invalid params for {}.{}",
        request.namespace, request.method
    ))
}

fn param_f64(request: &ControllerRequest, index: usize) -> Result<f64, Error> {
    request
        .params
        .get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid_params(request))
}

fn param_u32(request: &ControllerRequest, index: usize) -> Result<u32, Error> {
    request
        .params
        .get(index)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid_params(request))
}

fn param_object<T: DeserializeOwned>(request: &ControllerRequest, index: usize) -> Result<T, Error> {
    request
        .params
        .get(index)
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .ok_or_else(|| invalid_params(request))
}

/// Maps a host request onto the command set. Fails with the protocol's
/// "Invalid namespace" / "Invalid method" strings.
pub fn parse_request(request: &ControllerRequest) -> Result<ControllerCommand, Error> {
    match request.namespace.as_str() {
        "scene" => {
            let command = match request.method.as_str() {
                "getScreenshot" => SceneCommand::Screenshot {
                    width: param_u32(request, 0)?,
                    height: param_u32(request, 1)?,
                },
                "getMetrics" => SceneCommand::Metrics,
                "changeZoom" => SceneCommand::ChangeZoom(param_f64(request, 0)?),
                "panCamera" => SceneCommand::PanCamera(param_object(request, 0)?),
                "changeCameraPosition" => {
                    SceneCommand::ChangeCameraPosition(param_object(request, 0)?)
                }
                _ => return Err(Error::ControllerDispatch("Invalid method".to_string())),
            };
            Ok(ControllerCommand::Scene(command))
        }
        "emote" => {
            let command = match request.method.as_str() {
                "play" => EmoteCommand::Play,
                "pause" => EmoteCommand::Pause,
                "stop" => EmoteCommand::Stop,
                "goTo" => EmoteCommand::GoTo(param_f64(request, 0)?),
                "getLength" => EmoteCommand::GetLength,
                "isPlaying" => EmoteCommand::IsPlaying,
                _ => return Err(Error::ControllerDispatch("Invalid method".to_string())),
            };
            Ok(ControllerCommand::Emote(command))
        }
        _ => Err(Error::ControllerDispatch("Invalid namespace".to_string())),
    }
}

/// Runs a parsed command against the live controllers, returning the
/// JSON result for the response payload.
pub async fn execute(handles: &SceneHandles, command: ControllerCommand) -> Result<Value, Error> {
    match command {
        ControllerCommand::Scene(SceneCommand::Screenshot { width, height }) => {
            Ok(Value::String(handles.scene.screenshot(width, height).await?))
        }
        ControllerCommand::Scene(SceneCommand::Metrics) => {
            let metrics = handles.scene.metrics().await?;
            Ok(serde_json::to_value(metrics)?)
        }
        ControllerCommand::Scene(SceneCommand::ChangeZoom(delta)) => {
            handles.scene.change_zoom(delta).await?;
            Ok(Value::Null)
        }
        ControllerCommand::Scene(SceneCommand::PanCamera(offset)) => {
            handles.scene.pan_camera(offset).await?;
            Ok(Value::Null)
        }
        ControllerCommand::Scene(SceneCommand::ChangeCameraPosition(position)) => {
            handles.scene.change_camera_position(position).await?;
            Ok(Value::Null)
        }
        ControllerCommand::Emote(EmoteCommand::Play) => {
            handles.emote.play().await?;
            Ok(Value::Null)
        }
        ControllerCommand::Emote(EmoteCommand::Pause) => {
            handles.emote.pause().await?;
            Ok(Value::Null)
        }
        ControllerCommand::Emote(EmoteCommand::Stop) => {
            handles.emote.stop().await?;
            Ok(Value::Null)
        }
        ControllerCommand::Emote(EmoteCommand::GoTo(seconds)) => {
            handles.emote.go_to(seconds).await?;
            Ok(Value::Null)
        }
        ControllerCommand::Emote(EmoteCommand::GetLength) => {
            Ok(json!(handles.emote.length().await?))
        }
        ControllerCommand::Emote(EmoteCommand::IsPlaying) => {
            Ok(Value::Bool(handles.emote.is_playing().await?))
        }
    }
}
