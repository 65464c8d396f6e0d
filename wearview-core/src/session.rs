// File: wearview-core/src/session.rs
//
// One live preview session: owns the options state, re-resolves the
// config when the host pushes updates, renders through the configured
// backend, answers controller RPCs, and forwards emote events. READY is
// sent on start, then exactly one of LOAD or ERROR for the session's
// first resolution; a superseded resolution is discarded by comparing
// the merged options it was computed from against the current ones.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use wearview_common::models::{PreviewCamera, PreviewConfig, PreviewOptions};
use wearview_common::Error;

use crate::bridge::{dispatch, ControllerRequest, ControllerResponse, PreviewMessage};
use crate::emote::{EmoteEventReceiver, EmoteEventSender};
use crate::options::OptionsState;
use crate::renderer::{has_emote, PreviewRenderer, SceneHandles};
use crate::resolver::ConfigResolver;

pub type MessageSender = mpsc::UnboundedSender<PreviewMessage>;
pub type MessageReceiver = mpsc::UnboundedReceiver<PreviewMessage>;

/// Host message channel for one session.
pub fn message_channel() -> (MessageSender, MessageReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminal {
    Loaded,
    Failed,
}

struct SessionState {
    options: OptionsState,
    handles: Option<Arc<SceneHandles>>,
    config: Option<PreviewConfig>,
    terminal: Option<Terminal>,
}

struct SessionInner {
    resolver: ConfigResolver,
    renderer: Arc<dyn PreviewRenderer>,
    outbound: MessageSender,
    emote_events: EmoteEventSender,
    state: Mutex<SessionState>,
}

impl SessionInner {
    fn send(&self, message: PreviewMessage) {
        if self.outbound.send(message).is_err() {
            debug!("Host channel closed; message dropped");
        }
    }

    async fn resolve(self: &Arc<Self>, snapshot: PreviewOptions) {
        let result = self.resolver.create_config(&snapshot).await;

        {
            let state = self.state.lock().await;
            if state.options.merged() != snapshot {
                debug!("Discarding superseded resolution");
                return;
            }
            if state.terminal == Some(Terminal::Failed) {
                return;
            }
        }

        let config = match result {
            Ok(config) => config,
            Err(e) => {
                self.fail(e).await;
                return;
            }
        };
        let handles = match self
            .renderer
            .render(&config, self.emote_events.clone())
            .await
        {
            Ok(handles) => Arc::new(handles),
            Err(e) => {
                self.fail(e).await;
                return;
            }
        };

        let camera = config.camera;
        let animate = has_emote(&config);
        let first_load = {
            let mut state = self.state.lock().await;
            // Re-check: an update may have landed while rendering.
            if state.options.merged() != snapshot {
                debug!("Discarding superseded render");
                return;
            }
            if state.terminal == Some(Terminal::Failed) {
                return;
            }
            state.handles = Some(Arc::clone(&handles));
            state.config = Some(config);
            let first = state.terminal.is_none();
            if first {
                state.terminal = Some(Terminal::Loaded);
            }
            first
        };

        if first_load {
            info!("Preview loaded");
            self.send(PreviewMessage::Load);
        }
        if animate {
            // A static camera shows the first frame instead of autoplaying.
            let started = if camera == PreviewCamera::Static {
                handles.emote.go_to(0.0).await
            } else {
                handles.emote.play().await
            };
            if let Err(e) = started {
                warn!("Emote autoplay failed: {e}");
            }
        }
    }

    async fn fail(&self, e: Error) {
        error!("Preview resolution failed: {e}");
        let mut state = self.state.lock().await;
        if state.terminal.is_none() {
            state.terminal = Some(Terminal::Failed);
            drop(state);
            self.send(PreviewMessage::Error {
                message: e.to_string(),
            });
        }
    }

    async fn dispatch_request(&self, request: ControllerRequest) -> ControllerResponse {
        let command = match dispatch::parse_request(&request) {
            Ok(command) => command,
            Err(e) => return ControllerResponse::failure(request.id, e.to_string()),
        };
        let handles = { self.state.lock().await.handles.clone() };
        let Some(handles) = handles else {
            return ControllerResponse::failure(request.id, "Controller not ready".to_string());
        };
        match dispatch::execute(&handles, command).await {
            Ok(result) => ControllerResponse::success(request.id, result),
            Err(e) => ControllerResponse::failure(request.id, e.to_string()),
        }
    }
}

pub struct PreviewSession {
    inner: Arc<SessionInner>,
}

impl PreviewSession {
    /// `events` is the emote event channel: the sender is handed to every
    /// render (and may also be wired into an engine bridge); the receiver
    /// is drained here and forwarded to the host 1:1.
    pub fn new(
        resolver: ConfigResolver,
        renderer: Arc<dyn PreviewRenderer>,
        base_options: PreviewOptions,
        outbound: MessageSender,
        events: (EmoteEventSender, EmoteEventReceiver),
    ) -> Self {
        let (emote_events, mut events_rx) = events;
        let forward = outbound.clone();
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                if forward.send(PreviewMessage::EmoteEvent { event }).is_err() {
                    break;
                }
            }
        });

        Self {
            inner: Arc::new(SessionInner {
                resolver,
                renderer,
                outbound,
                emote_events,
                state: Mutex::new(SessionState {
                    options: OptionsState::new(base_options),
                    handles: None,
                    config: None,
                    terminal: None,
                }),
            }),
        }
    }

    /// Announces the session and kicks off the initial resolution.
    pub async fn start(&self) {
        info!("Preview session ready");
        self.inner.send(PreviewMessage::Ready);
        let snapshot = { self.inner.state.lock().await.options.merged() };
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.resolve(snapshot).await });
    }

    /// Routes one inbound host message.
    pub async fn handle_message(&self, message: PreviewMessage) {
        match message {
            PreviewMessage::Update { options } => {
                let snapshot = {
                    let mut state = self.inner.state.lock().await;
                    state.options.apply_update(options);
                    state.options.merged()
                };
                info!("Options update received; re-resolving");
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move { inner.resolve(snapshot).await });
            }
            PreviewMessage::ControllerRequest(request) => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    let response = inner.dispatch_request(request).await;
                    inner.send(PreviewMessage::ControllerResponse(response));
                });
            }
            other => {
                warn!("Ignoring unexpected inbound message: {other:?}");
            }
        }
    }

    /// Parses a raw JSON frame and routes it; malformed frames are
    /// rejected here with a warning.
    pub async fn handle_raw(&self, text: &str) {
        match serde_json::from_str::<PreviewMessage>(text) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => warn!("Malformed host frame: {e}"),
        }
    }

    /// The last committed config, if any resolution has succeeded.
    pub async fn current_config(&self) -> Option<PreviewConfig> {
        self.inner.state.lock().await.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::clients::FetchPolicy;
    use crate::emote::emote_event_channel;
    use crate::emote::EmoteEvent;
    use crate::renderer::HeadlessRenderer;
    use wearview_common::models::{PreviewEmote, PreviewType};

    /// Headless renderer with an artificial render delay, for exercising
    /// the superseded-resolution paths.
    struct SlowRenderer {
        delay: Duration,
    }

    #[async_trait]
    impl PreviewRenderer for SlowRenderer {
        async fn render(
            &self,
            config: &PreviewConfig,
            events: EmoteEventSender,
        ) -> Result<SceneHandles, Error> {
            tokio::time::sleep(self.delay).await;
            HeadlessRenderer.render(config, events).await
        }
    }

    fn session_with(
        renderer: Arc<dyn PreviewRenderer>,
        base: PreviewOptions,
    ) -> (PreviewSession, MessageReceiver) {
        let (tx, rx) = message_channel();
        let session = PreviewSession::new(
            ConfigResolver::new(FetchPolicy::default()),
            renderer,
            base,
            tx,
            emote_event_channel(),
        );
        (session, rx)
    }

    async fn recv(rx: &mut MessageReceiver) -> PreviewMessage {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for message")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_ready_then_load() {
        let (session, mut rx) =
            session_with(Arc::new(HeadlessRenderer), PreviewOptions::default());
        session.start().await;

        assert_eq!(recv(&mut rx).await, PreviewMessage::Ready);
        assert_eq!(recv(&mut rx).await, PreviewMessage::Load);

        let config = session.current_config().await.unwrap();
        assert_eq!(config.preview_type, PreviewType::Wearable);
        assert!(config.wearables.is_empty());
    }

    #[tokio::test]
    async fn test_resolution_failure_sends_error_once() {
        let base = PreviewOptions {
            contract_address: Some("0xabc".to_string()),
            ..Default::default()
        };
        let (session, mut rx) = session_with(Arc::new(HeadlessRenderer), base);
        session.start().await;

        assert_eq!(recv(&mut rx).await, PreviewMessage::Ready);
        let PreviewMessage::Error { message } = recv(&mut rx).await else {
            panic!("expected error message");
        };
        assert!(message.contains("item id or a token id"), "{message}");

        // A failed session ignores further updates: no LOAD, no second
        // ERROR.
        session
            .handle_message(PreviewMessage::Update {
                options: PreviewOptions {
                    zoom: Some(2.0),
                    ..Default::default()
                },
            })
            .await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
        assert!(session.current_config().await.is_none());
    }

    #[tokio::test]
    async fn test_superseded_resolution_discarded() {
        let (session, mut rx) = session_with(
            Arc::new(SlowRenderer {
                delay: Duration::from_millis(200),
            }),
            PreviewOptions::default(),
        );
        session.start().await;
        assert_eq!(recv(&mut rx).await, PreviewMessage::Ready);

        // Land an update while the first render is still in flight.
        tokio::time::sleep(Duration::from_millis(50)).await;
        session
            .handle_message(PreviewMessage::Update {
                options: PreviewOptions {
                    zoom: Some(2.0),
                    ..Default::default()
                },
            })
            .await;

        assert_eq!(recv(&mut rx).await, PreviewMessage::Load);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.try_recv().is_err(), "expected a single LOAD");

        // Only the superseding resolution committed.
        let config = session.current_config().await.unwrap();
        assert_eq!(config.zoom, 2.0);
    }

    #[tokio::test]
    async fn test_controller_not_ready_before_load() {
        let (session, mut rx) = session_with(
            Arc::new(SlowRenderer {
                delay: Duration::from_millis(500),
            }),
            PreviewOptions::default(),
        );
        session.start().await;
        assert_eq!(recv(&mut rx).await, PreviewMessage::Ready);

        session
            .handle_message(PreviewMessage::ControllerRequest(ControllerRequest {
                id: "r1".to_string(),
                namespace: "emote".to_string(),
                method: "play".to_string(),
                params: vec![],
            }))
            .await;

        let PreviewMessage::ControllerResponse(response) = recv(&mut rx).await else {
            panic!("expected controller response");
        };
        assert_eq!(response.id, "r1");
        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("Controller not ready"));
    }

    #[tokio::test]
    async fn test_dispatch_error_strings_after_load() {
        let (session, mut rx) =
            session_with(Arc::new(HeadlessRenderer), PreviewOptions::default());
        session.start().await;
        assert_eq!(recv(&mut rx).await, PreviewMessage::Ready);
        assert_eq!(recv(&mut rx).await, PreviewMessage::Load);

        session
            .handle_message(PreviewMessage::ControllerRequest(ControllerRequest {
                id: "r2".to_string(),
                namespace: "physics".to_string(),
                method: "step".to_string(),
                params: vec![],
            }))
            .await;
        let PreviewMessage::ControllerResponse(response) = recv(&mut rx).await else {
            panic!("expected controller response");
        };
        assert_eq!(response.error.as_deref(), Some("Invalid namespace"));

        // Emoteless preview: the emote namespace parses but the invalid
        // controller rejects the call.
        session
            .handle_message(PreviewMessage::ControllerRequest(ControllerRequest {
                id: "r3".to_string(),
                namespace: "emote".to_string(),
                method: "play".to_string(),
                params: vec![],
            }))
            .await;
        let PreviewMessage::ControllerResponse(response) = recv(&mut rx).await else {
            panic!("expected controller response");
        };
        assert_eq!(response.error.as_deref(), Some("Invalid emote controller"));
    }

    #[tokio::test]
    async fn test_emote_autoplay_forwards_events() {
        let base = PreviewOptions {
            emote: Some(PreviewEmote::Idle),
            ..Default::default()
        };
        let (session, mut rx) = session_with(Arc::new(HeadlessRenderer), base);
        session.start().await;

        assert_eq!(recv(&mut rx).await, PreviewMessage::Ready);
        assert_eq!(recv(&mut rx).await, PreviewMessage::Load);
        assert_eq!(
            recv(&mut rx).await,
            PreviewMessage::EmoteEvent {
                event: EmoteEvent::Play
            }
        );
    }

    #[tokio::test]
    async fn test_static_camera_freezes_instead_of_autoplay() {
        let base = PreviewOptions {
            emote: Some(PreviewEmote::Dance),
            camera: Some(PreviewCamera::Static),
            ..Default::default()
        };
        let (session, mut rx) = session_with(Arc::new(HeadlessRenderer), base);
        session.start().await;

        assert_eq!(recv(&mut rx).await, PreviewMessage::Ready);
        assert_eq!(recv(&mut rx).await, PreviewMessage::Load);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err(), "no events expected while frozen");

        session
            .handle_message(PreviewMessage::ControllerRequest(ControllerRequest {
                id: "r4".to_string(),
                namespace: "emote".to_string(),
                method: "isPlaying".to_string(),
                params: vec![],
            }))
            .await;
        let PreviewMessage::ControllerResponse(response) = recv(&mut rx).await else {
            panic!("expected controller response");
        };
        assert_eq!(response.result, Some(json!(false)));
    }
}
