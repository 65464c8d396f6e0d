// File: wearview-server/src/server.rs
//
// WebSocket accept loop. Each accepted connection becomes one
// `PreviewSession`: the upgrade query string is parsed into the base
// options, outbound protocol messages are written as JSON text frames,
// and inbound frames are routed to the session (or, for engine-tagged
// frames, to the engine bridge). In engine mode the bridge's outgoing
// commands travel back over the same socket for the host to forward to
// its embedded engine.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use wearview_core::bridge::engine::ENGINE_FRAME_TYPE;
use wearview_core::bridge::EngineHandle;
use wearview_core::clients::FetchPolicy;
use wearview_core::emote::emote_event_channel;
use wearview_core::options::parse_query;
use wearview_core::renderer::{EngineRenderer, HeadlessRenderer, PreviewRenderer};
use wearview_core::session::message_channel;
use wearview_core::{ConfigResolver, PreviewSession};

use crate::Args;

pub async fn run(args: Args) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&args.listen_addr)
        .await
        .with_context(|| format!("binding {}", args.listen_addr))?;
    info!("Listening on {}", args.listen_addr);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted.context("accepting connection")?;
                let args = args.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, peer, args).await {
                        warn!("Connection {peer} ended with error: {e:#}");
                    }
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received; shutting down");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, args: Args) -> anyhow::Result<()> {
    // The handshake callback is the only place the request URI is
    // visible; capture its query string before upgrading.
    let mut query = String::new();
    let ws = accept_hdr_async(stream, |request: &Request, response: Response| {
        if let Some(q) = request.uri().query() {
            query = q.to_string();
        }
        Ok::<Response, ErrorResponse>(response)
    })
    .await
    .context("websocket handshake")?;
    info!("Session connected: {peer} (query: \"{query}\")");

    let mut base = parse_query(&query);
    if base.env.is_none() {
        base.env = args.env.parse().ok();
    }
    if base.peer_url.is_none() {
        base.peer_url = args.peer_url.clone();
    }
    if base.nft_server_url.is_none() {
        base.nft_server_url = args.nft_server_url.clone();
    }

    let policy = FetchPolicy {
        attempts: args.fetch_attempts,
        backoff: Duration::from_millis(args.fetch_backoff_ms),
    };

    // The engine handle exists either way; in headless mode it has no
    // consumer and its command stream stays silent.
    let (events_tx, events_rx) = emote_event_channel();
    let (engine, mut engine_commands) = EngineHandle::new(events_tx.clone());
    let renderer: Arc<dyn PreviewRenderer> = if args.engine {
        Arc::new(EngineRenderer::new(engine.clone()))
    } else {
        Arc::new(HeadlessRenderer)
    };

    let (outbound, mut outbound_rx) = message_channel();
    let session = PreviewSession::new(
        ConfigResolver::new(policy),
        renderer,
        base,
        outbound,
        (events_tx, events_rx),
    );
    session.start().await;

    let (mut ws_tx, mut ws_rx) = ws.split();
    loop {
        tokio::select! {
            Some(message) = outbound_rx.recv() => {
                let text = serde_json::to_string(&message)?;
                ws_tx.send(Message::text(text)).await?;
            }
            Some(command) = engine_commands.recv() => {
                let text = serde_json::to_string(&command)?;
                ws_tx.send(Message::text(text)).await?;
            }
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        route_frame(&session, &engine, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(other)) => debug!("Ignoring non-text frame: {other:?}"),
                    Some(Err(e)) => {
                        debug!("Read error from {peer}: {e}");
                        break;
                    }
                }
            }
        }
    }

    info!("Session disconnected: {peer}");
    Ok(())
}

/// Engine frames carry the engine tag; everything else belongs to the
/// host protocol.
async fn route_frame(session: &PreviewSession, engine: &EngineHandle, text: &str) {
    let tag = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from));
    match tag.as_deref() {
        Some(ENGINE_FRAME_TYPE) => engine.handle_raw(text),
        _ => session.handle_raw(text).await,
    }
}
