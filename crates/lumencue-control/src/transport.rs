//! Websocket cue transport
//!
//! Every text frame received on the endpoint is one cue. The raw string is
//! forwarded unparsed into the dispatch loop's hand-off channel and the client
//! gets a short acknowledgement per frame. Parsing and validation happen on
//! the dispatch thread.

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use crossbeam_channel::Sender;
use futures::{SinkExt, StreamExt};
use lumencue_core::TransportConfig;

use crate::{error::ControlError, Result};

/// Reply sent for every cue handed to the dispatch loop
pub const ACK: &str = "ok";

/// State shared by every connection
#[derive(Clone)]
pub struct TransportState {
    cues: Sender<String>,
}

/// Hand one raw cue to the dispatch loop
pub fn forward_cue(cues: &Sender<String>, cue: String) -> Result<()> {
    cues.send(cue)
        .map_err(|_| ControlError::TransportError("dispatch loop has stopped".to_string()))
}

/// Websocket server feeding the dispatch loop
pub struct CueServer {
    config: TransportConfig,
    cues: Sender<String>,
}

impl CueServer {
    /// Create a server forwarding cues into `cues`
    pub fn new(config: TransportConfig, cues: Sender<String>) -> Self {
        Self { config, cues }
    }

    /// Address the server binds to
    pub fn addr(&self) -> Result<SocketAddr> {
        self.config
            .bind_addr()
            .map_err(|e| ControlError::InvalidAddress(e.to_string()))
    }

    /// Router serving the websocket endpoint
    pub fn router(&self) -> Router {
        let state = TransportState {
            cues: self.cues.clone(),
        };
        Router::new()
            .route(&self.config.path, get(ws_handler))
            .with_state(state)
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ControlError::TransportError(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(
            "Cue transport listening on ws://{}{}",
            listener.local_addr()?,
            self.config.path
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ControlError::TransportError(format!("Server error: {}", e)))?;

        tracing::info!("Cue transport stopped");
        Ok(())
    }
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<TransportState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: TransportState) {
    let (mut sender, mut receiver) = socket.split();

    tracing::info!("Cue client connected");

    while let Some(msg) = receiver.next().await {
        let cue = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!("Ignoring non-UTF-8 binary frame");
                    continue;
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!("Cue client disconnected");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("WebSocket error: {}", e);
                break;
            }
        };

        tracing::debug!("Cue received: {}", cue.trim());

        let reply = match forward_cue(&state.cues, cue) {
            Ok(()) => ACK.to_string(),
            Err(e) => {
                tracing::warn!("{}", e);
                format!("error: {}", e)
            }
        };
        if sender.send(Message::Text(reply)).await.is_err() {
            break;
        }
    }
}
