//! WebSocket handler for streaming snapshots.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tracing::debug;

use super::handlers::AppState;
use super::types::WsMessage;

type WsSink = SplitSink<WebSocket, Message>;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    while let Some(msg) = next_message(&mut sink, &mut stream).await {
        let ws_msg: WsMessage = match serde_json::from_str(&msg) {
            Ok(m) => m,
            Err(e) => {
                send(&mut sink, &WsMessage::error("PARSE_ERROR", e.to_string())).await;
                continue;
            }
        };

        match ws_msg {
            WsMessage::Generate { prompt, model } => {
                if prompt.trim().is_empty() {
                    send(
                        &mut sink,
                        &WsMessage::error("EMPTY_PROMPT", "prompt must not be empty"),
                    )
                    .await;
                    continue;
                }
                let model = state.relay.catalog().resolve(model.as_deref());
                if !stream_run(&state, prompt, model, &mut sink, &mut stream).await {
                    return;
                }
            }
            WsMessage::Ping => {
                send(&mut sink, &WsMessage::Pong).await;
            }
            _ => {
                // Ignore other message types from client
            }
        }
    }
}

/// Forward one run's emissions. Returns `false` if the client went away,
/// in which case the run has been dropped and its process terminated.
async fn stream_run(
    state: &AppState,
    prompt: String,
    model: String,
    sink: &mut WsSink,
    stream: &mut SplitStream<WebSocket>,
) -> bool {
    let mut run = state.relay.submit(prompt, model);

    loop {
        tokio::select! {
            emission = run.next() => {
                let Some(emission) = emission else { return true };
                let terminal = emission.is_terminal();
                if !send(sink, &WsMessage::snapshot(emission)).await {
                    debug!("client gone, cancelling run");
                    run.cancel().await;
                    return false;
                }
                if terminal {
                    return true;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    debug!("client disconnected mid-run, cancelling");
                    run.cancel().await;
                    return false;
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = sink.send(Message::Pong(data)).await;
                }
                Some(Ok(_)) => {
                    send(sink, &WsMessage::error("BUSY", "a generation is already running")).await;
                }
            },
        }
    }
}

/// Wait for the next text frame, answering pings along the way.
async fn next_message(sink: &mut WsSink, stream: &mut SplitStream<WebSocket>) -> Option<String> {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
            Ok(Message::Close(_)) => return None,
            Ok(Message::Ping(data)) => {
                let _ = sink.send(Message::Pong(data)).await;
            }
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}

async fn send(sink: &mut WsSink, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => false,
    }
}
