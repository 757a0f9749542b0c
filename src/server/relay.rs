//! Realtime speech relay
//!
//! `/ws` bridges the browser client to the realtime speech endpoint: one
//! WebSocket in from the client, one out to the provider, and two
//! forwarding loops between them, one per direction. Frames pass through
//! verbatim; the relay never inspects payloads and shares no state with
//! the scheduler.

use axum::extract::ws::{Message as ClientMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;

use super::AppState;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("invalid upstream header value: {0}")]
    Header(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),

    #[error("upstream websocket error: {0}")]
    Upstream(#[from] tokio_tungstenite::tungstenite::Error),
}

/// `GET /ws`: upgrade the client connection and start a relay session.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let Some(api_key) = state.config.api_key.clone() else {
        log::warn!("relay requested but no speech API key is configured");
        return (StatusCode::SERVICE_UNAVAILABLE, "speech relay is not configured")
            .into_response();
    };
    let url = state.config.realtime_url().to_string();

    ws.on_upgrade(move |client| async move {
        match relay_session(client, &url, &api_key).await {
            Ok(()) => log::debug!("relay session closed"),
            Err(err) => log::warn!("relay session ended: {err}"),
        }
    })
}

fn build_upstream_request(url: &str, api_key: &str) -> Result<Request, RelayError> {
    let mut request = url.into_client_request()?;
    let headers = request.headers_mut();
    headers.insert("Authorization", HeaderValue::from_str(&format!("Bearer {api_key}"))?);
    headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));
    Ok(request)
}

async fn relay_session(client: WebSocket, url: &str, api_key: &str) -> Result<(), RelayError> {
    let request = build_upstream_request(url, api_key)?;
    let (upstream, response) = connect_async(request).await?;
    log::info!("relay connected to {url} ({})", response.status());

    let (mut upstream_tx, mut upstream_rx) = upstream.split();
    let (mut client_tx, mut client_rx) = client.split();

    let client_to_upstream = async {
        while let Some(message) = client_rx.next().await {
            let message = match message {
                Ok(message) => message,
                Err(_) => break,
            };
            let forwarded = match message {
                ClientMessage::Text(text) => UpstreamMessage::text(text.as_str()),
                ClientMessage::Binary(data) => UpstreamMessage::binary(data.to_vec()),
                // Keepalive frames stay per-hop; both sides answer pings
                // themselves.
                ClientMessage::Ping(_) | ClientMessage::Pong(_) => continue,
                ClientMessage::Close(_) => break,
            };
            if upstream_tx.send(forwarded).await.is_err() {
                break;
            }
        }
        let _ = upstream_tx.send(UpstreamMessage::Close(None)).await;
    };

    let upstream_to_client = async {
        while let Some(message) = upstream_rx.next().await {
            let message = match message {
                Ok(message) => message,
                Err(_) => break,
            };
            let forwarded = match message {
                UpstreamMessage::Text(text) => ClientMessage::Text(text.as_str().into()),
                UpstreamMessage::Binary(data) => ClientMessage::Binary(data.to_vec().into()),
                UpstreamMessage::Ping(_) | UpstreamMessage::Pong(_) => continue,
                UpstreamMessage::Close(_) => break,
                UpstreamMessage::Frame(_) => continue,
            };
            if client_tx.send(forwarded).await.is_err() {
                break;
            }
        }
        let _ = client_tx.close().await;
    };

    // Either side closing tears down the whole session.
    tokio::select! {
        _ = client_to_upstream => log::debug!("client leg finished"),
        _ = upstream_to_client => log::debug!("upstream leg finished"),
    }

    Ok(())
}
