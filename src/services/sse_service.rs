use std::{convert::Infallible, time::Duration};

use axum::{
    http::{HeaderMap, header::REFERER},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::sse::ServerEvent,
    services::sse_events::EVENT_SCOREBOARD_UPDATED,
    state::{ClientRole, SharedState},
};

/// Subscribe to the shared SSE stream.
pub fn subscribe(state: &SharedState) -> broadcast::Receiver<ServerEvent> {
    state.hub().subscribe()
}

/// Infer the client role from request headers, best-effort.
///
/// The overlay page lives under `/scoreboard`; the controller UI loads from
/// the site root. Anything else, including a missing or unparseable referer,
/// is `unknown`. Misclassification only affects the initial snapshot push.
pub fn infer_role(headers: &HeaderMap) -> ClientRole {
    let referer = headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if referer.contains("/scoreboard") {
        return ClientRole::Overlay;
    }
    if referer.is_empty() {
        return ClientRole::Unknown;
    }

    let after_scheme = referer
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(referer.as_str());
    match after_scheme.split_once('/') {
        // Bare origin or a root path only: that is the controller UI.
        None => ClientRole::Controller,
        Some((_, tail)) if tail.is_empty() || tail == "#" => ClientRole::Controller,
        Some(_) => ClientRole::Unknown,
    }
}

/// Build the events pushed to a subscriber before any broadcast traffic.
///
/// Overlays receive one snapshot of the current document so they render
/// immediately; other roles receive nothing.
pub async fn initial_events(state: &SharedState, role: ClientRole) -> Vec<ServerEvent> {
    if role != ClientRole::Overlay {
        return Vec::new();
    }

    let doc = state.store().load().await;
    match ServerEvent::json(Some(EVENT_SCOREBOARD_UPDATED.to_string()), &doc) {
        Ok(event) => vec![event],
        Err(err) => {
            warn!(error = %err, "failed to serialize initial snapshot");
            Vec::new()
        }
    }
}

/// Convert a broadcast receiver into an SSE response, pushing `initial`
/// events first, then forwarding broadcasts until the client disconnects.
pub fn to_sse_stream(
    receiver: broadcast::Receiver<ServerEvent>,
    initial: Vec<ServerEvent>,
    state: SharedState,
    client_id: Uuid,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        forward(receiver, initial, &tx).await;

        // Own the shared state inside the task so bookkeeping runs even if
        // the request context has already dropped.
        match state.remove_client(client_id) {
            Some(ClientRole::Overlay) => info!("overlay disconnected"),
            Some(ClientRole::Controller) => info!("controller UI disconnected"),
            _ => info!("client disconnected"),
        }
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn forward(
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Vec<ServerEvent>,
    tx: &mpsc::Sender<Result<Event, Infallible>>,
) {
    for payload in initial {
        if tx.send(Ok(to_event(payload))).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            _ = tx.closed() => break,
            recv_result = receiver.recv() => {
                match recv_result {
                    Ok(payload) => {
                        if tx.send(Ok(to_event(payload))).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(_)) => {
                        // Skip lagged messages but keep the stream alive.
                        continue;
                    }
                }
            }
        }
    }
}

fn to_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}
