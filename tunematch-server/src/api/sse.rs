//! Server-Sent Events (SSE) push channel
//!
//! Streams presence snapshots to connected clients. Every new client gets
//! an immediate catch-up snapshot so it never waits a full poll interval
//! for its first state.

use crate::api::server::AppContext;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use tunematch_common::events::PushEvent;

/// GET /events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    // Subscribe before taking the snapshot so no update between the two
    // can be missed
    let rx = ctx.registry.subscribe();
    let catch_up = PushEvent::status_update(ctx.registry.snapshot());

    let live = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => to_sse_event(&event),
            Err(e) => {
                // Lagged receiver: the next full snapshot resynchronizes
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    let stream = stream::iter(to_sse_event(&catch_up)).chain(live);

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Serialize a push event into an SSE frame.
fn to_sse_event(event: &PushEvent) -> Option<Result<Event, Infallible>> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Ok(Event::default().event(event.event_type()).data(json))),
        Err(e) => {
            warn!("Failed to serialize event: {}", e);
            None
        }
    }
}
