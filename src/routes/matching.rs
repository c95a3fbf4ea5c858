use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::header,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::matching::events::{ProgressEvent, ProgressSink};
use crate::matching::MatchOrchestrator;
use crate::{error::Result, AppState};

/// Batch mode: run the whole search silently and answer with the terminal
/// outcome only.
pub async fn match_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse> {
    let role = state
        .role_service
        .get_role_information(id)
        .await?
        .ok_or_else(|| Error::NotFound("Role not found".into()))?;

    let orchestrator = MatchOrchestrator::new(
        state.llm.clone(),
        state.match_store.clone(),
        state.audit_service.clone(),
    );
    let outcome = orchestrator
        .run_match(role, &ProgressSink::silent(), &CancellationToken::new())
        .await?;
    Ok(Json(outcome))
}

/// Streaming mode: progress events over SSE, terminated by a `result` and a
/// completing `status` event, or by an `error` event.
pub async fn stream_match_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl axum::response::IntoResponse> {
    let role = state
        .role_service
        .get_role_information(id)
        .await?
        .ok_or_else(|| Error::NotFound("Role not found".into()))?;

    let role_id = role.id;
    let (sink, mut rx) = ProgressSink::channel();
    let cancel = CancellationToken::new();

    let orchestrator = MatchOrchestrator::new(
        state.llm.clone(),
        state.match_store.clone(),
        state.audit_service.clone(),
    );
    let loop_cancel = cancel.clone();
    tokio::spawn(async move {
        match orchestrator.run_match(role, &sink, &loop_cancel).await {
            Ok(_) => {}
            Err(Error::Cancelled(_)) => {
                tracing::info!(role_id, "Match stream cancelled by client disconnect");
            }
            Err(e) => {
                tracing::error!(role_id, error = %e, "Match loop failed");
                sink.emit(ProgressEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    });

    let stream: std::pin::Pin<
        Box<dyn Stream<Item = std::result::Result<Event, Infallible>> + Send>,
    > = Box::pin(async_stream::stream! {
        // Cancels the loop at its next suspension point once the client goes
        // away and this stream is dropped.
        let _guard = cancel.drop_guard();
        while let Some(ev) = rx.recv().await {
            match Event::default().event(ev.event_name()).json_data(&ev) {
                Ok(sse) => yield Ok(sse),
                Err(e) => {
                    tracing::error!(role_id, error = %e, "Failed to serialize SSE event; dropping");
                }
            }
        }
    });

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("keepalive"),
    );
    Ok(([(header::CACHE_CONTROL, "no-cache")], sse))
}
