//! Operator log feed
//!
//! - `GET /api/admin/logs` returns recent captured log entries
//! - `GET /api/admin/logs/stream` pushes new entries over SSE

use axum::{
    extract::{Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use super::server::AppState;
use crate::logging::LogEntry;

const DEFAULT_LOG_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct LogsQuery {
    limit: Option<usize>,
    /// Minimum level, e.g. "warn"
    level: Option<String>,
}

/// GET /api/admin/logs
pub async fn recent_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Json<Vec<LogEntry>> {
    let min_level = query.level.as_deref().and_then(|l| l.parse().ok());
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    Json(state.log_buffer.recent(limit, min_level))
}

/// GET /api/admin/logs/stream
pub async fn logs_stream(State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.log_buffer.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => Some(Ok::<_, Infallible>(Event::default().data(entry.to_json()))),
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
