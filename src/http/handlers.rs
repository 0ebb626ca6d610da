//! Demo handlers simulating slow work that honours the request context.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rand::Rng;

use crate::config::DemoConfig;
use crate::context::Context;

/// Work for a random whole number of seconds below `demo.max_work`.
pub async fn work(State(demo): State<DemoConfig>, ctx: Context) -> Response {
    let bound = demo.max_work.as_secs().max(1);
    let process = Duration::from_secs(rand::thread_rng().gen_range(0..bound));
    simulate(ctx, process).await
}

/// Work for `millis` milliseconds.
pub async fn work_for(Path(millis): Path<u64>, ctx: Context) -> Response {
    simulate(ctx, Duration::from_millis(millis)).await
}

async fn simulate(ctx: Context, process: Duration) -> Response {
    tokio::select! {
        _ = ctx.done() => {
            tracing::debug!(?process, cause = ?ctx.err(), "Work abandoned");
            StatusCode::OK.into_response()
        }
        _ = tokio::time::sleep(process) => "done".into_response(),
    }
}
