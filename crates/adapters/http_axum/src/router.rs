//! Axum router assembly.

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use meterhub_app::ports::{BaselineRepository, GroupRepository};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and answers `/health` at the root.
/// A [`TraceLayer`] logs each request/response at the `DEBUG` level and a
/// [`TimeoutLayer`] answers `408 Request Timeout` once `request_timeout`
/// elapses, dropping the handler future.
pub fn build<GR, BR>(state: AppState<GR, BR>, request_timeout: Duration) -> Router
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
