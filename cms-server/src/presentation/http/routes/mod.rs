use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::health::healthz;

pub(crate) mod comments;
pub(crate) mod posts;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/comments", comments::router(state))
}
