use axum::Router;
use axum::middleware;
use axum::routing::put;

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{delete_comment, update_comment};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{id}", put(update_comment).delete(delete_comment))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
