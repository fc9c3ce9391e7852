use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{create_comment, list_comments};
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, list_posts, update_post,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

// `{post}`: слаг для GET, числовой id для остальных методов.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_posts))
        .route("/{post}", get(get_post))
        .route("/{post}/comments", get(list_comments));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{post}", put(update_post).delete(delete_post))
        .route("/{post}/comments", post(create_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    public.merge(protected)
}
