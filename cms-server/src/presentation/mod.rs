use sqlx::PgPool;
use std::sync::Arc;

use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

pub(crate) type AppPostService = PostService<PostgresPostRepository>;
pub(crate) type AppCommentService = CommentService<PostgresCommentRepository, PostgresPostRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: PgPool,
    pub(crate) post_service: Arc<AppPostService>,
    pub(crate) comment_service: Arc<AppCommentService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(
        pool: PgPool,
        post_service: Arc<AppPostService>,
        comment_service: Arc<AppCommentService>,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            pool,
            post_service,
            comment_service,
            jwt,
        }
    }
}
