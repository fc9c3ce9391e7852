use std::sync::Arc;

use anyhow::Result;
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::comment_service::CommentService;
use application::post_service::{PageLimits, PostService};
use data::repositories::postgres::comment_repository::PostgresCommentRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use infrastructure::clock::{Clock, SystemClock};
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let post_service = Arc::new(PostService::new(
        PostgresPostRepository::new(pool.clone()),
        clock.clone(),
        PageLimits {
            default_per_page: settings.posts_default_page_size,
            max_per_page: settings.posts_max_page_size,
        },
    ));
    let comment_service = Arc::new(CommentService::new(
        PostgresCommentRepository::new(pool.clone()),
        PostgresPostRepository::new(pool.clone()),
        clock,
    ));
    let jwt = Arc::new(JwtService::new(&settings.jwt_secret));

    let state = AppState::new(pool, post_service, comment_service, jwt);

    info!(addr = %settings.http_addr, "starting cms-server");
    server::run_http(&settings, state).await
}
