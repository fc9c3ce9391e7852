use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::post_service::{ListPostsParams, PostPage};
use crate::domain::post::{CreatePostRequest, Post, PostStatus, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{AppJson, AppQuery};
use crate::presentation::http::handlers::comments::{AuthorDto, CommentDto};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    #[validate(length(max = 2048))]
    pub(crate) featured_image: Option<String>,
    /// `draft` (по умолчанию), `published` или `archived`.
    pub(crate) status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    #[validate(length(max = 2048))]
    pub(crate) featured_image: Option<String>,
    /// Без поля статус поста не меняется.
    pub(crate) status: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListPostsQuery {
    /// Подстрока заголовка или текста, без учёта регистра.
    pub(crate) search: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) sort_by: Option<String>,
    pub(crate) sort_order: Option<String>,
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    #[validate(range(min = 1))]
    pub(crate) per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    /// Автор поста; `null`, если строки в `users` нет.
    pub(crate) user: Option<AuthorDto>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: String,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) created: Option<DateTime<Utc>>,
    pub(crate) created_user: Option<String>,
    pub(crate) updated: Option<DateTime<Utc>>,
    pub(crate) updated_user: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) comments: Vec<CommentDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) total: i64,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) last_page: u32,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            user_id: post.user_id,
            user: post.author.map(AuthorDto::from),
            title: post.title,
            content: post.content,
            slug: post.slug,
            featured_image: post.featured_image,
            status: post.status.to_string(),
            published_at: post.published_at,
            created: post.audit.created,
            created_user: post.audit.created_user,
            updated: post.audit.updated,
            updated_user: post.audit.updated_user,
        }
    }
}

impl From<PostPage> for PostPageDto {
    fn from(page: PostPage) -> Self {
        Self {
            posts: page.posts.into_iter().map(PostDto::from).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            last_page: page.last_page,
        }
    }
}

impl From<ListPostsQuery> for ListPostsParams {
    fn from(query: ListPostsQuery) -> Self {
        Self {
            search: query.search,
            status: query.status,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
            page: query.page,
            per_page: query.per_page,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Posts listed", body = PostPageDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListPostsQuery>,
) -> AppResult<(StatusCode, Json<PostPageDto>)> {
    query.validate()?;

    let page = state.post_service.list_posts(query.into()).await?;

    Ok((StatusCode::OK, Json(PostPageDto::from(page))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{slug}",
    tag = "posts",
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post with its visible comments", body = PostDetailDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    let post = state.post_service.get_post(&slug).await?;
    let comments = state.comment_service.list_comments(post.id).await?;

    Ok((
        StatusCode::OK,
        Json(PostDetailDto {
            post: PostDto::from(post),
            comments: comments.into_iter().map(CommentDto::from).collect(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug could not be assigned"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(dto): AppJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let status = dto
        .status
        .as_deref()
        .map(str::parse::<PostStatus>)
        .transpose()?
        .unwrap_or(PostStatus::Draft);
    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        featured_image: dto.featured_image,
        status,
    };

    let result = state
        .post_service
        .create_post(&auth.principal, req)
        .await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(result))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        featured_image: dto.featured_image,
        status: dto
            .status
            .as_deref()
            .map(str::parse::<PostStatus>)
            .transpose()?,
    };

    let result = state
        .post_service
        .update_post(&auth.principal, id, req)
        .await?;
    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(&auth.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
