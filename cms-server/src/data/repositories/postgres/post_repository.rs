use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{NewPost, PostListQuery, PostPatch, PostRepository, RecordScope};
use crate::domain::audit::AuditFields;
use crate::domain::author::Author;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStatus};

const POST_COLUMNS: &str = r#"
    p.id,
    p.user_id,
    p.title,
    p.content,
    p.slug,
    p.featured_image,
    p.status,
    p.published_at,
    p.created,
    p.created_user,
    p.updated,
    p.updated_user,
    p.deleted,
    p.deleted_user,
    u.email AS author_email
"#;

/// Автор подтягивается из `users`; `p` может быть и CTE после INSERT/UPDATE.
const AUTHOR_JOIN: &str = "LEFT JOIN users u ON u.id = p.user_id";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    slug: String,
    featured_image: Option<String>,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created: Option<DateTime<Utc>>,
    created_user: Option<String>,
    updated: Option<DateTime<Utc>>,
    updated_user: Option<String>,
    deleted: Option<DateTime<Utc>>,
    deleted_user: Option<String>,
    author_email: Option<String>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO posts (
                    user_id, title, content, slug, featured_image, status, published_at,
                    created, created_user, updated, updated_user
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING *
            )
            SELECT {POST_COLUMNS} FROM inserted p {AUTHOR_JOIN}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(input.user_id)
            .bind(input.title)
            .bind(input.content)
            .bind(input.slug)
            .bind(input.featured_image)
            .bind(input.status.as_str())
            .bind(input.published_at)
            .bind(input.audit.created)
            .bind(input.audit.created_user)
            .bind(input.audit.updated)
            .bind(input.audit.updated_user)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn find_post_by_id(
        &self,
        id: i64,
        scope: RecordScope,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p {AUTHOR_JOIN} WHERE p.id = $1{}",
            scope_clause(scope)
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn find_post_by_slug(
        &self,
        slug: &str,
        scope: RecordScope,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p {AUTHOR_JOIN} WHERE p.slug = $1{}",
            scope_clause(scope)
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn slugs_with_base(&self, base: &str) -> Result<HashSet<String>, DomainError> {
        let pattern = format!("{}-%", escape_like(base));
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT slug
            FROM posts
            WHERE slug = $1 OR slug LIKE $2
            "#,
        )
        .bind(base)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(slugs.into_iter().collect())
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        // COALESCE: published_at, однажды записанный, не перезаписывается
        let sql = format!(
            r#"
            WITH updated_post AS (
                UPDATE posts
                SET title = $2,
                    content = $3,
                    featured_image = $4,
                    status = $5,
                    published_at = COALESCE(published_at, $6),
                    updated = $7,
                    updated_user = $8
                WHERE id = $1 AND deleted IS NULL
                RETURNING *
            )
            SELECT {POST_COLUMNS} FROM updated_post p {AUTHOR_JOIN}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.content)
            .bind(patch.featured_image)
            .bind(patch.status.as_str())
            .bind(patch.published_at)
            .bind(patch.updated)
            .bind(patch.updated_user)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn soft_delete_post(&self, id: i64, audit: &AuditFields) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET deleted = $2,
                deleted_user = $3
            WHERE id = $1 AND deleted IS NULL
            "#,
        )
        .bind(id)
        .bind(audit.deleted)
        .bind(audit.deleted_user.as_deref())
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, query: &PostListQuery) -> Result<Vec<Post>, DomainError> {
        let mut builder = list_posts_query(query);
        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, query: &PostListQuery) -> Result<i64, DomainError> {
        let mut builder = count_posts_query(query);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }
}

fn list_posts_query(query: &PostListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder =
        QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts p {AUTHOR_JOIN}"));
    push_list_filters(&mut builder, query);

    let column = query.sort_by.column();
    let direction = query.sort_order.keyword();
    builder.push(format!(
        " ORDER BY p.{column} {direction} NULLS LAST, p.id {direction}"
    ));
    builder
        .push(" LIMIT ")
        .push_bind(query.pagination.limit())
        .push(" OFFSET ")
        .push_bind(query.pagination.offset());
    builder
}

fn count_posts_query(query: &PostListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
    push_list_filters(&mut builder, query);
    builder
}

fn push_list_filters(builder: &mut QueryBuilder<'static, Postgres>, query: &PostListQuery) {
    builder.push(" WHERE p.deleted IS NULL");

    match query.status {
        Some(status) => {
            builder.push(" AND p.status = ").push_bind(status.as_str());
        }
        None => {
            builder
                .push(" AND p.status = ")
                .push_bind(PostStatus::Published.as_str())
                .push(" AND p.published_at IS NOT NULL AND p.published_at <= ")
                .push_bind(query.now);
        }
    }

    if let Some(search) = query.search.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn scope_clause(scope: RecordScope) -> &'static str {
    match scope {
        RecordScope::Live => " AND p.deleted IS NULL",
        RecordScope::IncludeDeleted => "",
    }
}

/// `\` — escape-символ LIKE в PostgreSQL по умолчанию.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let status = row
        .status
        .parse::<PostStatus>()
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    let audit = AuditFields {
        created: row.created,
        created_user: row.created_user,
        updated: row.updated,
        updated_user: row.updated_user,
        deleted: row.deleted,
        deleted_user: row.deleted_user,
    };

    let author = row
        .author_email
        .map(|email| Author::new(row.user_id, email));

    Post::new(row.id, row.user_id, row.title, row.content, row.slug, status)
        .map(|post| {
            post.with_featured_image(row.featured_image)
                .with_published_at(row.published_at)
                .with_audit(audit)
                .with_author(author)
        })
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") if db_err.constraint() == Some("posts_slug_key") => {
                return DomainError::AlreadyExists("slug".to_string());
            }
            Some("23503") => return DomainError::NotFound("user".to_string()),
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
