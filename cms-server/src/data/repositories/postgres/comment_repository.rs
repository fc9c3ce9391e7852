use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{CommentPatch, CommentRepository, NewComment};
use crate::data::post_repository::RecordScope;
use crate::domain::audit::AuditFields;
use crate::domain::author::Author;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

const COMMENT_COLUMNS: &str = r#"
    c.id,
    c.post_id,
    c.user_id,
    c.content,
    c.is_approved,
    c.created,
    c.created_user,
    c.updated,
    c.updated_user,
    c.deleted,
    c.deleted_user,
    u.email AS author_email
"#;

const AUTHOR_JOIN: &str = "LEFT JOIN users u ON u.id = c.user_id";

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    content: String,
    is_approved: bool,
    created: Option<DateTime<Utc>>,
    created_user: Option<String>,
    updated: Option<DateTime<Utc>>,
    updated_user: Option<String>,
    deleted: Option<DateTime<Utc>>,
    deleted_user: Option<String>,
    author_email: Option<String>,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO comments (
                    post_id, user_id, content, is_approved,
                    created, created_user, updated, updated_user
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS} FROM inserted c {AUTHOR_JOIN}
            "#
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(input.post_id)
            .bind(input.user_id)
            .bind(input.content)
            .bind(input.is_approved)
            .bind(input.audit.created)
            .bind(input.audit.created_user)
            .bind(input.audit.updated)
            .bind(input.audit.updated_user)
            .fetch_one(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        map_row_to_comment(row)
    }

    async fn find_comment_by_id(
        &self,
        id: i64,
        scope: RecordScope,
    ) -> Result<Option<Comment>, DomainError> {
        let filter = match scope {
            RecordScope::Live => " AND c.deleted IS NULL",
            RecordScope::IncludeDeleted => "",
        };
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c {AUTHOR_JOIN} WHERE c.id = $1{filter}"
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn update_comment(
        &self,
        id: i64,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, DomainError> {
        let sql = format!(
            r#"
            WITH updated_comment AS (
                UPDATE comments
                SET content = $2,
                    updated = $3,
                    updated_user = $4
                WHERE id = $1 AND deleted IS NULL
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS} FROM updated_comment c {AUTHOR_JOIN}
            "#
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .bind(patch.content)
            .bind(patch.updated)
            .bind(patch.updated_user)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn soft_delete_comment(&self, id: i64, audit: &AuditFields) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE comments
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
        .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_visible_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c {AUTHOR_JOIN}
            WHERE c.deleted IS NULL
              AND c.post_id = $1
              AND c.is_approved = TRUE
            ORDER BY c.created DESC NULLS LAST, c.id DESC
            "#
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment).collect()
    }
}

fn map_row_to_comment(row: CommentRow) -> Result<Comment, DomainError> {
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

    Comment::new(row.id, row.post_id, row.user_id, row.content, row.is_approved)
        .map(|comment| comment.with_audit(audit).with_author(author))
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("comments_post_id_fkey") => "post",
            Some("comments_user_id_fkey") => "user",
            _ => "comment reference",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{CommentRow, map_row_to_comment};
    use crate::domain::author::Author;

    fn row(author_email: Option<&str>) -> CommentRow {
        CommentRow {
            id: 5,
            post_id: 2,
            user_id: 7,
            content: "first".to_string(),
            is_approved: true,
            created: None,
            created_user: Some("reader@example.com".to_string()),
            updated: None,
            updated_user: None,
            deleted: None,
            deleted_user: None,
            author_email: author_email.map(str::to_string),
        }
    }

    #[test]
    fn joined_email_becomes_author_summary() {
        let comment = map_row_to_comment(row(Some("reader@example.com"))).expect("valid row");

        assert_eq!(comment.author, Some(Author::new(7, "reader@example.com")));
    }

    #[test]
    fn missing_user_row_leaves_author_empty() {
        let comment = map_row_to_comment(row(None)).expect("valid row");

        assert_eq!(comment.author, None);
        assert_eq!(comment.user_id, 7);
    }
}
