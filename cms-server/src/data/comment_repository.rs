use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::post_repository::RecordScope;
use crate::domain::audit::AuditFields;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) user_id: i64,
    pub(crate) content: String,
    pub(crate) is_approved: bool,
    pub(crate) audit: AuditFields,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentPatch {
    pub(crate) content: String,
    pub(crate) updated: Option<DateTime<Utc>>,
    pub(crate) updated_user: Option<String>,
}

impl From<&Comment> for CommentPatch {
    fn from(comment: &Comment) -> Self {
        Self {
            content: comment.content.clone(),
            updated: comment.audit.updated,
            updated_user: comment.audit.updated_user.clone(),
        }
    }
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn find_comment_by_id(
        &self,
        id: i64,
        scope: RecordScope,
    ) -> Result<Option<Comment>, DomainError>;
    async fn update_comment(
        &self,
        id: i64,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, DomainError>;
    /// Записывает `deleted`/`deleted_user` из уже проштампованных полей аудита.
    async fn soft_delete_comment(&self, id: i64, audit: &AuditFields) -> Result<bool, DomainError>;
    /// Одобренные и не удалённые комментарии поста, новые первыми.
    async fn list_visible_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError>;
}
