use std::sync::Arc;

use tracing::{info, warn};

use crate::data::comment_repository::{CommentPatch, CommentRepository, NewComment};
use crate::data::post_repository::{PostRepository, RecordScope};
use crate::domain::audit::AuditFields;
use crate::domain::comment::{Comment, CreateCommentRequest, UpdateCommentRequest};
use crate::domain::error::DomainError;
use crate::domain::policy::{can_delete_comment, can_mutate_comment};
use crate::domain::post::Post;
use crate::domain::principal::Principal;
use crate::infrastructure::clock::Clock;

/// Комментарии доступны только через живой (не удалённый) пост.
pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
    clock: Arc<dyn Clock>,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            comments,
            posts,
            clock,
        }
    }

    pub(crate) async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        self.live_post(post_id).await?;
        let mut comments = self.comments.list_visible_comments(post_id).await?;
        comments.retain(Comment::is_publicly_visible);
        Ok(comments)
    }

    pub(crate) async fn create_comment(
        &self,
        principal: &Principal,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        self.live_post(post_id).await?;

        let mut audit = AuditFields::default();
        audit.stamp_create(&principal.email, self.clock.now());

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id,
                user_id: principal.id,
                content: req.content,
                is_approved: true,
                audit,
            })
            .await?;

        info!(comment_id = comment.id, post_id, actor = %principal.email, "comment created");
        Ok(comment)
    }

    pub(crate) async fn update_comment(
        &self,
        principal: &Principal,
        comment_id: i64,
        req: UpdateCommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        let mut comment = self.live_comment(comment_id).await?;
        self.live_post(comment.post_id).await?;

        if !can_mutate_comment(principal, &comment) {
            warn!(comment_id, actor = %principal.email, "comment update denied");
            return Err(DomainError::Forbidden);
        }

        comment.apply_update(req, &principal.email, self.clock.now());
        let updated = self
            .comments
            .update_comment(comment_id, CommentPatch::from(&comment))
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;

        info!(comment_id, actor = %principal.email, "comment updated");
        Ok(updated)
    }

    pub(crate) async fn delete_comment(
        &self,
        principal: &Principal,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let mut comment = self.live_comment(comment_id).await?;
        // Родителя читаем вместе с удалёнными: его состояние влияет на права.
        let parent = self
            .posts
            .find_post_by_id(comment.post_id, RecordScope::IncludeDeleted)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {}", comment.post_id)))?;

        if !can_delete_comment(principal, &comment, &parent) {
            warn!(comment_id, actor = %principal.email, "comment delete denied");
            return Err(DomainError::Forbidden);
        }

        comment.audit.stamp_delete(&principal.email, self.clock.now());
        let deleted = self
            .comments
            .soft_delete_comment(comment_id, &comment.audit)
            .await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }

        info!(comment_id, post_id = comment.post_id, actor = %principal.email, "comment deleted");
        Ok(())
    }

    async fn live_post(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_post_by_id(post_id, RecordScope::Live)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }

    async fn live_comment(&self, comment_id: i64) -> Result<Comment, DomainError> {
        self.comments
            .find_comment_by_id(comment_id, RecordScope::Live)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))
    }
}
