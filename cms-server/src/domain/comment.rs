use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audit::AuditFields;
use super::author::Author;
use super::error::DomainError;

const CONTENT_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) user_id: i64,
    pub(crate) content: String,
    pub(crate) is_approved: bool,
    pub(crate) audit: AuditFields,
    pub(crate) author: Option<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateCommentRequest {
    pub(crate) content: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdateCommentRequest {
    pub(crate) content: String,
}

impl UpdateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content)?,
        })
    }
}

impl Comment {
    pub(crate) fn new(
        id: i64,
        post_id: i64,
        user_id: i64,
        content: impl Into<String>,
        is_approved: bool,
    ) -> Result<Self, DomainError> {
        for (field, value) in [("id", id), ("post_id", post_id), ("user_id", user_id)] {
            if value <= 0 {
                return Err(DomainError::validation(field, "must be > 0"));
            }
        }
        let content = normalize_content(&content.into())?;

        Ok(Self {
            id,
            post_id,
            user_id,
            content,
            is_approved,
            audit: AuditFields::default(),
            author: None,
        })
    }

    pub(crate) fn with_audit(mut self, audit: AuditFields) -> Self {
        self.audit = audit;
        self
    }

    pub(crate) fn with_author(mut self, author: Option<Author>) -> Self {
        self.author = author;
        self
    }

    pub(crate) fn apply_update(
        &mut self,
        req: UpdateCommentRequest,
        actor: &str,
        now: DateTime<Utc>,
    ) {
        self.content = req.content;
        self.audit.stamp_update(actor, now);
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.audit.is_deleted()
    }

    pub(crate) fn is_publicly_visible(&self) -> bool {
        self.is_approved && !self.is_deleted()
    }
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > CONTENT_MAX_CHARS {
        return Err(DomainError::validation("content", "must be 1..1000 chars"));
    }
    Ok(content.to_string())
}
