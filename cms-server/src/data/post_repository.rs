use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::audit::AuditFields;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStatus};

/// Попадают ли в выборку мягко удалённые записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordScope {
    Live,
    IncludeDeleted,
}

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) user_id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) audit: AuditFields,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) updated: Option<DateTime<Utc>>,
    pub(crate) updated_user: Option<String>,
}

impl From<&Post> for PostPatch {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            featured_image: post.featured_image.clone(),
            status: post.status,
            published_at: post.published_at,
            updated: post.audit.updated,
            updated_user: post.audit.updated_user.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) per_page: u32,
}

impl Pagination {
    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum PostSortField {
    #[default]
    PublishedAt,
    Created,
    Updated,
    Title,
}

impl PostSortField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            PostSortField::PublishedAt => "published_at",
            PostSortField::Created => "created",
            PostSortField::Updated => "updated",
            PostSortField::Title => "title",
        }
    }
}

impl FromStr for PostSortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "published_at" => Ok(PostSortField::PublishedAt),
            "created" => Ok(PostSortField::Created),
            "updated" => Ok(PostSortField::Updated),
            "title" => Ok(PostSortField::Title),
            _ => Err(DomainError::validation(
                "sort_by",
                "must be one of: published_at, created, updated, title",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(DomainError::validation("sort_order", "must be asc or desc")),
        }
    }
}

/// Параметры выборки постов.
///
/// Без `status` выдаются только публично видимые посты (опубликованы и
/// `published_at <= now`). Удалённые посты не попадают в выборку никогда.
#[derive(Debug, Clone)]
pub(crate) struct PostListQuery {
    pub(crate) search: Option<String>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) sort_by: PostSortField,
    pub(crate) sort_order: SortOrder,
    pub(crate) pagination: Pagination,
    pub(crate) now: DateTime<Utc>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn find_post_by_id(
        &self,
        id: i64,
        scope: RecordScope,
    ) -> Result<Option<Post>, DomainError>;
    async fn find_post_by_slug(
        &self,
        slug: &str,
        scope: RecordScope,
    ) -> Result<Option<Post>, DomainError>;
    /// Занятые слаги вида `base` и `base-N`, включая удалённые посты.
    async fn slugs_with_base(&self, base: &str) -> Result<HashSet<String>, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError>;
    /// Записывает `deleted`/`deleted_user` из уже проштампованных полей аудита.
    async fn soft_delete_post(&self, id: i64, audit: &AuditFields) -> Result<bool, DomainError>;
    async fn list_posts(&self, query: &PostListQuery) -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, query: &PostListQuery) -> Result<i64, DomainError>;
}
