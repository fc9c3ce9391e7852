//! In-memory реализации репозиториев для тестов сервисов.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::data::comment_repository::{CommentPatch, CommentRepository, NewComment};
use crate::data::post_repository::{
    NewPost, PostListQuery, PostPatch, PostRepository, PostSortField, RecordScope, SortOrder,
};
use crate::domain::audit::AuditFields;
use crate::domain::author::Author;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::infrastructure::clock::Clock;

pub(crate) fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0)
        .single()
        .expect("valid timestamp")
}

#[derive(Clone)]
pub(crate) struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub(crate) fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock mutex poisoned") = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryPosts {
    pub(crate) posts: Arc<Mutex<Vec<Post>>>,
    /// Сколько ближайших вставок отклонить как гонку за слаг.
    pub(crate) slug_conflicts: Arc<Mutex<u32>>,
}

impl InMemoryPosts {
    pub(crate) fn snapshot(&self, id: i64) -> Option<Post> {
        self.posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .find(|post| post.id == id)
            .cloned()
    }

    fn matches_filters(post: &Post, query: &PostListQuery) -> bool {
        if post.is_deleted() {
            return false;
        }
        let status_ok = match query.status {
            Some(status) => post.status == status,
            None => post.is_publicly_visible(query.now),
        };
        let search_ok = query.search.as_deref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            post.title.to_lowercase().contains(&needle)
                || post.content.to_lowercase().contains(&needle)
        });
        status_ok && search_ok
    }

    /// Как `ORDER BY ... NULLS LAST, id` в postgres: пустые значения в конце
    /// при любом направлении.
    fn compare(a: &Post, b: &Post, sort_by: PostSortField, order: SortOrder) -> Ordering {
        let directed = |ordering: Ordering| match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        let primary = match sort_by {
            PostSortField::PublishedAt => nulls_last(a.published_at, b.published_at, directed),
            PostSortField::Created => nulls_last(a.audit.created, b.audit.created, directed),
            PostSortField::Updated => nulls_last(a.audit.updated, b.audit.updated, directed),
            PostSortField::Title => directed(a.title.cmp(&b.title)),
        };
        primary.then_with(|| directed(a.id.cmp(&b.id)))
    }
}

fn nulls_last<T: Ord>(
    a: Option<T>,
    b: Option<T>,
    directed: impl Fn(Ordering) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl PostRepository for InMemoryPosts {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        {
            let mut conflicts = self
                .slug_conflicts
                .lock()
                .expect("slug_conflicts mutex poisoned");
            if *conflicts > 0 {
                *conflicts -= 1;
                return Err(DomainError::AlreadyExists("slug".to_string()));
            }
        }

        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        if posts.iter().any(|post| post.slug == input.slug) {
            return Err(DomainError::AlreadyExists("slug".to_string()));
        }
        let id = posts.len() as i64 + 1;
        let author = input
            .audit
            .created_user
            .clone()
            .map(|email| Author::new(input.user_id, email));
        let post = Post::new(
            id,
            input.user_id,
            input.title,
            input.content,
            input.slug,
            input.status,
        )?
        .with_featured_image(input.featured_image)
        .with_published_at(input.published_at)
        .with_audit(input.audit)
        .with_author(author);
        posts.push(post.clone());
        Ok(post)
    }

    async fn find_post_by_id(
        &self,
        id: i64,
        scope: RecordScope,
    ) -> Result<Option<Post>, DomainError> {
        Ok(self
            .snapshot(id)
            .filter(|post| scope == RecordScope::IncludeDeleted || !post.is_deleted()))
    }

    async fn find_post_by_slug(
        &self,
        slug: &str,
        scope: RecordScope,
    ) -> Result<Option<Post>, DomainError> {
        Ok(self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .find(|post| post.slug == slug)
            .filter(|post| scope == RecordScope::IncludeDeleted || !post.is_deleted())
            .cloned())
    }

    async fn slugs_with_base(&self, base: &str) -> Result<HashSet<String>, DomainError> {
        let prefix = format!("{base}-");
        Ok(self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .filter(|post| post.slug == base || post.slug.starts_with(&prefix))
            .map(|post| post.slug.clone())
            .collect())
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let Some(post) = posts
            .iter_mut()
            .find(|post| post.id == id && !post.is_deleted())
        else {
            return Ok(None);
        };
        post.title = patch.title;
        post.content = patch.content;
        post.featured_image = patch.featured_image;
        post.status = patch.status;
        post.published_at = post.published_at.or(patch.published_at);
        post.audit.updated = patch.updated;
        post.audit.updated_user = patch.updated_user;
        Ok(Some(post.clone()))
    }

    async fn soft_delete_post(&self, id: i64, audit: &AuditFields) -> Result<bool, DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        match posts
            .iter_mut()
            .find(|post| post.id == id && !post.is_deleted())
        {
            Some(post) => {
                post.audit.deleted = audit.deleted;
                post.audit.deleted_user = audit.deleted_user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_posts(&self, query: &PostListQuery) -> Result<Vec<Post>, DomainError> {
        let mut matching: Vec<Post> = self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .filter(|post| Self::matches_filters(post, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| Self::compare(a, b, query.sort_by, query.sort_order));

        let offset = usize::try_from(query.pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.pagination.limit()).unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_posts(&self, query: &PostListQuery) -> Result<i64, DomainError> {
        Ok(self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .filter(|post| Self::matches_filters(post, query))
            .count() as i64)
    }
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryComments {
    pub(crate) comments: Arc<Mutex<Vec<Comment>>>,
}

impl InMemoryComments {
    pub(crate) fn snapshot(&self, id: i64) -> Option<Comment> {
        self.comments
            .lock()
            .expect("comments mutex poisoned")
            .iter()
            .find(|comment| comment.id == id)
            .cloned()
    }
}

#[async_trait]
impl CommentRepository for InMemoryComments {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut comments = self.comments.lock().expect("comments mutex poisoned");
        let id = comments.len() as i64 + 1;
        let author = input
            .audit
            .created_user
            .clone()
            .map(|email| Author::new(input.user_id, email));
        let comment = Comment::new(
            id,
            input.post_id,
            input.user_id,
            input.content,
            input.is_approved,
        )?
        .with_audit(input.audit)
        .with_author(author);
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment_by_id(
        &self,
        id: i64,
        scope: RecordScope,
    ) -> Result<Option<Comment>, DomainError> {
        Ok(self
            .snapshot(id)
            .filter(|comment| scope == RecordScope::IncludeDeleted || !comment.is_deleted()))
    }

    async fn update_comment(
        &self,
        id: i64,
        patch: CommentPatch,
    ) -> Result<Option<Comment>, DomainError> {
        let mut comments = self.comments.lock().expect("comments mutex poisoned");
        let Some(comment) = comments
            .iter_mut()
            .find(|comment| comment.id == id && !comment.is_deleted())
        else {
            return Ok(None);
        };
        comment.content = patch.content;
        comment.audit.updated = patch.updated;
        comment.audit.updated_user = patch.updated_user;
        Ok(Some(comment.clone()))
    }

    async fn soft_delete_comment(&self, id: i64, audit: &AuditFields) -> Result<bool, DomainError> {
        let mut comments = self.comments.lock().expect("comments mutex poisoned");
        match comments
            .iter_mut()
            .find(|comment| comment.id == id && !comment.is_deleted())
        {
            Some(comment) => {
                comment.audit.deleted = audit.deleted;
                comment.audit.deleted_user = audit.deleted_user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_visible_comments(&self, post_id: i64) -> Result<Vec<Comment>, DomainError> {
        let mut visible: Vec<Comment> = self
            .comments
            .lock()
            .expect("comments mutex poisoned")
            .iter()
            .filter(|comment| comment.post_id == post_id && comment.is_publicly_visible())
            .cloned()
            .collect();
        visible.sort_by(|a, b| {
            b.audit
                .created
                .cmp(&a.audit.created)
                .then(b.id.cmp(&a.id))
        });
        Ok(visible)
    }
}
