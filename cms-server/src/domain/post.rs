use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audit::AuditFields;
use super::author::Author;
use super::error::DomainError;

const FALLBACK_SLUG: &str = "post";
const FEATURED_IMAGE_MAX_CHARS: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            _ => Err(DomainError::validation(
                "status",
                "must be one of: draft, published, archived",
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) audit: AuditFields,
    pub(crate) author: Option<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) featured_image: Option<String>,
    pub(crate) status: PostStatus,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            featured_image: normalize_featured_image(self.featured_image)?,
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) featured_image: Option<String>,
    /// `None` оставляет текущий статус.
    pub(crate) status: Option<PostStatus>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            featured_image: normalize_featured_image(self.featured_image)?,
            status: self.status,
        })
    }
}

impl Post {
    pub(crate) fn new(
        id: i64,
        user_id: i64,
        title: impl Into<String>,
        content: impl Into<String>,
        slug: impl Into<String>,
        status: PostStatus,
    ) -> Result<Self, DomainError> {
        validate_positive_i64("id", id)?;
        validate_positive_i64("user_id", user_id)?;
        let title = normalize_title(&title.into())?;
        let content = normalize_content(&content.into())?;
        let slug = slug.into();
        if slug.is_empty() {
            return Err(DomainError::validation("slug", "must not be empty"));
        }

        Ok(Self {
            id,
            user_id,
            title,
            content,
            slug,
            featured_image: None,
            status,
            published_at: None,
            audit: AuditFields::default(),
            author: None,
        })
    }

    pub(crate) fn with_featured_image(mut self, featured_image: Option<String>) -> Self {
        self.featured_image = featured_image;
        self
    }

    pub(crate) fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    pub(crate) fn with_audit(mut self, audit: AuditFields) -> Self {
        self.audit = audit;
        self
    }

    pub(crate) fn with_author(mut self, author: Option<Author>) -> Self {
        self.author = author;
        self
    }

    /// `published_at` ставится один раз, при первом переходе в `published`.
    pub(crate) fn transition_status(&mut self, new_status: PostStatus, now: DateTime<Utc>) {
        if new_status == PostStatus::Published
            && self.status != PostStatus::Published
            && self.published_at.is_none()
        {
            self.published_at = Some(now);
        }
        self.status = new_status;
    }

    pub(crate) fn apply_update(
        &mut self,
        req: UpdatePostRequest,
        actor: &str,
        now: DateTime<Utc>,
    ) {
        self.title = req.title;
        self.content = req.content;
        self.featured_image = req.featured_image;
        if let Some(status) = req.status {
            self.transition_status(status, now);
        }
        self.audit.stamp_update(actor, now);
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.audit.is_deleted()
    }

    // Тот же предикат в SQL: `push_list_filters` в postgres/post_repository.rs.
    #[cfg(test)]
    pub(crate) fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.status == PostStatus::Published
            && self.published_at.is_some_and(|published_at| published_at <= now)
            && !self.is_deleted()
    }
}

pub(crate) fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }
    slug
}

/// Предлагает слаг, которого нет в `existing_slugs`: `base`, затем `base-1`, `base-2`, ...
///
/// Окончательную уникальность гарантирует ограничение `posts_slug_key` в БД.
pub(crate) fn assign_slug(title: &str, existing_slugs: &HashSet<String>) -> String {
    let base = slugify(title);
    if !existing_slugs.contains(&base) {
        return base;
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{base}-{suffix}");
        if !existing_slugs.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(field, "must be > 0"));
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::validation("title", "must be 1..255 chars"));
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::validation("content", "must not be empty"));
    }
    Ok(content.to_string())
}

fn normalize_featured_image(value: Option<String>) -> Result<Option<String>, DomainError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > FEATURED_IMAGE_MAX_CHARS {
        return Err(DomainError::validation(
            "featured_image",
            "must be at most 2048 chars",
        ));
    }
    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    use super::{
        CreatePostRequest, DomainError, Post, PostStatus, UpdatePostRequest, assign_slug, slugify,
    };

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            content: "valid content".to_string(),
            featured_image: None,
            status: PostStatus::Draft,
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn update_post_request_validate_rejects_empty_content() {
        let req = UpdatePostRequest {
            title: "valid title".to_string(),
            content: "   ".to_string(),
            featured_image: None,
            status: Some(PostStatus::Draft),
        };

        let err = req.validate().expect_err("content must be rejected");
        assert_validation_field(err, "content");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            content: "  content  ".to_string(),
            featured_image: Some("   ".to_string()),
            status: PostStatus::Published,
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.content, "content");
        assert_eq!(validated.featured_image, None);
    }

    #[test]
    fn status_parsing_rejects_unknown_values() {
        assert_eq!(
            "published".parse::<PostStatus>().expect("known status"),
            PostStatus::Published
        );
        let err = "deleted"
            .parse::<PostStatus>()
            .expect_err("unknown status must fail");
        assert_validation_field(err, "status");
    }

    #[test]
    fn post_new_rejects_non_positive_user_id() {
        let err = Post::new(1, 0, "Title", "Content", "title", PostStatus::Draft)
            .expect_err("user_id must be > 0");
        assert_validation_field(err, "user_id");
    }

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust -- and_Axum!  "), "rust-and-axum");
        assert_eq!(slugify("Don't Panic"), "dont-panic");
    }

    #[test]
    fn slugify_falls_back_when_nothing_is_left() {
        assert_eq!(slugify("テスト投稿タイトル"), "post");
        assert_eq!(slugify("!!!"), "post");
    }

    #[test]
    fn assign_slug_appends_increasing_suffix() {
        let mut existing = HashSet::new();
        assert_eq!(assign_slug("Hello World", &existing), "hello-world");

        existing.insert("hello-world".to_string());
        assert_eq!(assign_slug("Hello World", &existing), "hello-world-1");

        existing.insert("hello-world-1".to_string());
        existing.insert("hello-world-2".to_string());
        assert_eq!(assign_slug("Hello World", &existing), "hello-world-3");
    }

    #[test]
    fn publishing_stamps_transition_time_not_creation_time() {
        let created = ts(1_000);
        let published = ts(5_000);
        let mut post = sample_post(PostStatus::Draft);
        post.audit.stamp_create("alice@example.com", created);
        assert_eq!(post.published_at, None);

        post.transition_status(PostStatus::Published, published);

        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.published_at, Some(published));
    }

    #[test]
    fn republishing_keeps_original_published_at() {
        let first = ts(1_000);
        let mut post = sample_post(PostStatus::Draft);
        post.transition_status(PostStatus::Published, first);

        post.transition_status(PostStatus::Published, first + Duration::days(1));
        assert_eq!(post.published_at, Some(first));

        post.transition_status(PostStatus::Archived, first + Duration::days(2));
        post.transition_status(PostStatus::Published, first + Duration::days(3));
        assert_eq!(post.published_at, Some(first));
    }

    #[test]
    fn apply_update_stamps_actor_and_keeps_slug() {
        let mut post = sample_post(PostStatus::Draft);
        post.audit.stamp_create("alice@example.com", ts(1_000));

        post.apply_update(
            UpdatePostRequest {
                title: "Renamed".to_string(),
                content: "new body".to_string(),
                featured_image: Some("/img/cover.png".to_string()),
                status: Some(PostStatus::Draft),
            },
            "admin@example.com",
            ts(2_000),
        );

        assert_eq!(post.title, "Renamed");
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.featured_image.as_deref(), Some("/img/cover.png"));
        assert_eq!(post.audit.created_user.as_deref(), Some("alice@example.com"));
        assert_eq!(post.audit.updated_user.as_deref(), Some("admin@example.com"));
        assert_eq!(post.audit.updated, Some(ts(2_000)));
    }

    #[test]
    fn apply_update_without_status_keeps_current_status() {
        let published = ts(1_000);
        let mut post = sample_post(PostStatus::Draft);
        post.transition_status(PostStatus::Published, published);

        post.apply_update(
            UpdatePostRequest {
                title: "Edited".to_string(),
                content: "body".to_string(),
                featured_image: None,
                status: None,
            },
            "alice@example.com",
            ts(2_000),
        );

        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.published_at, Some(published));
        assert_eq!(post.title, "Edited");
    }

    #[test]
    fn public_visibility_requires_published_past_and_live() {
        let now = ts(10_000);

        let draft = sample_post(PostStatus::Draft);
        assert!(!draft.is_publicly_visible(now));

        let scheduled = sample_post(PostStatus::Published).with_published_at(Some(ts(20_000)));
        assert!(!scheduled.is_publicly_visible(now));

        let mut live = sample_post(PostStatus::Published).with_published_at(Some(ts(5_000)));
        assert!(live.is_publicly_visible(now));

        live.audit.stamp_delete("alice@example.com", now);
        assert!(!live.is_publicly_visible(now));
    }

    proptest! {
        #[test]
        fn assign_slug_never_repeats_under_collision(title in "\\PC{0,64}") {
            let mut existing = HashSet::new();
            let first = assign_slug(&title, &existing);
            existing.insert(first.clone());
            let second = assign_slug(&title, &existing);

            prop_assert_ne!(&first, &second);
            prop_assert!(second.starts_with(&first));
        }

        #[test]
        fn slugify_output_is_url_safe(title in "\\PC{0,64}") {
            let slug = slugify(&title);

            prop_assert!(!slug.is_empty());
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn repeated_publish_is_idempotent(offsets in proptest::collection::vec(0i64..100_000, 1..8)) {
            let first = ts(1_000);
            let mut post = sample_post(PostStatus::Draft);
            post.transition_status(PostStatus::Published, first);

            for offset in offsets {
                post.transition_status(PostStatus::Published, first + Duration::seconds(offset));
            }

            prop_assert_eq!(post.published_at, Some(first));
        }
    }

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().expect("valid ts")
    }

    fn sample_post(status: PostStatus) -> Post {
        Post::new(1, 10, "Hello World", "Content", "hello-world", status)
            .expect("sample post must be valid")
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
