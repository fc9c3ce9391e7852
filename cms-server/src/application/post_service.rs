use std::sync::Arc;

use tracing::{info, warn};

use crate::data::post_repository::{
    NewPost, Pagination, PostListQuery, PostPatch, PostRepository, PostSortField, RecordScope,
    SortOrder,
};
use crate::domain::audit::AuditFields;
use crate::domain::error::DomainError;
use crate::domain::policy::{can_delete_post, can_mutate_post};
use crate::domain::post::{
    CreatePostRequest, Post, PostStatus, UpdatePostRequest, assign_slug, slugify,
};
use crate::domain::principal::Principal;
use crate::infrastructure::clock::Clock;

const SLUG_ATTEMPTS: u32 = 5;

/// Сырые параметры выборки, как они пришли из запроса.
#[derive(Debug, Clone, Default)]
pub(crate) struct ListPostsParams {
    pub(crate) search: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) sort_by: Option<String>,
    pub(crate) sort_order: Option<String>,
    pub(crate) page: Option<u32>,
    pub(crate) per_page: Option<u32>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPage {
    pub(crate) posts: Vec<Post>,
    pub(crate) total: i64,
    pub(crate) page: u32,
    pub(crate) per_page: u32,
    pub(crate) last_page: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PageLimits {
    pub(crate) default_per_page: u32,
    pub(crate) max_per_page: u32,
}

pub(crate) struct PostService<R: PostRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    limits: PageLimits,
}

impl<R: PostRepository> PostService<R> {
    pub(crate) fn new(repo: R, clock: Arc<dyn Clock>, limits: PageLimits) -> Self {
        Self {
            repo,
            clock,
            limits,
        }
    }

    pub(crate) async fn list_posts(&self, params: ListPostsParams) -> Result<PostPage, DomainError> {
        let query = self.build_list_query(params)?;
        let posts = self.repo.list_posts(&query).await?;
        let total = self.repo.count_posts(&query).await?;

        let per_page = query.pagination.per_page;
        let last_page = u32::try_from((total.max(0) as u64).div_ceil(u64::from(per_page)))
            .unwrap_or(u32::MAX)
            .max(1);

        Ok(PostPage {
            posts,
            total,
            page: query.pagination.page,
            per_page,
            last_page,
        })
    }

    pub(crate) async fn get_post(&self, slug: &str) -> Result<Post, DomainError> {
        self.repo
            .find_post_by_slug(slug, RecordScope::Live)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {slug}")))
    }

    pub(crate) async fn get_live_post(&self, id: i64) -> Result<Post, DomainError> {
        self.repo
            .find_post_by_id(id, RecordScope::Live)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn create_post(
        &self,
        principal: &Principal,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let base = slugify(&req.title);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let occupied = self.repo.slugs_with_base(&base).await?;
            let slug = assign_slug(&req.title, &occupied);
            let now = self.clock.now();

            let mut audit = AuditFields::default();
            audit.stamp_create(&principal.email, now);
            let published_at = (req.status == PostStatus::Published).then_some(now);

            let new_post = NewPost {
                user_id: principal.id,
                title: req.title.clone(),
                content: req.content.clone(),
                slug,
                featured_image: req.featured_image.clone(),
                status: req.status,
                published_at,
                audit,
            };

            match self.repo.create_post(new_post).await {
                Ok(post) => {
                    info!(post_id = post.id, slug = %post.slug, actor = %principal.email, "post created");
                    return Ok(post);
                }
                Err(DomainError::AlreadyExists(resource))
                    if resource == "slug" && attempt < SLUG_ATTEMPTS =>
                {
                    warn!(base = %base, attempt, "slug taken concurrently, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub(crate) async fn update_post(
        &self,
        principal: &Principal,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let mut post = self.get_live_post(post_id).await?;

        if !can_mutate_post(principal, &post) {
            warn!(post_id, actor = %principal.email, "post update denied");
            return Err(DomainError::Forbidden);
        }

        post.apply_update(req, &principal.email, self.clock.now());
        let updated = self
            .repo
            .update_post(post_id, PostPatch::from(&post))
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;

        info!(post_id, status = %updated.status, actor = %principal.email, "post updated");
        Ok(updated)
    }

    pub(crate) async fn delete_post(
        &self,
        principal: &Principal,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let mut post = self.get_live_post(post_id).await?;

        if !can_delete_post(principal, &post) {
            warn!(post_id, actor = %principal.email, "post delete denied");
            return Err(DomainError::Forbidden);
        }

        post.audit.stamp_delete(&principal.email, self.clock.now());
        let deleted = self.repo.soft_delete_post(post_id, &post.audit).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }

        info!(post_id, actor = %principal.email, "post deleted");
        Ok(())
    }

    fn build_list_query(&self, params: ListPostsParams) -> Result<PostListQuery, DomainError> {
        let status = params
            .status
            .as_deref()
            .map(str::parse::<PostStatus>)
            .transpose()?;
        let sort_by = params
            .sort_by
            .as_deref()
            .map(str::parse::<PostSortField>)
            .transpose()?
            .unwrap_or_default();
        let sort_order = params
            .sort_order
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?
            .unwrap_or_default();

        let page = params.page.unwrap_or(1);
        if page == 0 {
            return Err(DomainError::validation("page", "must be >= 1"));
        }
        let per_page = params.per_page.unwrap_or(self.limits.default_per_page);
        if per_page == 0 || per_page > self.limits.max_per_page {
            return Err(DomainError::validation(
                "per_page",
                "must be between 1 and the configured maximum",
            ));
        }

        let search = params
            .search
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty());

        Ok(PostListQuery {
            search,
            status,
            sort_by,
            sort_order,
            pagination: Pagination { page, per_page },
            now: self.clock.now(),
        })
    }
}
