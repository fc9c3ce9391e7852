use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::comments::{AuthorDto, CommentBodyDto, CommentDto};
use crate::presentation::http::handlers::health::HealthDto;
use crate::presentation::http::handlers::posts::{
    CreatePostDto, PostDetailDto, PostDto, PostPageDto, UpdatePostDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::comments::list_comments,
        crate::presentation::http::handlers::comments::create_comment,
        crate::presentation::http::handlers::comments::update_comment,
        crate::presentation::http::handlers::comments::delete_comment
    ),
    components(
        schemas(
            HealthDto,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            PostDetailDto,
            PostPageDto,
            CommentBodyDto,
            CommentDto,
            AuthorDto
        )
    ),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "posts", description = "Post endpoints"),
        (name = "comments", description = "Comment endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthz",
            "/api/posts",
            "/api/posts/{slug}",
            "/api/posts/{id}",
            "/api/posts/{id}/comments",
            "/api/comments/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components must be present");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("AuthorDto"));
    }
}
