use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{CmsClientError, CmsClientResult};
use crate::models::{Comment, Post, PostDetail, PostInput, PostPage, PostQuery};

#[derive(Debug, Serialize)]
struct CommentBodyDto<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для REST API `cms-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> CmsClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> CmsClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error,
            Err(_) => None,
        };
        CmsClientError::from_http_status(status, message)
    }

    async fn execute(request: RequestBuilder) -> CmsClientResult<reqwest::Response> {
        let response = request.send().await.map_err(CmsClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn execute_json<T: DeserializeOwned>(request: RequestBuilder) -> CmsClientResult<T> {
        Self::execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(CmsClientError::from_reqwest)
    }

    pub(crate) async fn list_posts(&self, query: &PostQuery) -> CmsClientResult<PostPage> {
        Self::execute_json(self.request(Method::GET, "/api/posts", None).query(query)).await
    }

    pub(crate) async fn get_post(&self, slug: &str) -> CmsClientResult<PostDetail> {
        Self::execute_json(self.request(Method::GET, &format!("/api/posts/{slug}"), None)).await
    }

    pub(crate) async fn create_post(
        &self,
        token: &str,
        input: &PostInput,
    ) -> CmsClientResult<Post> {
        Self::execute_json(
            self.request(Method::POST, "/api/posts", Some(token))
                .json(input),
        )
        .await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        input: &PostInput,
    ) -> CmsClientResult<Post> {
        Self::execute_json(
            self.request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
                .json(input),
        )
        .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> CmsClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(token)))
            .await?;
        Ok(())
    }

    pub(crate) async fn list_comments(&self, post_id: i64) -> CmsClientResult<Vec<Comment>> {
        Self::execute_json(self.request(
            Method::GET,
            &format!("/api/posts/{post_id}/comments"),
            None,
        ))
        .await
    }

    pub(crate) async fn create_comment(
        &self,
        token: &str,
        post_id: i64,
        content: &str,
    ) -> CmsClientResult<Comment> {
        Self::execute_json(
            self.request(
                Method::POST,
                &format!("/api/posts/{post_id}/comments"),
                Some(token),
            )
            .json(&CommentBodyDto { content }),
        )
        .await
    }

    pub(crate) async fn update_comment(
        &self,
        token: &str,
        id: i64,
        content: &str,
    ) -> CmsClientResult<Comment> {
        Self::execute_json(
            self.request(Method::PUT, &format!("/api/comments/{id}"), Some(token))
                .json(&CommentBodyDto { content }),
        )
        .await
    }

    pub(crate) async fn delete_comment(&self, token: &str, id: i64) -> CmsClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/api/comments/{id}"), Some(token)))
            .await?;
        Ok(())
    }
}
