//! Клиентская библиотека для REST API `cms-server`.
//!
//! `CmsClient` покрывает все операции с постами и комментариями. Токен
//! выпускает внешний сервис аутентификации; клиент лишь хранит его и
//! подставляет в защищённые запросы.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{CmsClientError, CmsClientResult};
pub use models::{Author, Comment, Post, PostDetail, PostInput, PostPage, PostQuery};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент CMS поверх HTTP.
pub struct CmsClient {
    http: HttpClient,
    token: Option<String>,
}

impl CmsClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> CmsClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает bearer-токен.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий токен, если он установлен.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Возвращает страницу постов.
    pub async fn list_posts(&self, query: &PostQuery) -> CmsClientResult<PostPage> {
        self.http.list_posts(query).await
    }

    /// Возвращает пост по слагу вместе с видимыми комментариями.
    pub async fn get_post(&self, slug: &str) -> CmsClientResult<PostDetail> {
        self.http.get_post(slug).await
    }

    /// Создаёт пост. Требует токен.
    pub async fn create_post(&self, input: &PostInput) -> CmsClientResult<Post> {
        let token = self.require_token()?;
        self.http.create_post(token, input).await
    }

    /// Заменяет содержимое поста. Требует токен.
    pub async fn update_post(&self, id: i64, input: &PostInput) -> CmsClientResult<Post> {
        let token = self.require_token()?;
        self.http.update_post(token, id, input).await
    }

    /// Мягко удаляет пост. Требует токен.
    pub async fn delete_post(&self, id: i64) -> CmsClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, id).await
    }

    /// Возвращает одобренные комментарии поста, новые первыми.
    pub async fn list_comments(&self, post_id: i64) -> CmsClientResult<Vec<Comment>> {
        self.http.list_comments(post_id).await
    }

    /// Добавляет комментарий к посту. Требует токен.
    pub async fn create_comment(&self, post_id: i64, content: &str) -> CmsClientResult<Comment> {
        let token = self.require_token()?;
        self.http.create_comment(token, post_id, content).await
    }

    /// Меняет текст комментария. Требует токен.
    pub async fn update_comment(&self, id: i64, content: &str) -> CmsClientResult<Comment> {
        let token = self.require_token()?;
        self.http.update_comment(token, id, content).await
    }

    /// Мягко удаляет комментарий. Требует токен.
    pub async fn delete_comment(&self, id: i64) -> CmsClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_comment(token, id).await
    }

    fn require_token(&self) -> CmsClientResult<&str> {
        self.token.as_deref().ok_or(CmsClientError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::{CmsClient, CmsClientError, PostInput};

    #[tokio::test]
    async fn protected_calls_fail_fast_without_token() {
        let client = CmsClient::new("http://127.0.0.1:9").expect("client must build");
        let input = PostInput {
            title: "t".to_string(),
            content: "c".to_string(),
            featured_image: None,
            status: None,
        };

        let err = client
            .create_post(&input)
            .await
            .expect_err("missing token must fail");
        assert!(matches!(err, CmsClientError::Unauthenticated));

        let err = client
            .delete_comment(1)
            .await
            .expect_err("missing token must fail");
        assert!(matches!(err, CmsClientError::Unauthenticated));
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let mut client = CmsClient::new("http://127.0.0.1:8080").expect("client must build");
        assert!(client.token().is_none());

        client.set_token("abc");
        assert_eq!(client.token(), Some("abc"));

        client.clear_token();
        assert!(client.token().is_none());
    }
}
