use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Автор поста или комментария.
pub struct Author {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Email пользователя.
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост в том виде, в каком его отдаёт сервер.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Идентификатор автора.
    pub user_id: i64,
    /// Автор, если он известен серверу.
    #[serde(default)]
    pub user: Option<Author>,
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Уникальный URL-идентификатор.
    pub slug: String,
    /// Ссылка на обложку.
    pub featured_image: Option<String>,
    /// `draft`, `published` или `archived`.
    pub status: String,
    /// Момент первой публикации (UTC).
    pub published_at: Option<DateTime<Utc>>,
    /// Когда создан.
    pub created: Option<DateTime<Utc>>,
    /// Кем создан.
    pub created_user: Option<String>,
    /// Когда изменён в последний раз.
    pub updated: Option<DateTime<Utc>>,
    /// Кем изменён в последний раз.
    pub updated_user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост вместе с видимыми комментариями.
pub struct PostDetail {
    /// Сам пост.
    #[serde(flatten)]
    pub post: Post,
    /// Одобренные комментарии, новые первыми.
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Пост, к которому относится комментарий.
    pub post_id: i64,
    /// Автор комментария.
    pub user_id: i64,
    /// Сведения об авторе, если он известен серверу.
    #[serde(default)]
    pub user: Option<Author>,
    /// Текст.
    pub content: String,
    /// Прошёл ли модерацию.
    pub is_approved: bool,
    /// Когда создан.
    pub created: Option<DateTime<Utc>>,
    /// Кем создан.
    pub created_user: Option<String>,
    /// Когда изменён.
    pub updated: Option<DateTime<Utc>>,
    /// Кем изменён.
    pub updated_user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Страница списка постов.
pub struct PostPage {
    /// Посты текущей страницы.
    pub posts: Vec<Post>,
    /// Всего подходящих постов.
    pub total: i64,
    /// Номер страницы, начиная с 1.
    pub page: u32,
    /// Размер страницы.
    pub per_page: u32,
    /// Номер последней страницы.
    pub last_page: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Фильтры, сортировка и пагинация списка постов.
///
/// Незаданные поля не передаются, и сервер применяет свои значения по умолчанию.
pub struct PostQuery {
    /// Подстрока заголовка или текста.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Фильтр по статусу; без него выдаются только опубликованные посты.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// `published_at`, `created`, `updated` или `title`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// `asc` или `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    /// Номер страницы.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Размер страницы.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
/// Тело запроса на создание или замену поста.
pub struct PostInput {
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Ссылка на обложку.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    /// Статус; при создании по умолчанию `draft`, при замене без него
    /// сохраняется текущий.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
