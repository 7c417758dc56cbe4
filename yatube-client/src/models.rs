use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Дата и время регистрации (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Время жизни токена в секундах.
    pub expires_in: i64,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Краткая ссылка на сообщество внутри поста.
pub struct GroupRef {
    /// Идентификатор сообщества.
    pub id: i64,
    /// Slug сообщества.
    pub slug: String,
    /// Название сообщества.
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Текст поста.
    pub text: String,
    /// Дата публикации (UTC).
    pub pub_date: DateTime<Utc>,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Логин автора.
    pub author: String,
    /// Сообщество, если пост к нему привязан.
    pub group: Option<GroupRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост вместе с количеством постов его автора.
pub struct PostDetail {
    /// Пост.
    pub post: Post,
    /// Сколько всего постов у автора.
    pub author_post_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Одна страница ленты постов.
pub struct PostPage {
    /// Посты на странице, новые первыми.
    pub posts: Vec<Post>,
    /// Номер страницы после нормализации сервером.
    pub page: u32,
    /// Всего страниц.
    pub num_pages: u32,
    /// Размер страницы.
    pub per_page: u32,
    /// Общее количество постов в ленте.
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Сообщество.
pub struct Group {
    /// Идентификатор.
    pub id: i64,
    /// Slug, используется в URL.
    pub slug: String,
    /// Название.
    pub title: String,
    /// Описание.
    pub description: String,
}
