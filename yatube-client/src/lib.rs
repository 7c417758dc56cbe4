//! Клиентская библиотека для JSON API `yatube-server`.
//!
//! `YatubeClient` хранит JWT-токен после `register`/`login` и автоматически
//! использует его в защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{YatubeClientError, YatubeClientResult};
pub use models::{AuthResponse, Group, GroupRef, Post, PostDetail, PostPage, User};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент для работы с Yatube по HTTP.
pub struct YatubeClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl YatubeClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> YatubeClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> YatubeClientResult<AuthResponse> {
        let result = self.http_client.register(username, email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Выполняет вход пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(&mut self, username: &str, password: &str) -> YatubeClientResult<AuthResponse> {
        let result = self.http_client.login(username, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Возвращает страницу общей ленты. Номер вне диапазона сервер
    /// приводит к последней странице.
    pub async fn list_posts(&self, page: u32) -> YatubeClientResult<PostPage> {
        self.http_client.list_posts(page).await
    }

    /// Возвращает пост и количество постов его автора.
    pub async fn get_post(&self, id: i64) -> YatubeClientResult<PostDetail> {
        self.http_client.get_post(id).await
    }

    /// Создаёт пост, опционально в сообществе `group`.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(&self, text: &str, group: Option<i64>) -> YatubeClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.create_post(token, text, group).await
    }

    /// Заменяет текст и сообщество поста. Редактировать можно только свои посты.
    ///
    /// Требует установленный JWT-токен.
    pub async fn update_post(
        &self,
        id: i64,
        text: &str,
        group: Option<i64>,
    ) -> YatubeClientResult<Post> {
        let token = self.require_token()?;
        self.http_client.update_post(token, id, text, group).await
    }

    /// Возвращает все сообщества, упорядоченные по названию.
    pub async fn list_groups(&self) -> YatubeClientResult<Vec<Group>> {
        self.http_client.list_groups().await
    }

    /// Создаёт сообщество. Доступно только персоналу.
    pub async fn create_group(
        &self,
        title: &str,
        slug: Option<&str>,
        description: &str,
    ) -> YatubeClientResult<Group> {
        let token = self.require_token()?;
        self.http_client
            .create_group(token, title, slug, description)
            .await
    }

    /// Удаляет сообщество; его посты остаются без сообщества. Доступно только персоналу.
    pub async fn delete_group(&self, slug: &str) -> YatubeClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_group(token, slug).await
    }

    /// Возвращает страницу постов сообщества.
    pub async fn group_posts(&self, slug: &str, page: u32) -> YatubeClientResult<PostPage> {
        self.http_client.group_posts(slug, page).await
    }

    /// Возвращает страницу постов пользователя.
    pub async fn profile_posts(&self, username: &str, page: u32) -> YatubeClientResult<PostPage> {
        self.http_client.profile_posts(username, page).await
    }

    fn require_token(&self) -> YatubeClientResult<&str> {
        self.token.as_deref().ok_or(YatubeClientError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::{YatubeClient, YatubeClientError};

    #[tokio::test]
    async fn writes_without_token_fail_before_any_request() {
        let client = YatubeClient::new("http://127.0.0.1:9").expect("client must build");

        let err = client
            .create_post("text", None)
            .await
            .expect_err("must require token");
        assert!(matches!(err, YatubeClientError::Unauthorized));

        let err = client
            .delete_group("cats")
            .await
            .expect_err("must require token");
        assert!(matches!(err, YatubeClientError::Unauthorized));
    }

    #[test]
    fn token_can_be_set_and_cleared() {
        let mut client = YatubeClient::new("http://127.0.0.1:8080").expect("client must build");
        assert!(client.get_token().is_none());

        client.set_token("abc");
        assert_eq!(client.get_token(), Some("abc"));

        client.clear_token();
        assert!(client.get_token().is_none());
    }
}
