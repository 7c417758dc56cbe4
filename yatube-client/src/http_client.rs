use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{YatubeClientError, YatubeClientResult};
use crate::models::{AuthResponse, Group, Post, PostDetail, PostPage};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct PostPayloadDto<'a> {
    text: &'a str,
    group: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CreateGroupDto<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<&'a str>,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct PageQuery {
    page: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для JSON API `yatube-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> YatubeClientResult<Self> {
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

    async fn decode_error(response: reqwest::Response) -> YatubeClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .error
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        YatubeClientError::from_http_status(status, Some(message))
    }

    async fn execute(request: RequestBuilder) -> YatubeClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(YatubeClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn fetch<TRes: DeserializeOwned>(request: RequestBuilder) -> YatubeClientResult<TRes> {
        Self::execute(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(YatubeClientError::from_reqwest)
    }

    /// универсальный helper для отправки запросов с json-payload
    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> YatubeClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        Self::fetch(self.request(method, path, token).json(body)).await
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> YatubeClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        self.send_json(Method::POST, "/api/auth/register", &payload, None)
            .await
    }

    pub(crate) async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> YatubeClientResult<AuthResponse> {
        let payload = LoginRequestDto { username, password };
        self.send_json(Method::POST, "/api/auth/login", &payload, None)
            .await
    }

    pub(crate) async fn list_posts(&self, page: u32) -> YatubeClientResult<PostPage> {
        self.list_page("/api/posts", page).await
    }

    pub(crate) async fn group_posts(&self, slug: &str, page: u32) -> YatubeClientResult<PostPage> {
        self.list_page(&format!("/api/groups/{slug}/posts"), page)
            .await
    }

    pub(crate) async fn profile_posts(
        &self,
        username: &str,
        page: u32,
    ) -> YatubeClientResult<PostPage> {
        self.list_page(&format!("/api/profiles/{username}/posts"), page)
            .await
    }

    async fn list_page(&self, path: &str, page: u32) -> YatubeClientResult<PostPage> {
        Self::fetch(
            self.request(Method::GET, path, None)
                .query(&PageQuery { page }),
        )
        .await
    }

    pub(crate) async fn get_post(&self, id: i64) -> YatubeClientResult<PostDetail> {
        Self::fetch(self.request(Method::GET, &format!("/api/posts/{id}"), None)).await
    }

    pub(crate) async fn create_post(
        &self,
        token: &str,
        text: &str,
        group: Option<i64>,
    ) -> YatubeClientResult<Post> {
        let payload = PostPayloadDto { text, group };
        self.send_json(Method::POST, "/api/posts", &payload, Some(token))
            .await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        text: &str,
        group: Option<i64>,
    ) -> YatubeClientResult<Post> {
        let payload = PostPayloadDto { text, group };
        self.send_json(
            Method::PUT,
            &format!("/api/posts/{id}"),
            &payload,
            Some(token),
        )
        .await
    }

    pub(crate) async fn list_groups(&self) -> YatubeClientResult<Vec<Group>> {
        Self::fetch(self.request(Method::GET, "/api/groups", None)).await
    }

    pub(crate) async fn create_group(
        &self,
        token: &str,
        title: &str,
        slug: Option<&str>,
        description: &str,
    ) -> YatubeClientResult<Group> {
        let payload = CreateGroupDto {
            title,
            slug,
            description,
        };
        self.send_json(Method::POST, "/api/groups", &payload, Some(token))
            .await
    }

    pub(crate) async fn delete_group(&self, token: &str, slug: &str) -> YatubeClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/api/groups/{slug}"), Some(token)))
            .await?;
        Ok(())
    }
}
