use axum::{Json, Router, middleware, routing::get};
use serde::Serialize;

use crate::presentation::AppState;
use crate::presentation::http::handlers::pages::not_found;
use crate::presentation::http::middleware::auth::resolve_caller;

pub(crate) mod api;
pub(crate) mod pages;

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}

/// HTML site and JSON API with the caller resolved for every request.
pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .merge(pages::router())
        .nest("/api", api::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_caller))
        .route("/healthz", get(health_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, Response, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::routes;
    use crate::data::repositories::memory::MemoryStore;
    use crate::domain::user::{Identity, User};
    use crate::infrastructure::jwt::JwtService;
    use crate::presentation::AppState;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn app(store: &MemoryStore) -> Router {
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            JwtService::new(SECRET, 3600),
            vec!["admin".to_string()],
            false,
        );
        routes(state)
    }

    fn token_for(user: &User) -> String {
        JwtService::new(SECRET, 3600)
            .issue(&Identity::from(user))
            .expect("token must be issued")
    }

    fn form_body(fields: &[(&str, &str)]) -> Body {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        Body::from(encoded)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("access_token={token}"));
        }
        builder.body(Body::empty()).expect("request must build")
    }

    fn post_form(uri: &str, token: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("access_token={token}"));
        }
        builder.body(form_body(fields)).expect("request must build")
    }

    fn api_json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder
            .body(Body::from(body.to_string()))
            .expect("request must build")
    }

    fn location(response: &Response<Body>) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("redirect must carry a location")
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body must be readable")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("body must be utf-8")
    }

    async fn body_json(response: Response<Body>) -> Value {
        serde_json::from_str(&body_text(response).await).expect("body must be json")
    }

    #[tokio::test]
    async fn created_post_shows_up_on_every_page() {
        let store = MemoryStore::new();
        let user = store.seed_user("user");
        let group = store.seed_group("Тестовая группа", "test-slug", "Тестовое описание");
        let token = token_for(&user);
        let group_id = group.id.to_string();

        let response = app(&store)
            .oneshot(post_form(
                "/create/",
                Some(&token),
                &[("text", "Тестовый пост"), ("group", &group_id)],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/profile/user/");
        assert_eq!(store.post_count(), 1);

        let listing = app(&store).oneshot(get("/", None)).await.unwrap();
        assert_eq!(listing.status(), StatusCode::OK);
        assert!(body_text(listing).await.contains("Тестовый пост"));

        let post_id = {
            let json = body_json(
                app(&store)
                    .oneshot(get("/api/posts", None))
                    .await
                    .unwrap(),
            )
            .await;
            json["posts"][0]["id"].as_i64().expect("post id")
        };

        for uri in [
            format!("/posts/{post_id}/"),
            "/group/test-slug/".to_string(),
            "/profile/user/".to_string(),
        ] {
            let response = app(&store).oneshot(get(&uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert!(body_text(response).await.contains("Тестовый пост"), "{uri}");
        }
    }

    #[tokio::test]
    async fn anonymous_writes_redirect_to_login() {
        let store = MemoryStore::new();
        let author = store.seed_user("auth");
        let post = store.seed_post(&author, "text", None);

        let response = app(&store).oneshot(get("/create/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/auth/login/?next=/create/");

        let response = app(&store)
            .oneshot(post_form("/create/", None, &[("text", "text")]))
            .await
            .unwrap();
        assert_eq!(location(&response), "/auth/login/?next=/create/");
        assert_eq!(store.post_count(), 1);

        let edit = format!("/posts/{}/edit/", post.id);
        let response = app(&store).oneshot(get(&edit, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), format!("/auth/login/?next={edit}"));
    }

    #[tokio::test]
    async fn login_redirect_keeps_requested_query_string() {
        let store = MemoryStore::new();
        let author = store.seed_user("auth");
        let post = store.seed_post(&author, "text", None);

        let response = app(&store)
            .oneshot(get("/create/?group=1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/auth/login/?next=/create/%3Fgroup%3D1");

        let edit = format!("/posts/{}/edit/?page=2", post.id);
        let response = app(&store)
            .oneshot(post_form(&edit, None, &[("text", "changed")]))
            .await
            .unwrap();
        assert_eq!(
            location(&response),
            format!("/auth/login/?next=/posts/{}/edit/%3Fpage%3D2", post.id)
        );
    }

    #[tokio::test]
    async fn non_author_edit_redirects_to_detail_without_changes() {
        let store = MemoryStore::new();
        let author = store.seed_user("auth");
        let stranger = store.seed_user("not_auth");
        let post = store.seed_post(&author, "Тестовый пост", None);
        let token = token_for(&stranger);
        let edit = format!("/posts/{}/edit/", post.id);

        let response = app(&store)
            .oneshot(post_form(&edit, Some(&token), &[("text", "Взлом")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), format!("/posts/{}/", post.id));
        assert_eq!(
            store.post(post.id).expect("post must exist").text,
            "Тестовый пост"
        );
    }

    #[tokio::test]
    async fn invalid_form_is_re_rendered_with_errors() {
        let store = MemoryStore::new();
        let user = store.seed_user("user");
        let token = token_for(&user);

        let response = app(&store)
            .oneshot(post_form("/create/", Some(&token), &[("text", " ")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Обязательное поле."));
        assert_eq!(store.post_count(), 0);
    }

    #[tokio::test]
    async fn unknown_pages_are_404() {
        let store = MemoryStore::new();

        for uri in ["/group/missing/", "/profile/nobody/", "/posts/1/", "/posts/abc/", "/nowhere/"] {
            let response = app(&store).oneshot(get(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn api_pagination_clamps_to_last_page() {
        let store = MemoryStore::new();
        let user = store.seed_user("user");
        for i in 0..15 {
            store.seed_post(&user, &format!("post {i}"), None);
        }

        let json = body_json(
            app(&store)
                .oneshot(get("/api/posts?page=3", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json["page"], 2);
        assert_eq!(json["num_pages"], 2);
        assert_eq!(json["posts"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn repeated_page_parameter_uses_last_value() {
        let store = MemoryStore::new();
        let user = store.seed_user("user");
        for i in 0..15 {
            store.seed_post(&user, &format!("post {i}"), None);
        }

        let response = app(&store)
            .oneshot(get("/?page=1&page=2", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Страница 2 из 2"));

        let json = body_json(
            app(&store)
                .oneshot(get("/api/posts?page=2&page=1", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(json["page"], 1);
    }

    #[tokio::test]
    async fn profile_links_keep_username_punctuation() {
        let store = MemoryStore::new();
        let user = store.seed_user("a+b.c");
        store.seed_post(&user, "text", None);

        let response = app(&store)
            .oneshot(get("/profile/a+b.c/", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("href=\"/profile/a+b.c/\""));
    }

    #[tokio::test]
    async fn api_writes_require_token_and_authorship() {
        let store = MemoryStore::new();
        let author = store.seed_user("auth");
        let stranger = store.seed_user("not_auth");

        let response = app(&store)
            .oneshot(api_json("POST", "/api/posts", None, json!({ "text": "text" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(&store)
            .oneshot(api_json(
                "POST",
                "/api/posts",
                Some(&token_for(&author)),
                json!({ "text": "text", "group": null }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let post_id = body_json(response).await["id"].as_i64().expect("post id");

        let response = app(&store)
            .oneshot(api_json(
                "PUT",
                &format!("/api/posts/{post_id}"),
                Some(&token_for(&stranger)),
                json!({ "text": "changed" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"], "forbidden");
    }

    #[tokio::test]
    async fn only_staff_manage_groups() {
        let store = MemoryStore::new();
        let admin = store.seed_user("admin");
        let user = store.seed_user("user");
        let payload = json!({ "title": "Cats", "description": "Про котов" });

        let response = app(&store)
            .oneshot(api_json("POST", "/api/groups", Some(&token_for(&user)), payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app(&store)
            .oneshot(api_json("POST", "/api/groups", Some(&token_for(&admin)), payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["slug"], "cats");

        let response = app(&store)
            .oneshot(api_json(
                "DELETE",
                "/api/groups/cats",
                Some(&token_for(&admin)),
                Value::Null,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn browser_login_sets_cookie_and_follows_safe_next() {
        let store = MemoryStore::new();
        let state_app = app(&store);
        let response = state_app
            .oneshot(post_form(
                "/auth/signup/",
                None,
                &[
                    ("username", "user"),
                    ("email", "user@example.com"),
                    ("password", "very-secure-password"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);

        let response = app(&store)
            .oneshot(post_form(
                "/auth/login/",
                None,
                &[
                    ("username", "user"),
                    ("password", "very-secure-password"),
                    ("next", "/create/"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/create/");
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("login must set a cookie");
        assert!(cookie.starts_with("access_token="));
        assert!(cookie.contains("HttpOnly"));

        let response = app(&store)
            .oneshot(post_form(
                "/auth/login/",
                None,
                &[
                    ("username", "user"),
                    ("password", "very-secure-password"),
                    ("next", "https://evil.example/"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let response = app(&MemoryStore::new())
            .oneshot(get("/healthz", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }
}
