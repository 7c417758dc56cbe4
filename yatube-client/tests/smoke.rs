use std::time::{SystemTime, UNIX_EPOCH};

use yatube_client::{YatubeClient, YatubeClientError};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

fn base_url() -> String {
    std::env::var("YATUBE_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

#[tokio::test]
#[ignore = "requires running HTTP server and database"]
async fn http_smoke_flow() {
    let mut client = YatubeClient::new(base_url()).expect("client must build");

    let suffix = unique_suffix();
    let username = format!("http_user_{suffix}");
    let email = format!("http_{suffix}@example.com");
    let password = "password123";

    let register = client
        .register(&username, &email, password)
        .await
        .expect("register must succeed");
    assert!(!register.access_token.is_empty());
    assert_eq!(register.user.username, username);
    assert!(client.get_token().is_some());

    let login = client
        .login(&username, password)
        .await
        .expect("login must succeed");
    assert_eq!(login.user.username, username);

    let created = client
        .create_post("Тестовый пост", None)
        .await
        .expect("create_post must succeed");
    assert_eq!(created.text, "Тестовый пост");
    assert_eq!(created.author, username);

    let fetched = client
        .get_post(created.id)
        .await
        .expect("get_post must succeed");
    assert_eq!(fetched.post.id, created.id);
    assert_eq!(fetched.author_post_count, 1);

    let listed = client.list_posts(1).await.expect("list_posts must succeed");
    assert!(listed.posts.iter().any(|post| post.id == created.id));

    let profile = client
        .profile_posts(&username, 1)
        .await
        .expect("profile_posts must succeed");
    assert_eq!(profile.total, 1);

    let updated = client
        .update_post(created.id, "Отредактированный пост", None)
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.text, "Отредактированный пост");
    assert_eq!(updated.pub_date, created.pub_date);

    let missing = client.get_post(i64::MAX).await;
    assert!(matches!(missing, Err(YatubeClientError::NotFound)));
}

#[tokio::test]
#[ignore = "requires running HTTP server and database"]
async fn foreign_post_cannot_be_edited() {
    let suffix = unique_suffix();
    let mut author = YatubeClient::new(base_url()).expect("client must build");
    author
        .register(&format!("author_{suffix}"), &format!("author_{suffix}@example.com"), "password123")
        .await
        .expect("register must succeed");
    let post = author
        .create_post("Чужой пост", None)
        .await
        .expect("create_post must succeed");

    let mut stranger = YatubeClient::new(base_url()).expect("client must build");
    stranger
        .register(&format!("stranger_{suffix}"), &format!("stranger_{suffix}@example.com"), "password123")
        .await
        .expect("register must succeed");

    let result = stranger.update_post(post.id, "Взлом", None).await;
    assert!(matches!(result, Err(YatubeClientError::Forbidden)));
}
