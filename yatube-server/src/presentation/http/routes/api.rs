use axum::Router;
use axum::routing::{delete, get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::{auth, groups, posts};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/{id}", get(posts::get_post).put(posts::update_post))
        .route("/profiles/{username}/posts", get(posts::profile_posts))
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route("/groups/{slug}", delete(groups::delete_group))
        .route("/groups/{slug}/posts", get(groups::group_posts))
}
