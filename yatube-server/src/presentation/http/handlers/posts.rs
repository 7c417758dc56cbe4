use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::outcome::Outcome;
use crate::application::pages::ListingPage;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostInput};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostPayloadDto {
    #[validate(length(min = 1))]
    pub(crate) text: String,
    /// Id of an existing group, or null for no group.
    pub(crate) group: Option<i64>,
}

impl From<PostPayloadDto> for PostInput {
    fn from(dto: PostPayloadDto) -> Self {
        Self {
            text: dto.text,
            group: dto.group.map(|id| id.to_string()),
        }
    }
}

/// `page` query parameter. When it is repeated, the last value wins.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(from = "Vec<(String, String)>")]
#[into_params(parameter_in = Query)]
pub(crate) struct PageQuery {
    /// Page number; invalid values fall back to the first or last page.
    pub(crate) page: Option<String>,
}

impl From<Vec<(String, String)>> for PageQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let page = pairs
            .into_iter()
            .rev()
            .find_map(|(key, value)| (key == "page").then_some(value));
        Self { page }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct GroupRefDto {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) author: String,
    pub(crate) group: Option<GroupRefDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) post: PostDto,
    pub(crate) author_post_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: u32,
    pub(crate) num_pages: u32,
    pub(crate) per_page: u32,
    pub(crate) total: i64,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author_id: post.author.id,
            author: post.author.username,
            group: post.group.map(|group| GroupRefDto {
                id: group.id,
                slug: group.slug,
                title: group.title,
            }),
        }
    }
}

impl From<ListingPage> for PostPageDto {
    fn from(listing: ListingPage) -> Self {
        let page = listing.page.map(PostDto::from);
        Self {
            page: page.number,
            num_pages: page.num_pages,
            per_page: page.per_page,
            total: page.total,
            posts: page.items,
        }
    }
}

/// Listings never redirect; an unknown group or author becomes a 404.
pub(crate) fn listing_response(outcome: Outcome<ListingPage>) -> AppResult<Json<PostPageDto>> {
    match outcome {
        Outcome::Rendered(listing) => Ok(Json(PostPageDto::from(listing))),
        Outcome::NotFound => Err(AppError::NotFound),
        Outcome::RedirectTo(_) | Outcome::ValidationFailed(_) => Err(AppError::Domain(
            DomainError::Unexpected("listing produced a non-page outcome".to_string()),
        )),
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(PageQuery),
    responses(
        (status = 200, description = "Posts listed, newest first", body = PostPageDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    let outcome = state.post_service.index(query.page.as_deref()).await?;
    listing_response(outcome)
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    tag = "posts",
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDetailDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PostDetailDto>> {
    match state.post_service.post_detail(id).await? {
        Outcome::Rendered(detail) => Ok(Json(PostDetailDto {
            post: detail.post.into(),
            author_post_count: detail.author_post_count,
        })),
        _ => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostPayloadDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(dto): Json<PostPayloadDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let post = state.post_service.publish(&identity, dto.into()).await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = PostPayloadDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(dto): Json<PostPayloadDto>,
) -> AppResult<Json<PostDto>> {
    dto.validate()?;

    let post = state.post_service.revise(&identity, id, dto.into()).await?;
    Ok(Json(PostDto::from(post)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{username}/posts",
    tag = "posts",
    params(
        ("username" = String, Path, description = "Author username"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Posts of the author", body = PostPageDto),
        (status = 404, description = "Author not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn profile_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    let outcome = state
        .post_service
        .profile(&username, query.page.as_deref())
        .await?;
    listing_response(outcome)
}
