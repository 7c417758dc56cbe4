use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::group::{CreateGroupRequest, Group};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::posts::{PageQuery, PostPageDto, listing_response};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateGroupDto {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    /// Generated from the title when omitted.
    #[validate(length(max = 200))]
    pub(crate) slug: Option<String>,
    #[validate(length(min = 1))]
    pub(crate) description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct GroupDto {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) description: String,
}

impl From<Group> for GroupDto {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            slug: group.slug,
            title: group.title,
            description: group.description,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/groups",
    tag = "groups",
    responses(
        (status = 200, description = "Groups ordered by title", body = [GroupDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_groups(State(state): State<AppState>) -> AppResult<Json<Vec<GroupDto>>> {
    let groups = state.group_service.list_groups().await?;
    Ok(Json(groups.into_iter().map(GroupDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    tag = "groups",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateGroupDto,
    responses(
        (status = 201, description = "Group created", body = GroupDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not staff"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_group(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(dto): Json<CreateGroupDto>,
) -> AppResult<(StatusCode, Json<GroupDto>)> {
    dto.validate()?;

    let req = CreateGroupRequest {
        title: dto.title,
        slug: dto.slug,
        description: dto.description,
    };
    let group = state.group_service.create_group(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(GroupDto::from(group))))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{slug}",
    tag = "groups",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("slug" = String, Path, description = "Group slug")
    ),
    responses(
        (status = 204, description = "Group deleted, its posts keep no group"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not staff"),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_group(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    state.group_service.delete_group(&identity, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/groups/{slug}/posts",
    tag = "groups",
    params(
        ("slug" = String, Path, description = "Group slug"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Posts of the group", body = PostPageDto),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PostPageDto>> {
    let outcome = state
        .post_service
        .group_posts(&slug, query.page.as_deref())
        .await?;
    listing_response(outcome)
}
