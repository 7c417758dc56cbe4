use axum::{
    Form,
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, Uri},
    response::Response,
};
use serde::Deserialize;

use crate::application::pages::PostFormPage;
use crate::domain::post::PostInput;
use crate::domain::user::Caller;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::posts::PageQuery;
use crate::presentation::http::views::{
    NavView, PostDetailTemplate, PostFormTemplate, render_listing, render_not_found,
    render_template_response, respond,
};

/// Raw post form as submitted by the browser. Missing fields count as empty.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PostFormDto {
    #[serde(default)]
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) group: Option<String>,
}

impl From<PostFormDto> for PostInput {
    fn from(dto: PostFormDto) -> Self {
        Self {
            text: dto.text,
            group: dto.group,
        }
    }
}

pub(crate) async fn index(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let outcome = state.post_service.index(query.page.as_deref()).await?;
    respond(outcome, NavView::for_caller(&caller), render_listing)
}

pub(crate) async fn group_posts(
    State(state): State<AppState>,
    caller: Caller,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let outcome = state
        .post_service
        .group_posts(&slug, query.page.as_deref())
        .await?;
    respond(outcome, NavView::for_caller(&caller), render_listing)
}

pub(crate) async fn profile(
    State(state): State<AppState>,
    caller: Caller,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let outcome = state
        .post_service
        .profile(&username, query.page.as_deref())
        .await?;
    respond(outcome, NavView::for_caller(&caller), render_listing)
}

pub(crate) async fn post_detail(
    State(state): State<AppState>,
    caller: Caller,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let nav = NavView::for_caller(&caller);
    let Some(post_id) = parse_post_id(&raw_id) else {
        return render_not_found(nav);
    };

    let outcome = state.post_service.post_detail(post_id).await?;
    respond(outcome, nav, |detail, nav| {
        render_template_response(PostDetailTemplate::new(detail, &caller, nav), StatusCode::OK)
    })
}

pub(crate) async fn create_form(
    State(state): State<AppState>,
    caller: Caller,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Response> {
    let outcome = state
        .post_service
        .create_form(&caller, full_path(&uri))
        .await?;
    respond(outcome, NavView::for_caller(&caller), render_form)
}

pub(crate) async fn create_post(
    State(state): State<AppState>,
    caller: Caller,
    OriginalUri(uri): OriginalUri,
    Form(dto): Form<PostFormDto>,
) -> AppResult<Response> {
    let outcome = state
        .post_service
        .create_post(&caller, full_path(&uri), dto.into())
        .await?;
    respond(outcome, NavView::for_caller(&caller), render_form)
}

pub(crate) async fn edit_form(
    State(state): State<AppState>,
    caller: Caller,
    OriginalUri(uri): OriginalUri,
    Path(raw_id): Path<String>,
) -> AppResult<Response> {
    let nav = NavView::for_caller(&caller);
    let Some(post_id) = parse_post_id(&raw_id) else {
        return render_not_found(nav);
    };

    let outcome = state
        .post_service
        .edit_form(&caller, full_path(&uri), post_id)
        .await?;
    respond(outcome, nav, render_form)
}

pub(crate) async fn edit_post(
    State(state): State<AppState>,
    caller: Caller,
    OriginalUri(uri): OriginalUri,
    Path(raw_id): Path<String>,
    Form(dto): Form<PostFormDto>,
) -> AppResult<Response> {
    let nav = NavView::for_caller(&caller);
    let Some(post_id) = parse_post_id(&raw_id) else {
        return render_not_found(nav);
    };

    let outcome = state
        .post_service
        .edit_post(&caller, full_path(&uri), post_id, dto.into())
        .await?;
    respond(outcome, nav, render_form)
}

pub(crate) async fn not_found(caller: Caller) -> AppResult<Response> {
    render_not_found(NavView::for_caller(&caller))
}

fn render_form(form: PostFormPage, nav: NavView) -> AppResult<Response> {
    render_template_response(PostFormTemplate::new(form, nav), StatusCode::OK)
}

/// Path with the query string, as the browser requested it.
fn full_path(uri: &Uri) -> &str {
    uri.path_and_query()
        .map_or_else(|| uri.path(), |path_and_query| path_and_query.as_str())
}

// в URL только положительные числа, остальное считаем 404
fn parse_post_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}
