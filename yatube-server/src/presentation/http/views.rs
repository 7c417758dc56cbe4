use askama::Template;
use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Datelike, Utc};

use crate::application::outcome::{
    CREATE_PATH, Outcome, post_edit_path, post_path, profile_path,
};
use crate::application::pages::{ListingPage, ListingScope, PostDetailPage, PostFormPage};
use crate::domain::pagination::Page;
use crate::domain::post::Post;
use crate::domain::user::Caller;
use crate::presentation::http::app_error::AppResult;

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

pub(crate) fn render_template<T: Template>(template: T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}

pub(crate) fn render_template_response<T: Template>(
    template: T,
    status: StatusCode,
) -> AppResult<Response> {
    Ok((status, render_template(template)?).into_response())
}

/// 302 Found, как у Django `redirect()`.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub(crate) fn render_not_found(nav: NavView) -> AppResult<Response> {
    render_template_response(NotFoundTemplate { nav }, StatusCode::NOT_FOUND)
}

/// Translates a page outcome into a response; `render` is only called for
/// `Outcome::Rendered`.
pub(crate) fn respond<T>(
    outcome: Outcome<T>,
    nav: NavView,
    render: impl FnOnce(T, NavView) -> AppResult<Response>,
) -> AppResult<Response> {
    match outcome {
        Outcome::Rendered(view) => render(view, nav),
        Outcome::RedirectTo(location) => Ok(found(&location)),
        Outcome::NotFound => render_not_found(nav),
        Outcome::ValidationFailed(form) => {
            render_template_response(PostFormTemplate::new(form, nav), StatusCode::OK)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NavView {
    pub(crate) username: Option<String>,
    pub(crate) profile_url: Option<String>,
}

impl NavView {
    pub(crate) fn for_caller(caller: &Caller) -> Self {
        match caller.identity() {
            Some(identity) => Self {
                username: Some(identity.username.clone()),
                profile_url: Some(profile_path(&identity.username)),
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GroupLinkView {
    pub(crate) title: String,
    pub(crate) url: String,
}

#[derive(Debug, Clone)]
pub(crate) struct PostCardView {
    pub(crate) text: String,
    pub(crate) pub_date: String,
    pub(crate) author: String,
    pub(crate) author_url: String,
    pub(crate) detail_url: String,
    pub(crate) group: Option<GroupLinkView>,
}

impl From<&Post> for PostCardView {
    fn from(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            pub_date: format_date(post.pub_date),
            author: post.author.username.clone(),
            author_url: profile_path(&post.author.username),
            detail_url: post_path(post.id),
            group: post.group.as_ref().map(|group| GroupLinkView {
                title: group.title.clone(),
                url: format!("/group/{}/", group.slug),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PaginatorView {
    pub(crate) number: u32,
    pub(crate) num_pages: u32,
    pub(crate) first_url: Option<String>,
    pub(crate) previous_url: Option<String>,
    pub(crate) next_url: Option<String>,
    pub(crate) last_url: Option<String>,
}

impl PaginatorView {
    fn from_page<T>(page: &Page<T>) -> Self {
        let link = |number: u32| format!("?page={number}");
        Self {
            number: page.number,
            num_pages: page.num_pages,
            first_url: page.has_previous().then(|| link(1)),
            previous_url: page.previous_page_number().map(link),
            next_url: page.next_page_number().map(link),
            last_url: page.has_next().then(|| link(page.num_pages)),
        }
    }

    pub(crate) fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}

#[derive(Template)]
#[template(path = "posts/index.html")]
pub(crate) struct IndexTemplate {
    pub(crate) nav: NavView,
    pub(crate) posts: Vec<PostCardView>,
    pub(crate) paginator: PaginatorView,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub(crate) struct GroupListTemplate {
    pub(crate) nav: NavView,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) posts: Vec<PostCardView>,
    pub(crate) paginator: PaginatorView,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub(crate) struct ProfileTemplate {
    pub(crate) nav: NavView,
    pub(crate) author: String,
    pub(crate) post_count: i64,
    pub(crate) posts: Vec<PostCardView>,
    pub(crate) paginator: PaginatorView,
}

/// Picks the listing template matching the scope of the page.
pub(crate) fn render_listing(listing: ListingPage, nav: NavView) -> AppResult<Response> {
    let paginator = PaginatorView::from_page(&listing.page);
    let total = listing.page.total;
    let posts = listing.page.items.iter().map(PostCardView::from).collect();

    let html = match listing.scope {
        ListingScope::All => render_template(IndexTemplate {
            nav,
            posts,
            paginator,
        })?,
        ListingScope::Group(group) => render_template(GroupListTemplate {
            nav,
            title: group.heading(),
            description: group.description,
            posts,
            paginator,
        })?,
        ListingScope::Author(author) => render_template(ProfileTemplate {
            nav,
            author: author.username,
            post_count: total,
            posts,
            paginator,
        })?,
    };
    Ok(html.into_response())
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub(crate) struct PostDetailTemplate {
    pub(crate) nav: NavView,
    pub(crate) title: String,
    pub(crate) post: PostCardView,
    pub(crate) author_post_count: i64,
    pub(crate) edit_url: Option<String>,
}

impl PostDetailTemplate {
    pub(crate) fn new(detail: PostDetailPage, caller: &Caller, nav: NavView) -> Self {
        let is_author = caller
            .identity()
            .is_some_and(|identity| detail.post.is_authored_by(identity.user_id));
        Self {
            nav,
            title: detail.post.title(),
            post: PostCardView::from(&detail.post),
            author_post_count: detail.author_post_count,
            edit_url: is_author.then(|| post_edit_path(detail.post.id)),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GroupOptionView {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) selected: bool,
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub(crate) struct PostFormTemplate {
    pub(crate) nav: NavView,
    pub(crate) is_edit: bool,
    pub(crate) action: String,
    pub(crate) text: String,
    pub(crate) groups: Vec<GroupOptionView>,
    pub(crate) no_group_selected: bool,
    pub(crate) text_errors: Vec<&'static str>,
    pub(crate) group_errors: Vec<&'static str>,
}

impl PostFormTemplate {
    pub(crate) fn new(form: PostFormPage, nav: NavView) -> Self {
        let selected = form.selected_group();
        let action = match form.editing {
            Some(post_id) => post_edit_path(post_id),
            None => CREATE_PATH.to_string(),
        };
        let groups: Vec<GroupOptionView> = form
            .groups
            .iter()
            .map(|group| GroupOptionView {
                id: group.id,
                title: group.title.clone(),
                selected: selected == Some(group.id),
            })
            .collect();
        Self {
            nav,
            is_edit: form.is_edit(),
            action,
            no_group_selected: !groups.iter().any(|group| group.selected),
            groups,
            text_errors: form.errors.messages_for("text"),
            group_errors: form.errors.messages_for("group"),
            text: form.input.text,
        }
    }
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub(crate) struct LoginTemplate {
    pub(crate) nav: NavView,
    pub(crate) username: String,
    pub(crate) next: String,
    pub(crate) error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub(crate) struct SignupTemplate {
    pub(crate) nav: NavView,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) error: Option<String>,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub(crate) struct NotFoundTemplate {
    pub(crate) nav: NavView,
}

fn format_date(date: DateTime<Utc>) -> String {
    let month = MONTHS_GENITIVE[date.month0() as usize];
    format!("{} {} {}", date.day(), month, date.year())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{PaginatorView, PostFormTemplate, format_date};
    use crate::application::pages::PostFormPage;
    use crate::domain::error::FieldErrors;
    use crate::domain::group::Group;
    use crate::domain::pagination::Paginator;
    use crate::domain::post::PostInput;

    #[test]
    fn dates_use_russian_month_names() {
        let date = Utc.with_ymd_and_hms(2022, 11, 30, 16, 34, 0).unwrap();
        assert_eq!(format_date(date), "30 ноября 2022");
    }

    #[test]
    fn paginator_links_only_exist_where_pages_exist() {
        let paginator = Paginator::new(15, 10);
        let first = PaginatorView::from_page(&paginator.page(1, vec![(); 10]));
        assert!(first.previous_url.is_none());
        assert_eq!(first.next_url.as_deref(), Some("?page=2"));
        assert_eq!(first.last_url.as_deref(), Some("?page=2"));
        assert!(first.is_paginated());

        let single = PaginatorView::from_page(&Paginator::new(3, 10).page(1, vec![(); 3]));
        assert!(!single.is_paginated());
    }

    #[test]
    fn edit_form_marks_selected_group_and_targets_edit_path() {
        let groups = vec![
            Group::new(1, "first", "Первая", "one").unwrap(),
            Group::new(2, "second", "Вторая", "two").unwrap(),
        ];
        let form = PostFormPage {
            input: PostInput {
                text: "text".to_string(),
                group: Some("2".to_string()),
            },
            groups,
            errors: FieldErrors::default(),
            editing: Some(7),
        };

        let template = PostFormTemplate::new(form, Default::default());
        assert!(template.is_edit);
        assert_eq!(template.action, "/posts/7/edit/");
        assert!(!template.groups[0].selected);
        assert!(template.groups[1].selected);
        assert!(!template.no_group_selected);
    }
}
