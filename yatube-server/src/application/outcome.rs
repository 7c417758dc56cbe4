use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::application::pages::PostFormPage;

pub(crate) const LOGIN_PATH: &str = "/auth/login/";
pub(crate) const CREATE_PATH: &str = "/create/";

// символы, которые остаются как есть внутри сегмента пути (`@`, `+` и т.п.)
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@')
    .remove(b'+')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':');

/// Result of a page operation, translated to an HTTP response by the
/// presentation layer.
#[derive(Debug)]
pub(crate) enum Outcome<T> {
    Rendered(T),
    RedirectTo(String),
    NotFound,
    ValidationFailed(PostFormPage),
}

impl<T> Outcome<T> {
    pub(crate) fn login_required(next: &str) -> Self {
        Outcome::RedirectTo(login_url(next))
    }
}

pub(crate) fn login_url(next: &str) -> String {
    // слэши оставляем как есть: ?next=/posts/1/edit/
    format!("{LOGIN_PATH}?next={}", encode(next).replace("%2F", "/"))
}

pub(crate) fn profile_path(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, PATH_SEGMENT))
}

pub(crate) fn post_path(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

pub(crate) fn post_edit_path(post_id: i64) -> String {
    format!("/posts/{post_id}/edit/")
}

/// Only local absolute paths are followed after login.
pub(crate) fn is_safe_redirect(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}

fn encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::{is_safe_redirect, login_url, post_edit_path, profile_path};

    #[test]
    fn login_url_keeps_return_path_readable() {
        assert_eq!(login_url("/create/"), "/auth/login/?next=/create/");
        assert_eq!(
            login_url(&post_edit_path(1)),
            "/auth/login/?next=/posts/1/edit/"
        );
    }

    #[test]
    fn profile_path_keeps_username_punctuation() {
        assert_eq!(profile_path("user"), "/profile/user/");
        assert_eq!(profile_path("a+b@c.d-e_f"), "/profile/a+b@c.d-e_f/");
    }

    #[test]
    fn profile_path_escapes_path_unsafe_characters() {
        assert_eq!(profile_path("лев"), "/profile/%D0%BB%D0%B5%D0%B2/");
        assert_eq!(profile_path("a/b?c"), "/profile/a%2Fb%3Fc/");
    }

    #[test]
    fn only_local_paths_are_safe_redirects() {
        assert!(is_safe_redirect("/posts/1/"));
        assert!(!is_safe_redirect("//evil.example"));
        assert!(!is_safe_redirect("https://evil.example"));
        assert!(!is_safe_redirect("/\\evil.example"));
        assert!(!is_safe_redirect(""));
    }
}
