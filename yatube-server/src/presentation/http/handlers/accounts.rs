use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::info;

use crate::application::outcome::is_safe_redirect;
use crate::domain::error::DomainError;
use crate::domain::user::{Caller, LoginRequest, RegisterRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::presentation::http::views::{
    LoginTemplate, NavView, SignupTemplate, found, render_template_response,
};

const INVALID_LOGIN: &str = "Введите правильные имя пользователя и пароль.";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NextQuery {
    pub(crate) next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginFormDto {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) next: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SignupFormDto {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) password: String,
}

pub(crate) async fn login_form(caller: Caller, Query(query): Query<NextQuery>) -> AppResult<Response> {
    render_template_response(
        LoginTemplate {
            nav: NavView::for_caller(&caller),
            username: String::new(),
            next: query.next.unwrap_or_default(),
            error: None,
        },
        StatusCode::OK,
    )
}

pub(crate) async fn login(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
    Form(dto): Form<LoginFormDto>,
) -> AppResult<Response> {
    let req = LoginRequest {
        username: dto.username.clone(),
        password: dto.password,
    };

    match state.auth_service.login(req).await {
        Ok(result) => {
            info!(username = %result.user.username, "user logged in");
            let target = if is_safe_redirect(&dto.next) {
                dto.next.as_str()
            } else {
                "/"
            };
            let jar = jar.add(session_cookie(result.access_token, state.secure_cookies));
            Ok((jar, found(target)).into_response())
        }
        Err(DomainError::InvalidCredentials | DomainError::Validation { .. }) => {
            render_template_response(
                LoginTemplate {
                    nav: NavView::for_caller(&caller),
                    username: dto.username,
                    next: dto.next,
                    error: Some(INVALID_LOGIN.to_string()),
                },
                StatusCode::OK,
            )
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn signup_form(caller: Caller) -> AppResult<Response> {
    render_template_response(
        SignupTemplate {
            nav: NavView::for_caller(&caller),
            username: String::new(),
            email: String::new(),
            error: None,
        },
        StatusCode::OK,
    )
}

pub(crate) async fn signup(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
    Form(dto): Form<SignupFormDto>,
) -> AppResult<Response> {
    let req = RegisterRequest {
        username: dto.username.clone(),
        email: dto.email.clone(),
        password: dto.password,
    };

    let error = match state.auth_service.register(req).await {
        Ok(result) => {
            let jar = jar.add(session_cookie(result.access_token, state.secure_cookies));
            return Ok((jar, found("/")).into_response());
        }
        Err(DomainError::Validation { field, .. }) => signup_field_message(field),
        Err(DomainError::AlreadyExists(what)) if what == "email" => {
            "Пользователь с таким адресом электронной почты уже существует."
        }
        Err(DomainError::AlreadyExists(_)) => "Пользователь с таким именем уже существует.",
        Err(err) => return Err(err.into()),
    };

    render_template_response(
        SignupTemplate {
            nav: NavView::for_caller(&caller),
            username: dto.username,
            email: dto.email,
            error: Some(error.to_string()),
        },
        StatusCode::OK,
    )
}

pub(crate) async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"));
    (jar, found("/")).into_response()
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn signup_field_message(field: &str) -> &'static str {
    match field {
        "username" => {
            "Введите правильное имя пользователя: до 150 символов, только буквы, цифры и @/./+/-/_."
        }
        "email" => "Введите правильный адрес электронной почты.",
        "password" => "Пароль должен содержать от 8 до 128 символов.",
        _ => "Проверьте введённые данные.",
    }
}

#[cfg(test)]
mod tests {
    use super::session_cookie;
    use axum_extra::extract::cookie::SameSite;

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let cookie = session_cookie("token".to_string(), true);
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
