use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use validator::ValidateEmail;

use super::error::DomainError;

const MAX_USERNAME_CHARS: usize = 150;
const PASSWORD_CHARS: RangeInclusive<usize> = 8..=128;

/// Sign-up form. Usernames and emails must be unique, checked by the repository.
#[derive(Debug, Clone)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if !PASSWORD_CHARS.contains(&self.password.chars().count()) {
            return Err(DomainError::invalid("password", "must be 8..128 chars"));
        }
        Ok(Self {
            username: normalize_username(&self.username)?,
            email: normalize_email(&self.email)?,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        // на входе правила имени мягче: неверное имя даст InvalidCredentials
        let username = self.username.trim();
        match (username.is_empty(), self.password.is_empty()) {
            (true, _) => Err(DomainError::invalid("username", "must not be empty")),
            (_, true) => Err(DomainError::invalid("password", "must not be empty")),
            _ => Ok(Self {
                username: username.to_string(),
                password: self.password,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::invalid("id", "must be > 0"));
        }
        let username = normalize_username(&username.into())?;
        let email = normalize_email(&email.into())?;

        Ok(Self {
            id,
            username,
            email,
            created_at,
        })
    }
}

/// Authenticated user as seen by request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

/// Who is making the request. Passed explicitly into every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum Caller {
    #[default]
    Anonymous,
    User(Identity),
}

impl Caller {
    pub(crate) fn identity(&self) -> Option<&Identity> {
        match self {
            Caller::Anonymous => None,
            Caller::User(identity) => Some(identity),
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

// Те же правила, что у стандартной модели пользователя Django: буквы, цифры и @.+-_
fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let length = username.chars().count();
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    if length == 0 || length > MAX_USERNAME_CHARS || !allowed {
        return Err(DomainError::invalid(
            "username",
            "must be 1..150 letters, digits or @.+-_",
        ));
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::invalid("email", "must be a valid email"));
    }
    Ok(email)
}
