use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

const MAX_TITLE_CHARS: usize = 200;
const MAX_SLUG_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Group {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) description: String,
}

impl Group {
    pub(crate) fn new(
        id: i64,
        slug: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::invalid("id", "must be > 0"));
        }
        let slug = slug.into();
        validate_slug(&slug)?;

        Ok(Self {
            id,
            slug,
            title: title.into(),
            description: description.into(),
        })
    }

    pub(crate) fn heading(&self) -> String {
        format!("Записи сообщества {}", self.title)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateGroupRequest {
    pub(crate) title: String,
    pub(crate) slug: Option<String>,
    pub(crate) description: String,
}

impl CreateGroupRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
            return Err(DomainError::invalid("title", "must be 1..200 chars"));
        }

        let slug = match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            // заголовки обычно на кириллице, slugify транслитерирует их
            _ => slug::slugify(title),
        };
        validate_slug(&slug)?;

        let description = self.description.trim();
        if description.is_empty() {
            return Err(DomainError::invalid("description", "must not be empty"));
        }

        Ok(Self {
            title: title.to_string(),
            slug: Some(slug),
            description: description.to_string(),
        })
    }
}

fn validate_slug(slug: &str) -> Result<(), DomainError> {
    let well_formed = !slug.is_empty()
        && slug.chars().count() <= MAX_SLUG_CHARS
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !well_formed {
        return Err(DomainError::invalid(
            "slug",
            "must be 1..200 chars of latin letters, digits, '-' or '_'",
        ));
    }
    Ok(())
}
