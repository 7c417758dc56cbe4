use std::fmt;

use chrono::{DateTime, Utc};

use super::error::{DomainError, FieldErrors};

const DISPLAY_CHARS: usize = 15;
const TITLE_CHARS: usize = 30;

pub(crate) const REQUIRED_FIELD: &str = "Обязательное поле.";
pub(crate) const INVALID_CHOICE: &str =
    "Выберите корректный вариант. Вашего варианта нет среди допустимых значений.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Author {
    pub(crate) id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupRef {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author: Author,
    pub(crate) group: Option<GroupRef>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        text: impl Into<String>,
        pub_date: DateTime<Utc>,
        author: Author,
        group: Option<GroupRef>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::invalid("id", "must be > 0"));
        }
        if author.id <= 0 {
            return Err(DomainError::invalid("author_id", "must be > 0"));
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::invalid("text", "must not be empty"));
        }

        Ok(Self {
            id,
            text,
            pub_date,
            author,
            group,
        })
    }

    pub(crate) fn is_authored_by(&self, user_id: i64) -> bool {
        self.author.id == user_id
    }

    pub(crate) fn group_id(&self) -> Option<i64> {
        self.group.as_ref().map(|group| group.id)
    }

    /// Заголовок страницы поста: первые 30 символов текста.
    pub(crate) fn title(&self) -> String {
        self.text.chars().take(TITLE_CHARS).collect()
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.text.chars().take(DISPLAY_CHARS).collect();
        f.write_str(&preview)
    }
}

/// Raw post form submission: `text` plus the selected group id, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PostInput {
    pub(crate) text: String,
    pub(crate) group: Option<String>,
}

impl PostInput {
    pub(crate) fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id().map(|id| id.to_string()),
        }
    }

    /// Selected group id as submitted. `Err(())` means the value is not an id at all.
    pub(crate) fn group_id(&self) -> Result<Option<i64>, ()> {
        match self.group.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| ()),
        }
    }

    /// Field-level checks that need no storage access. Group existence is
    /// verified by the caller.
    pub(crate) fn validate(&self) -> Result<PostDraft, FieldErrors> {
        let mut errors = FieldErrors::default();

        let text = self.text.trim();
        if text.is_empty() {
            errors.push("text", REQUIRED_FIELD);
        }

        let group_id = match self.group_id() {
            Ok(group_id) => group_id,
            Err(()) => {
                errors.push("group", INVALID_CHOICE);
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PostDraft {
            text: text.to_string(),
            group_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostDraft {
    pub(crate) text: String,
    pub(crate) group_id: Option<i64>,
}
