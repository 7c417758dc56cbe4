use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `yatube-client`.
pub enum YatubeClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Операция запрещена: чужой пост или нет прав персонала.
    #[error("forbidden")]
    Forbidden,

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Ресурс уже существует (логин, email или slug заняты).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Некорректный запрос или ошибка валидации.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Результат операций `yatube-client`.
pub type YatubeClientResult<T> = Result<T, YatubeClientError>;

impl YatubeClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized,
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden,
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            _ => {
                let message = message.unwrap_or_else(|| format!("http status {status}"));
                if status == reqwest::StatusCode::CONFLICT {
                    Self::Conflict(message)
                } else {
                    Self::InvalidRequest(message)
                }
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::YatubeClientError;
    use reqwest::StatusCode;

    #[test]
    fn statuses_map_to_variants() {
        assert!(matches!(
            YatubeClientError::from_http_status(StatusCode::UNAUTHORIZED, None),
            YatubeClientError::Unauthorized
        ));
        assert!(matches!(
            YatubeClientError::from_http_status(StatusCode::FORBIDDEN, None),
            YatubeClientError::Forbidden
        ));
        assert!(matches!(
            YatubeClientError::from_http_status(StatusCode::NOT_FOUND, None),
            YatubeClientError::NotFound
        ));
        assert!(matches!(
            YatubeClientError::from_http_status(StatusCode::CONFLICT, Some("taken".to_string())),
            YatubeClientError::Conflict(message) if message == "taken"
        ));
        assert!(matches!(
            YatubeClientError::from_http_status(StatusCode::BAD_REQUEST, None),
            YatubeClientError::InvalidRequest(message) if message.contains("400")
        ));
    }
}
