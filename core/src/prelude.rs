/// Common error type for client operations.
///
/// Failures split into transport problems (the request never produced a
/// usable response) and backend-reported problems (the response carried an
/// `error` field). Both are rendered into user-visible text at the call
/// site and never propagate past the handler that triggered them.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {detail}")]
    Http {
        status: reqwest::StatusCode,
        detail: String,
    },
    #[error("backend error: {0}")]
    Backend(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("analysis already in progress")]
    Busy,
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Text shown to the user. The backend speaks Russian, so client-side
    /// failures do too; backend-provided messages pass through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(err) => format!("Ошибка сети: {err}"),
            ClientError::Http { status, detail } if detail.is_empty() => {
                format!("Сервер вернул ошибку {status}")
            }
            ClientError::Http { status, detail } => {
                format!("Сервер вернул ошибку {status}: {detail}")
            }
            ClientError::Backend(message) => message.clone(),
            ClientError::Decode(detail) => format!("Некорректный ответ сервера: {detail}"),
            ClientError::Io(err) => format!("Не удалось сохранить файл: {err}"),
            ClientError::Busy => "Анализ уже запущен".into(),
            ClientError::Config(detail) => format!("Неверная конфигурация: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_passes_through_verbatim() {
        let err = ClientError::Backend("Файл данных не найден".into());
        assert_eq!(err.user_message(), "Файл данных не найден");
    }

    #[test]
    fn busy_matches_backend_wording() {
        assert_eq!(ClientError::Busy.user_message(), "Анализ уже запущен");
    }
}
