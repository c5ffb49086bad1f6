use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PlayerName, TableId};
use crate::engine::{EngineError, ManagerError};

/// Ошибки внешнего API (то, что отдаём клиенту).
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    /// Неправильные входные данные (битый JSON, лишние поля, пустое имя).
    #[error("Некорректный запрос: {0}")]
    BadRequest(String),

    /// Команда понятна, но сейчас не может быть выполнена.
    #[error("Отклонено: {0}")]
    Rejected(String),

    #[error("Стол {0} не найден")]
    TableNotFound(TableId),

    #[error("Игрок {0} не сидит за столом")]
    PlayerNotAtTable(PlayerName),

    /// Внутренняя ошибка: дефект движка, запрос не применён.
    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Structural(msg) => ApiError::Internal(msg),
            EngineError::TableNotFound(id) => ApiError::TableNotFound(id),
            EngineError::PlayerNotAtTable(name) => ApiError::PlayerNotAtTable(name),
            other => ApiError::Rejected(other.to_string()),
        }
    }
}

impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::TableNotFound(id) => ApiError::TableNotFound(id),
            ManagerError::PlayerNotSeated(name) => ApiError::PlayerNotAtTable(name),
            ManagerError::InvalidPlayerName(_) => ApiError::BadRequest(err.to_string()),
            ManagerError::AlreadyAtTable { .. } => ApiError::Rejected(err.to_string()),
            ManagerError::Config(msg) => ApiError::Internal(msg),
            ManagerError::Engine(e) => e.into(),
        }
    }
}
