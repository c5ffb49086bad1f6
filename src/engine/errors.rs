use crate::domain::errors::DomainError;
use crate::domain::table::TableState;
use crate::domain::{PlayerName, TableId};

use thiserror::Error;

/// Род ошибки: пользовательская (отказ в запросе) или структурная (дефект).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Structural,
}

/// Ошибки движка.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Стол {0} не найден")]
    TableNotFound(TableId),

    #[error("Стол {0} заполнен")]
    TableFull(TableId),

    #[error("Стол {0} закрыт хозяином")]
    TableLocked(TableId),

    #[error("Игрок {0} не найден за столом")]
    PlayerNotAtTable(PlayerName),

    #[error("Игрок {0} уже сидит за этим столом")]
    AlreadySeated(PlayerName),

    #[error("Недопустимое действие в состоянии стола {found:?}")]
    InvalidTableState { found: TableState },

    #[error("Сейчас не ход игрока {0}")]
    NotPlayersTurn(PlayerName),

    #[error("Комбинация [{0}] недопустима")]
    InvalidCombination(String),

    #[error("Комбинация [{played}] не сильнее комбинации на столе [{displayed}]")]
    InsufficientRank { played: String, displayed: String },

    #[error("После добора с правом хода нужно сыграть комбинацию")]
    PlayRequired,

    #[error("Игрок {0} уже добирал с правом хода в этом раунде")]
    SpecialMoveUsed(PlayerName),

    #[error("На столе нет карт, которые можно забрать")]
    NothingToDraw,

    #[error("Только хозяин стола может это сделать (игрок {0} не хозяин)")]
    NotHost(PlayerName),

    #[error("Раунд не активен")]
    NoActiveRound,

    #[error("Структурная ошибка: {0}")]
    Structural(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Structural(_) => ErrorKind::Structural,
            _ => ErrorKind::Validation,
        }
    }

    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }

    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        EngineError::Structural(msg.into())
    }
}
