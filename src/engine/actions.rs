use serde::{Deserialize, Serialize};

use crate::domain::PlayerName;

/// Параметры добора крайней карты со стола.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawRequest {
    /// `true`: первая карта стола, иначе последняя.
    pub from_top: bool,
    /// Перевернуть карту перед вставкой в руку.
    pub flip: bool,
    /// Позиция вставки в руку, 0..=длина руки.
    pub insert_at: usize,
}

/// Ход игрока.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnActionKind {
    /// Сыграть `hand[begin..end]`.
    Play { begin: usize, end: usize },
    Draw(DrawRequest),
    /// Добор, после которого игрок обязан сыграть сам (раз за раунд).
    DrawAndPlay(DrawRequest),
}

/// Конкретный ход конкретного игрока.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnAction {
    pub player: PlayerName,
    pub kind: TurnActionKind,
}
