use thiserror::Error;

use crate::domain::card::CardState;
use crate::domain::player::PlayerState;
use crate::domain::{CardId, PlayerName, TableId};

/// Ошибки доменного уровня: нарушенные предусловия карт и игроков.
///
/// Все они пользовательские (ValidationError): проверяются до мутации.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Карта в состоянии {found:?}, требуется {expected:?}")]
    InvalidCardState { expected: CardState, found: CardState },

    #[error("Игрок {player} в состоянии {found:?}, требуется одно из {expected:?}")]
    InvalidPlayerState {
        player: PlayerName,
        expected: &'static [PlayerState],
        found: PlayerState,
    },

    #[error("Неизвестное состояние {machine}: {raw}")]
    UnknownState { machine: &'static str, raw: i8 },

    #[error("Неверный диапазон [{begin}, {end}) для руки из {hand_len} карт")]
    InvalidRange {
        begin: usize,
        end: usize,
        hand_len: usize,
    },

    #[error("Неверная позиция вставки {position} для руки из {hand_len} карт")]
    InvalidInsertPosition { position: usize, hand_len: usize },

    #[error("Неверное описание карты: {0:?}")]
    InvalidFaces(String),

    #[error("Игрок {player} уже сидит за столом {table_id}")]
    AlreadyAtTable { player: PlayerName, table_id: TableId },

    #[error("Игрок {0} не сидит ни за одним столом")]
    NotAtTable(PlayerName),

    #[error("Карты {card} нет в руке игрока {player}")]
    CardNotInHand { player: PlayerName, card: CardId },
}
