use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::player::PlayerState;
use crate::domain::table::TableState;
use crate::domain::{PlayerName, TableId};
use crate::engine::operation::OperationType;

/// Операция в публичном виде (без позиции вставки в руку).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationDto {
    pub index: u32,
    pub actor: PlayerName,
    pub kind: OperationType,
    /// Строка истории.
    pub description: String,
    /// Карты операции в каноническом виде "активные,неактивные".
    pub detail: Option<String>,
}

/// Счётчики одного места: карт в зачёте и карт в руке.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatCountsDto {
    pub player: PlayerName,
    pub goal_cards: usize,
    pub remaining_cards: usize,
}

/// Публичная информация о раунде.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundInfoDto {
    pub table_id: TableId,
    /// Число записей в истории.
    pub turn: usize,
    pub players: Vec<PlayerName>,
    pub seats: Vec<SeatCountsDto>,
    pub extra_points: BTreeMap<PlayerName, i32>,
    pub displayed: String,
    pub last_operation: Option<OperationDto>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatDto {
    pub seat: u8,
    pub name: PlayerName,
    pub state: PlayerState,
    pub is_host: bool,
}

/// Рассадка стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatingDto {
    pub table_id: TableId,
    pub state: TableState,
    pub locked: bool,
    pub host: Option<PlayerName>,
    pub seats: Vec<SeatDto>,
}

/// Событие глазами конкретного игрока: чужие руки не попадают.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventDto {
    pub kind: String,
    pub table_id: TableId,
    pub player: Option<PlayerName>,
    pub detail: Option<String>,
    /// Стол после события, "активные,неактивные".
    pub displayed: Option<String>,
    pub operation: Option<OperationDto>,
}

/// Ответ на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResponse {
    pub table_id: TableId,
    pub events: Vec<EventDto>,
}
