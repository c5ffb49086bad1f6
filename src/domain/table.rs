use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::player::{Player, PlayerState};
use crate::domain::rules::RulesConfig;
use crate::domain::{PlayerName, TableId};

/// Индекс места за столом (порядок посадки = порядок хода).
pub type SeatIndex = usize;

/// Состояние стола.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TableState {
    /// Набор игроков, есть свободные места.
    Recruiting,
    /// Места заняты, ещё не все готовы.
    Full,
    /// Идёт раздача (переходное состояние внутри одной команды).
    Initializing,
    /// Руки розданы, игроки выбирают ориентацию.
    PlayerAck,
    /// Раунд идёт.
    Playing,
    /// Раунд завершён, ждём подтверждений.
    RoundEnded,
}

impl TryFrom<i8> for TableState {
    type Error = DomainError;

    fn try_from(raw: i8) -> Result<Self, Self::Error> {
        match raw {
            -2 => Ok(TableState::Recruiting),
            -1 => Ok(TableState::Full),
            0 => Ok(TableState::Initializing),
            1 => Ok(TableState::PlayerAck),
            2 => Ok(TableState::Playing),
            3 => Ok(TableState::RoundEnded),
            _ => Err(DomainError::UnknownState {
                machine: "стола",
                raw,
            }),
        }
    }
}

impl TableState {
    /// Раунд ещё не начинался (можно садиться / вставать / готовиться).
    pub fn is_open(&self) -> bool {
        matches!(self, TableState::Recruiting | TableState::Full)
    }
}

/// Основное (межраундовое) состояние стола.
///
/// Всё, что живёт только один раунд (колода, стол, история), лежит в
/// `engine::RoundEngine`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub id: TableId,
    pub rules: RulesConfig,
    /// Места: индекс вектора = SeatIndex.
    pub seats: Vec<Player>,
    pub host_seat: SeatIndex,
    /// Закрытый стол не принимает новых игроков.
    pub locked: bool,
    pub state: TableState,
    /// Публичное сообщение о текущем состоянии.
    pub notice: String,
    /// Накопленные очки по всем раундам за этим столом.
    pub total_scores: BTreeMap<PlayerName, i32>,
}

impl Table {
    /// Создать пустой стол с заданными правилами.
    pub fn new(id: TableId, rules: RulesConfig) -> Self {
        Self {
            id,
            rules,
            seats: Vec::new(),
            host_seat: 0,
            locked: false,
            state: TableState::Recruiting,
            notice: String::new(),
            total_scores: BTreeMap::new(),
        }
    }

    pub fn max_seats(&self) -> usize {
        self.rules.max_seats as usize
    }

    pub fn seated_count(&self) -> usize {
        self.seats.len()
    }

    pub fn is_full(&self) -> bool {
        self.seated_count() >= self.max_seats()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn seat_of(&self, name: &str) -> Option<SeatIndex> {
        self.seats.iter().position(|p| p.name == name)
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.seats.iter().find(|p| p.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.seats.iter_mut().find(|p| p.name == name)
    }

    pub fn host(&self) -> Option<&Player> {
        self.seats.get(self.host_seat)
    }

    pub fn ready_count(&self) -> usize {
        self.seats
            .iter()
            .filter(|p| p.state == PlayerState::Ready)
            .count()
    }

    pub fn names(&self) -> Vec<PlayerName> {
        self.seats.iter().map(|p| p.name.clone()).collect()
    }

    /// Recruiting или Full по числу занятых мест.
    pub fn open_state(&self) -> TableState {
        if self.is_full() {
            TableState::Full
        } else {
            TableState::Recruiting
        }
    }
}
