use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::card::CardState;
use crate::domain::combination::Combination;
use crate::domain::deck::Deck;
use crate::domain::player::{Player, PlayerState};
use crate::domain::rules::RulesConfig;
use crate::domain::table::{Table, TableState};
use crate::domain::{CardId, PlayerName, SeatIndex, TableId};
use crate::engine::errors::EngineError;
use crate::engine::events::WinReason;
use crate::engine::operation::{Operation, OperationLog};

/// Состояние одного раунда: колода, стол, история, добор.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoundEngine {
    pub table_id: TableId,
    /// Все карты раунда (в руках, на столе, в зачёте, нерозданные).
    pub pool: Deck,
    /// Текущая комбинация на столе.
    pub displayed: Combination,
    pub history: OperationLog,
    /// Очки за карты, которые у игрока забрали со стола.
    pub extra_points: BTreeMap<PlayerName, i32>,
    /// Кто уже использовал «добрать и сыграть».
    pub special_used: BTreeSet<PlayerName>,
    /// По месту: выбрал ли игрок ориентацию руки.
    pub orientation_done: Vec<bool>,
    /// По месту: подтвердил ли игрок конец раунда.
    pub acknowledged: Vec<bool>,
    pub winner: Option<(PlayerName, WinReason)>,
    /// Следующий свободный id карты (для дубликатов при доборе).
    next_card_id: CardId,
}

impl RoundEngine {
    pub fn new(table_id: TableId, pool: Deck, names: &[PlayerName]) -> Self {
        let next_card_id = pool.cards.iter().map(|c| c.id + 1).max().unwrap_or(0);
        Self {
            table_id,
            pool,
            displayed: Combination::empty(),
            history: OperationLog::new(),
            extra_points: names.iter().map(|n| (n.clone(), 0)).collect(),
            special_used: BTreeSet::new(),
            orientation_done: vec![false; names.len()],
            acknowledged: vec![false; names.len()],
            winner: None,
            next_card_id,
        }
    }

    /// Id, который получит следующая созданная карта.
    pub fn peek_card_id(&self) -> CardId {
        self.next_card_id
    }

    pub(crate) fn take_card_id(&mut self) -> CardId {
        let id = self.next_card_id;
        self.next_card_id += 1;
        id
    }

    pub fn last_operation(&self) -> Option<&Operation> {
        self.history.last()
    }

    /// Каждая карта ровно в одном месте: в руке владельца (Hidden), на столе
    /// (Displayed), в зачёте (Scored) или в пуле нерозданной (Unassigned).
    pub fn check_partition(&self, seats: &[Player]) -> Result<(), EngineError> {
        let mut seen: BTreeSet<CardId> = BTreeSet::new();

        for player in seats {
            for &id in &player.hand {
                let card = self.pool.get(id).ok_or_else(|| {
                    EngineError::structural(format!("карта {id} из руки {} не в пуле", player.name))
                })?;
                if card.state != CardState::Hidden || card.owner.as_deref() != Some(player.name.as_str()) {
                    return Err(EngineError::structural(format!(
                        "карта {id} в руке {} имеет состояние {:?} и владельца {:?}",
                        player.name, card.state, card.owner
                    )));
                }
                if !seen.insert(id) {
                    return Err(EngineError::structural(format!("карта {id} лежит в двух руках")));
                }
            }
        }

        for id in self.displayed.card_ids() {
            let card = self
                .pool
                .get(id)
                .ok_or_else(|| EngineError::structural(format!("карта {id} со стола не в пуле")))?;
            if card.state != CardState::Displayed {
                return Err(EngineError::structural(format!(
                    "карта {id} на столе в состоянии {:?}",
                    card.state
                )));
            }
            if !seen.insert(id) {
                return Err(EngineError::structural(format!("карта {id} и на столе, и в руке")));
            }
        }

        for card in &self.pool.cards {
            if seen.contains(&card.id) {
                continue;
            }
            match card.state {
                CardState::Scored if card.owner.is_some() => {}
                CardState::Unassigned if card.owner.is_none() => {}
                state => {
                    return Err(EngineError::structural(format!(
                        "карта {} вне рук и стола в состоянии {:?} (владелец {:?})",
                        card.id, state, card.owner
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Стол вместе с текущим раундом. Все команды стола реализованы методами этого типа
/// (лобби, раздача, ход, конец раунда разнесены по модулям engine).
///
/// Любая команда либо применяется целиком, либо возвращает ошибку; частичные
/// изменения при ошибке откатывает `TableManager` (работает с копией).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GameTable {
    pub table: Table,
    pub round: Option<RoundEngine>,
}

impl GameTable {
    pub fn new(id: TableId, rules: RulesConfig) -> Self {
        let mut game = Self {
            table: Table::new(id, rules),
            round: None,
        };
        game.refresh_notice();
        game
    }

    pub fn id(&self) -> TableId {
        self.table.id
    }

    pub fn state(&self) -> TableState {
        self.table.state
    }

    pub fn round(&self) -> Result<&RoundEngine, EngineError> {
        self.round.as_ref().ok_or(EngineError::NoActiveRound)
    }

    pub(crate) fn round_mut(&mut self) -> Result<&mut RoundEngine, EngineError> {
        self.round.as_mut().ok_or(EngineError::NoActiveRound)
    }

    pub(crate) fn expect_table_state(&self, allowed: &[TableState]) -> Result<(), EngineError> {
        if allowed.contains(&self.table.state) {
            Ok(())
        } else {
            Err(EngineError::InvalidTableState {
                found: self.table.state,
            })
        }
    }

    pub(crate) fn seat_of(&self, name: &str) -> Result<SeatIndex, EngineError> {
        self.table
            .seat_of(name)
            .ok_or_else(|| EngineError::PlayerNotAtTable(name.to_string()))
    }

    pub fn player(&self, name: &str) -> Result<&Player, EngineError> {
        self.table
            .player(name)
            .ok_or_else(|| EngineError::PlayerNotAtTable(name.to_string()))
    }

    /// Рука игрока в каноническом виде.
    pub fn hand_of(&self, name: &str) -> Result<String, EngineError> {
        let player = self.player(name)?;
        let round = self.round()?;
        Ok(player.render_hand(&round.pool))
    }

    /// Комбинация на столе (пустая строка вне раунда).
    pub fn displayed_render(&self) -> String {
        self.round
            .as_ref()
            .map(|r| r.displayed.render())
            .unwrap_or_default()
    }

    /// Проверка инварианта разбиения карт (если раунд идёт).
    pub fn check_invariants(&self) -> Result<(), EngineError> {
        match &self.round {
            Some(round) => round.check_partition(&self.table.seats),
            None => Ok(()),
        }
    }

    /// Очистить раунд: карты в исходное состояние, игроки в Seated.
    pub(crate) fn clear_round(&mut self) {
        if let Some(mut round) = self.round.take() {
            for card in round.pool.cards.iter_mut() {
                card.reset();
            }
        }
        for player in self.table.seats.iter_mut() {
            player.clear_round();
        }
        self.table.state = self.table.open_state();
        self.refresh_notice();
    }

    /// Пересобрать публичное сообщение стола по текущему состоянию.
    pub(crate) fn refresh_notice(&mut self) {
        self.table.notice = render_notice(self);
    }
}

fn render_notice(game: &GameTable) -> String {
    let table = &game.table;
    let seated = table.seated_count();
    match table.state {
        TableState::Recruiting | TableState::Full => {
            let ready = table.ready_count();
            if seated < table.rules.min_seats as usize {
                format!(
                    "Ждём игроков: {seated}/{}, нужно хотя бы {}",
                    table.max_seats(),
                    table.rules.min_seats
                )
            } else {
                format!("Готовы {ready}/{seated}")
            }
        }
        TableState::Initializing => "Раздаём карты".to_string(),
        TableState::PlayerAck => {
            let done = game
                .round
                .as_ref()
                .map(|r| r.orientation_done.iter().filter(|&&d| d).count())
                .unwrap_or(0);
            format!("Выбор стороны руки: {done}/{seated}")
        }
        TableState::Playing => {
            let on_turn = table
                .seats
                .iter()
                .find(|p| p.state == PlayerState::OnTurn)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            format!("Ходит {on_turn}")
        }
        TableState::RoundEnded => {
            let (winner, reason) = match game.round.as_ref().and_then(|r| r.winner.as_ref()) {
                Some((name, WinReason::EmptyHand)) => (name.clone(), "рука пуста"),
                Some((name, WinReason::BeatAll)) => (name.clone(), "никто не перебил"),
                None => (String::new(), "?"),
            };
            let acked = game
                .round
                .as_ref()
                .map(|r| r.acknowledged.iter().filter(|&&a| a).count())
                .unwrap_or(0);
            format!("Раунд выиграл {winner} ({reason}), подтвердили {acked}/{seated}")
        }
    }
}
