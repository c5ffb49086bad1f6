//! Лобби стола: посадка, уход, готовность и права хозяина.

use tracing::{debug, info};

use crate::domain::player::Player;
use crate::domain::table::TableState;
use crate::engine::errors::EngineError;
use crate::engine::events::TableEvent;
use crate::engine::game_loop::GameTable;
use crate::engine::positions::host_after_leave;
use crate::engine::RandomSource;

/// Где разрешены посадка и уход. RoundEnded сначала очищается.
const SEATING_STATES: &[TableState] = &[
    TableState::Recruiting,
    TableState::Full,
    TableState::RoundEnded,
];

const OPEN_STATES: &[TableState] = &[TableState::Recruiting, TableState::Full];

impl GameTable {
    /// Посадить нового игрока.
    pub fn add_player(&mut self, name: &str) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_table_state(SEATING_STATES)?;
        let table_id = self.table.id;
        if self.table.seat_of(name).is_some() {
            return Err(EngineError::AlreadySeated(name.to_string()));
        }
        if self.table.locked {
            return Err(EngineError::TableLocked(table_id));
        }
        if self.table.is_full() {
            return Err(EngineError::TableFull(table_id));
        }

        let mut player = Player::new(name);
        player.join_table(table_id)?;

        if self.table.state == TableState::RoundEnded {
            self.clear_round();
        }

        self.table.seats.push(player);
        self.table.total_scores.insert(name.to_string(), 0);
        self.table.state = self.table.open_state();
        self.refresh_notice();

        info!(
            table_id,
            player = name,
            seat = self.table.seated_count() - 1,
            state = ?self.table.state,
            "игрок сел за стол"
        );

        Ok(vec![TableEvent::PlayerJoined {
            table_id,
            player: name.to_string(),
        }])
    }

    /// Убрать игрока из-за стола. Посреди раунда нельзя.
    pub fn remove_player(&mut self, name: &str) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_table_state(SEATING_STATES)?;
        let table_id = self.table.id;
        let seat = self.seat_of(name)?;
        // Проверка на копии: сам игрок меняется только после всех проверок.
        self.table.seats[seat].clone().quit_table()?;

        if self.table.state == TableState::RoundEnded {
            self.clear_round();
        }

        let mut player = self.table.seats.remove(seat);
        player.quit_table()?;
        self.table.total_scores.remove(name);

        let mut events = vec![TableEvent::PlayerLeft {
            table_id,
            player: name.to_string(),
        }];

        let host_left = seat == self.table.host_seat;
        self.table.host_seat = host_after_leave(self.table.host_seat, seat);
        if host_left {
            if let Some(host) = self.table.host() {
                events.push(TableEvent::HostChanged {
                    table_id,
                    host: host.name.clone(),
                });
            }
        }

        self.table.state = self.table.open_state();
        self.refresh_notice();

        info!(table_id, player = name, seat, state = ?self.table.state, "игрок ушёл из-за стола");
        Ok(events)
    }

    /// Игрок готов. Когда готовы все (и мест достаточно), сразу раздаём.
    pub fn player_ready<R: RandomSource>(
        &mut self,
        name: &str,
        rng: &mut R,
    ) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_table_state(OPEN_STATES)?;
        let table_id = self.table.id;
        let seat = self.seat_of(name)?;
        self.table.seats[seat].ready_for_round()?;

        let mut events = vec![TableEvent::PlayerReady {
            table_id,
            player: name.to_string(),
        }];
        debug!(table_id, player = name, seat, "игрок готов");

        let seated = self.table.seated_count();
        if self.table.ready_count() == seated && self.table.rules.seats_allowed(seated) {
            events.extend(self.deal(rng)?);
        } else {
            self.refresh_notice();
        }
        Ok(events)
    }

    pub fn player_unready(&mut self, name: &str) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_table_state(OPEN_STATES)?;
        let table_id = self.table.id;
        let seat = self.seat_of(name)?;
        self.table.seats[seat].unready()?;
        self.refresh_notice();

        debug!(table_id, player = name, seat, "игрок отменил готовность");
        Ok(vec![TableEvent::PlayerUnready {
            table_id,
            player: name.to_string(),
        }])
    }

    /// Закрыть стол для новых игроков.
    pub fn lock_table(&mut self, name: &str) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_host(name)?;
        self.table.locked = true;
        info!(table_id = self.table.id, player = name, "стол закрыт");
        Ok(vec![TableEvent::TableLocked {
            table_id: self.table.id,
        }])
    }

    pub fn unlock_table(&mut self, name: &str) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_host(name)?;
        self.table.locked = false;
        info!(table_id = self.table.id, player = name, "стол открыт");
        Ok(vec![TableEvent::TableUnlocked {
            table_id: self.table.id,
        }])
    }

    /// Передать права хозяина другому игроку за этим столом.
    pub fn transfer_host(&mut self, name: &str, target: &str) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_host(name)?;
        let target_seat = self.seat_of(target)?;
        self.table.host_seat = target_seat;
        info!(table_id = self.table.id, player = name, target, "хозяин стола сменился");
        Ok(vec![TableEvent::HostChanged {
            table_id: self.table.id,
            host: target.to_string(),
        }])
    }

    fn expect_host(&self, name: &str) -> Result<(), EngineError> {
        self.expect_table_state(OPEN_STATES)?;
        let seat = self.seat_of(name)?;
        if seat != self.table.host_seat {
            return Err(EngineError::NotHost(name.to_string()));
        }
        Ok(())
    }
}
