use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::domain::card::CardState;
use crate::domain::player::PlayerState;
use crate::domain::table::TableState;
use crate::domain::{PlayerName, SeatIndex};
use crate::engine::errors::EngineError;
use crate::engine::events::{TableEvent, WinReason};
use crate::engine::game_loop::GameTable;
use crate::engine::operation::{OperationKind, OperationType};
use crate::engine::scoring::round_score;

impl GameTable {
    /// Проверка победы после хода игрока на месте `seat`.
    /// Сначала «все добирали с него», потом пустая рука.
    pub(crate) fn detect_win(&self, seat: SeatIndex) -> Result<Option<(SeatIndex, WinReason)>, EngineError> {
        let round = self.round()?;
        let seats = self.table.seated_count();
        let history = &round.history;

        if seats > 2 && history.len() >= seats {
            let all_draws = history
                .tail(seats - 1)
                .iter()
                .all(|op| op.op_type() == OperationType::Draw);
            let origin = &history.operations()[history.len() - seats];
            if all_draws && origin.op_type() == OperationType::Play {
                let winner = self.table.seat_of(&origin.actor).ok_or_else(|| {
                    EngineError::structural(format!("победитель {} не за столом", origin.actor))
                })?;
                return Ok(Some((winner, WinReason::BeatAll)));
            }
        }

        let player = &self.table.seats[seat];
        if player.hand.is_empty() {
            let still_hidden = round
                .pool
                .cards
                .iter()
                .any(|c| c.state == CardState::Hidden && c.owner.as_deref() == Some(player.name.as_str()));
            if still_hidden {
                return Err(EngineError::structural(format!(
                    "рука {} пуста, но в пуле остались его скрытые карты",
                    player.name
                )));
            }
            return Ok(Some((seat, WinReason::EmptyHand)));
        }
        Ok(None)
    }

    /// Зафиксировать победу: GameEnd в историю, очки раунда в общий счёт.
    pub(crate) fn settle_round(
        &mut self,
        winner: SeatIndex,
        reason: WinReason,
    ) -> Result<Vec<TableEvent>, EngineError> {
        let table_id = self.table.id;
        let winner_name = self.table.seats[winner].name.clone();
        let names = self.table.names();

        let round = self.round.as_mut().ok_or(EngineError::NoActiveRound)?;
        round.history.push(winner_name.clone(), OperationKind::GameEnd);
        round.winner = Some((winner_name.clone(), reason));
        round.acknowledged = vec![false; names.len()];

        let scores: BTreeMap<PlayerName, i32> = names
            .iter()
            .map(|name| (name.clone(), round_score(round, name)))
            .collect();
        for (name, score) in &scores {
            *self.table.total_scores.entry(name.clone()).or_insert(0) += score;
        }

        for player in self.table.seats.iter_mut() {
            player.set_state(PlayerState::RoundEnded);
        }
        self.table.state = TableState::RoundEnded;
        self.refresh_notice();

        info!(table_id, player = %winner_name, ?reason, ?scores, "раунд окончен");
        Ok(vec![TableEvent::RoundEnded {
            table_id,
            winner: winner_name,
            reason,
            scores,
        }])
    }

    /// Подтверждение конца раунда. Когда подтвердили все, стол очищается.
    pub fn acknowledge_round_end(&mut self, name: &str) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_table_state(&[TableState::RoundEnded])?;
        let table_id = self.table.id;
        let seat = self.seat_of(name)?;
        self.table.seats[seat].acknowledge_round_end()?;

        let round = self.round_mut()?;
        round.acknowledged[seat] = true;
        let all_acked = round.acknowledged.iter().all(|&a| a);

        debug!(table_id, player = name, seat, "конец раунда подтверждён");
        let events = vec![TableEvent::PlayerAcknowledged {
            table_id,
            player: name.to_string(),
        }];

        if all_acked {
            self.clear_round();
            info!(table_id, state = ?self.table.state, "раунд очищен, стол снова открыт");
        } else {
            self.refresh_notice();
        }
        Ok(events)
    }
}
