//! Подсчёт очков и чтение состояния раунда.

use std::collections::BTreeMap;

use crate::domain::card::CardState;
use crate::domain::table::TableState;
use crate::domain::PlayerName;
use crate::engine::errors::EngineError;
use crate::engine::game_loop::{GameTable, RoundEngine};
use crate::engine::operation::Operation;

/// Очки раунда: добор с игрока + карты в зачёте − карты в руке.
pub fn round_score(round: &RoundEngine, name: &str) -> i32 {
    let extra = round.extra_points.get(name).copied().unwrap_or(0);
    extra + scored_count(round, name) as i32 - hidden_count(round, name) as i32
}

pub fn scored_count(round: &RoundEngine, name: &str) -> usize {
    count_owned(round, name, CardState::Scored)
}

pub fn hidden_count(round: &RoundEngine, name: &str) -> usize {
    count_owned(round, name, CardState::Hidden)
}

fn count_owned(round: &RoundEngine, name: &str, state: CardState) -> usize {
    round
        .pool
        .cards
        .iter()
        .filter(|c| c.state == state && c.owner.as_deref() == Some(name))
        .count()
}

const LIVE_STATES: &[TableState] = &[TableState::Playing, TableState::RoundEnded];

impl GameTable {
    /// Текущие очки игрока. Только во время игры и после её конца.
    pub fn live_score(&self, name: &str) -> Result<i32, EngineError> {
        self.expect_table_state(LIVE_STATES)?;
        self.player(name)?;
        Ok(round_score(self.round()?, name))
    }

    pub fn live_scores(&self) -> Result<BTreeMap<PlayerName, i32>, EngineError> {
        self.expect_table_state(LIVE_STATES)?;
        let round = self.round()?;
        Ok(self
            .table
            .seats
            .iter()
            .map(|p| (p.name.clone(), round_score(round, &p.name)))
            .collect())
    }

    pub fn cumulative_scores(&self) -> &BTreeMap<PlayerName, i32> {
        &self.table.total_scores
    }

    pub fn turn_count(&self) -> Result<usize, EngineError> {
        self.expect_table_state(LIVE_STATES)?;
        Ok(self.round()?.history.len())
    }

    /// Видимая история. Во время игры последняя запись скрыта.
    pub fn visible_history(&self) -> Result<Vec<String>, EngineError> {
        self.expect_table_state(LIVE_STATES)?;
        let ops = self.round()?.history.operations();
        let visible: &[Operation] = match self.table.state {
            TableState::Playing => &ops[..ops.len().saturating_sub(1)],
            _ => ops,
        };
        Ok(visible.iter().map(|op| op.to_string()).collect())
    }
}
