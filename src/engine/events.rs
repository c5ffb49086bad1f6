//! События стола: что изменилось после успешной команды.
//!
//! Движок только возвращает события. Доставкой занимается реализация
//! `EventSink` (см. `infra::events`), которую вызывает `TableManager`
//! уже после снятия блокировки стола.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{PlayerName, TableId};
use crate::engine::operation::Operation;

/// Как закончился раунд.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum WinReason {
    /// Победитель сбросил последнюю карту.
    EmptyHand,
    /// Все остальные подряд только добирали с его комбинации.
    BeatAll,
}

/// Рука, выданная при раздаче. Видна только владельцу.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DealtHand {
    pub player: PlayerName,
    pub hand: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TableEvent {
    PlayerJoined {
        table_id: TableId,
        player: PlayerName,
    },
    PlayerLeft {
        table_id: TableId,
        player: PlayerName,
    },
    PlayerReady {
        table_id: TableId,
        player: PlayerName,
    },
    PlayerUnready {
        table_id: TableId,
        player: PlayerName,
    },
    HostChanged {
        table_id: TableId,
        host: PlayerName,
    },
    TableLocked {
        table_id: TableId,
    },
    TableUnlocked {
        table_id: TableId,
    },
    /// Раздача выполнена, каждому игроку своя рука.
    RoundInitialized {
        table_id: TableId,
        hands: Vec<DealtHand>,
    },
    OrientationChosen {
        table_id: TableId,
        player: PlayerName,
    },
    RoundStarted {
        table_id: TableId,
        first_player: PlayerName,
        displayed: String,
    },
    /// Ход передан игроку `target`.
    TurnAdvanced {
        table_id: TableId,
        target: PlayerName,
        displayed: String,
        last_operation: Operation,
    },
    RoundEnded {
        table_id: TableId,
        winner: PlayerName,
        reason: WinReason,
        scores: BTreeMap<PlayerName, i32>,
    },
    PlayerAcknowledged {
        table_id: TableId,
        player: PlayerName,
    },
}

impl TableEvent {
    pub fn table_id(&self) -> TableId {
        match self {
            TableEvent::PlayerJoined { table_id, .. }
            | TableEvent::PlayerLeft { table_id, .. }
            | TableEvent::PlayerReady { table_id, .. }
            | TableEvent::PlayerUnready { table_id, .. }
            | TableEvent::HostChanged { table_id, .. }
            | TableEvent::TableLocked { table_id }
            | TableEvent::TableUnlocked { table_id }
            | TableEvent::RoundInitialized { table_id, .. }
            | TableEvent::OrientationChosen { table_id, .. }
            | TableEvent::RoundStarted { table_id, .. }
            | TableEvent::TurnAdvanced { table_id, .. }
            | TableEvent::RoundEnded { table_id, .. }
            | TableEvent::PlayerAcknowledged { table_id, .. } => *table_id,
        }
    }

    /// Короткое имя события для логов.
    pub fn name(&self) -> &'static str {
        match self {
            TableEvent::PlayerJoined { .. } => "player_joined",
            TableEvent::PlayerLeft { .. } => "player_left",
            TableEvent::PlayerReady { .. } => "player_ready",
            TableEvent::PlayerUnready { .. } => "player_unready",
            TableEvent::HostChanged { .. } => "host_changed",
            TableEvent::TableLocked { .. } => "table_locked",
            TableEvent::TableUnlocked { .. } => "table_unlocked",
            TableEvent::RoundInitialized { .. } => "round_initialized",
            TableEvent::OrientationChosen { .. } => "orientation_chosen",
            TableEvent::RoundStarted { .. } => "round_started",
            TableEvent::TurnAdvanced { .. } => "turn_advanced",
            TableEvent::RoundEnded { .. } => "round_ended",
            TableEvent::PlayerAcknowledged { .. } => "player_acknowledged",
        }
    }
}

/// Получатель событий. Вызывается вне блокировок стола.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &TableEvent);
}
