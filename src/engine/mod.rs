//! Движок стола: лобби, раздача, ходы, конец раунда.
//!
//! Высокоуровневый объект: `GameTable` (стол + текущий раунд `RoundEngine`).
//! Основные операции:
//!   - `add_player` / `remove_player` / `player_ready` – лобби
//!   - `choose_orientation` – выбор стороны руки после раздачи
//!   - `play` / `draw` / `draw_and_play` – ход игрока
//!   - `acknowledge_round_end` – подтверждение конца раунда
//!
//! Реестр столов с блокировками: `TableManager`.

pub mod actions;
pub mod dealing;
pub mod errors;
pub mod events;
pub mod game_loop;
pub mod lobby;
pub mod operation;
pub mod positions;
pub mod round_end;
pub mod scoring;
pub mod table_manager;
pub mod turn;
pub mod validation;

pub use actions::{DrawRequest, TurnAction, TurnActionKind};
pub use errors::{EngineError, ErrorKind};
pub use events::{DealtHand, EventSink, TableEvent, WinReason};
pub use game_loop::{GameTable, RoundEngine};
pub use operation::{Operation, OperationKind, OperationLog, OperationType};
pub use scoring::round_score;

/// RNG интерфейс для engine.
/// Реализации лежат в infra (обёртка над `rand`).
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);

    /// Случайная сторона карты при раздаче.
    fn coin_flip(&mut self) -> bool;

    /// Равномерный индекс в `0..len`; `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

pub use table_manager::{ManagerError, TableManager};
