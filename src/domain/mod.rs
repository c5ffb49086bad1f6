//! Доменная модель: двусторонние карты, комбинации, колода, игроки, столы, правила.

pub mod card;
pub mod errors;
pub mod combination;
pub mod deck;
pub mod player;
pub mod rules;
pub mod table;

// Базовые идентификаторы.
// Игрок за столом идентифицируется именем (на нём построены таблицы очков).
pub type PlayerName = String;
pub type TableId = u64;
/// Номер карты внутри одного раунда (уникален в пуле стола).
pub type CardId = u32;

// Удобные реэкспорты, чтобы в других модулях писать crate::domain::Card и т.п.
pub use card::*;
pub use errors::DomainError;
pub use combination::*;
pub use deck::*;
pub use player::*;
pub use rules::*;
pub use table::*;
