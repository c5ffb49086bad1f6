//! Внешний API движка.
//!
//! Здесь описываются:
//! - команды (commands.rs): всё, что меняет состояние стола, и их строгий разбор;
//! - запросы (queries.rs): только чтение;
//! - DTO (dto.rs): структуры для клиента;
//! - ошибки (errors.rs): то, что видит клиент.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod queries;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use queries::*;
