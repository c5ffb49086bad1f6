//! Движок карточной игры со взятками в духе Scout: правила, стол, реестр столов.
//!
//! Здесь описываем ABI (Operation / Message / Query / Response) для Linera.

pub mod api;
pub mod domain;
pub mod engine;
pub mod infra;

use linera_sdk::linera_base_types::{ContractAbi, ServiceAbi};
use serde::{Deserialize, Serialize};

use crate::api::{Command, Query, QueryResponse};

/// Операции (внешние команды), которые модуль принимает.
///
/// Одна операция = одна команда из api::Command.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ScoutOperation {
    Command(Command),
}

/// Сообщения между приложениями Linera. Пока не нужны.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ScoutMessage {}

/// Запросы к сервису (read-only).
pub type ScoutQuery = Query;

/// Ответы на запросы.
pub type ScoutResponse = QueryResponse;

/// ABI для контракта и сервиса.
#[derive(Clone, Debug)]
pub struct ScoutAbi;

impl ContractAbi for ScoutAbi {
    type Operation = ScoutOperation;
    type Response = ();
}

impl ServiceAbi for ScoutAbi {
    type Query = ScoutQuery;
    type QueryResponse = ScoutResponse;
}
