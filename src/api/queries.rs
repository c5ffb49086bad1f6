use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::dto::{RoundInfoDto, SeatingDto};
use crate::api::errors::ApiError;
use crate::domain::{PlayerName, TableId};
use crate::engine::{RandomSource, TableManager};
use crate::infra::mapping::{round_info_to_dto, seating_to_dto};

/// Запросы "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Query {
    /// Рука игрока (видна только ему самому).
    GetHand { player: PlayerName },

    /// Текущие очки игрока в раунде.
    GetLiveScore { player: PlayerName },

    /// Публичное сообщение стола.
    GetTableInfo { table_id: TableId },

    GetRoundInfo { table_id: TableId },

    /// Накопленные очки за все раунды.
    GetCumulativeScore { table_id: TableId },

    GetHistory { table_id: TableId },

    GetSeating { table_id: TableId },

    /// Список столов (для лобби).
    ListTables,
}

/// Результат запроса "только чтение".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryResponse {
    Hand(String),
    LiveScore(i32),
    TableInfo(String),
    RoundInfo(RoundInfoDto),
    CumulativeScore(BTreeMap<PlayerName, i32>),
    History(Vec<String>),
    Seating(SeatingDto),
    Tables(Vec<TableId>),
}

pub fn parse_query(raw: &str) -> Result<Query, ApiError> {
    serde_json::from_str(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Ответить на запрос. Чтение идёт под блокировкой на чтение стола,
/// поэтому видно только целиком применённые команды.
pub fn run_query<R: RandomSource>(manager: &TableManager<R>, query: &Query) -> Result<QueryResponse, ApiError> {
    let response = match query {
        Query::GetHand { player } => {
            QueryResponse::Hand(manager.read_for_player(player, |g| g.hand_of(player))?)
        }
        Query::GetLiveScore { player } => {
            QueryResponse::LiveScore(manager.read_for_player(player, |g| g.live_score(player))?)
        }
        Query::GetTableInfo { table_id } => {
            QueryResponse::TableInfo(manager.read_table(*table_id, |g| Ok(g.table.notice.clone()))?)
        }
        Query::GetRoundInfo { table_id } => {
            QueryResponse::RoundInfo(manager.read_table(*table_id, round_info_to_dto)?)
        }
        Query::GetCumulativeScore { table_id } => QueryResponse::CumulativeScore(
            manager.read_table(*table_id, |g| Ok(g.cumulative_scores().clone()))?,
        ),
        Query::GetHistory { table_id } => {
            QueryResponse::History(manager.read_table(*table_id, |g| g.visible_history())?)
        }
        Query::GetSeating { table_id } => {
            QueryResponse::Seating(manager.read_table(*table_id, |g| Ok(seating_to_dto(g)))?)
        }
        Query::ListTables => QueryResponse::Tables(manager.table_ids()),
    };
    Ok(response)
}
