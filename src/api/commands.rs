use serde::{Deserialize, Serialize};

use crate::api::dto::CommandResponse;
use crate::api::errors::ApiError;
use crate::domain::{PlayerName, TableId};
use crate::engine::actions::DrawRequest;
use crate::engine::{RandomSource, TableManager};
use crate::infra::mapping::event_to_dto;

/// Команда верхнего уровня: кто и что хочет сделать.
///
/// На проводе это JSON вида
/// `{"player":"alice","command":{"type":"draw","from_top":true,"flip":false,"insert_at":0}}`.
/// Лишнее или пропущенное поле даёт `ApiError::BadRequest`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Command {
    pub player: PlayerName,
    pub command: TableCommand,
}

/// Команды игрока. Один вариант = одна операция стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum TableCommand {
    /// Сесть за стол; без `table_id` создаётся новый.
    Join {
        #[serde(default)]
        table_id: Option<TableId>,
    },
    Leave,
    Ready,
    Unready,
    ChooseOrientation {
        reverse: bool,
    },
    /// Сыграть `hand[begin..end]`.
    Play {
        begin: usize,
        end: usize,
    },
    Draw {
        from_top: bool,
        flip: bool,
        insert_at: usize,
    },
    DrawAndPlay {
        from_top: bool,
        flip: bool,
        insert_at: usize,
    },
    AcknowledgeRoundEnd,
    LockTable,
    UnlockTable,
    TransferHost {
        target: PlayerName,
    },
}

/// Строгий разбор входящей команды.
pub fn parse_command(raw: &str) -> Result<Command, ApiError> {
    let command: Command =
        serde_json::from_str(raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if command.player.trim().is_empty() {
        return Err(ApiError::BadRequest("пустое имя игрока".into()));
    }
    Ok(command)
}

/// Выполнить команду через менеджер столов.
///
/// В ответе события отфильтрованы для автора команды.
pub fn execute_command<R: RandomSource>(
    manager: &TableManager<R>,
    command: &Command,
) -> Result<CommandResponse, ApiError> {
    let name = command.player.as_str();
    let (table_id, events) = match &command.command {
        TableCommand::Join { table_id } => manager.join(name, *table_id)?,
        TableCommand::Leave => manager.leave(name)?,
        TableCommand::Ready => manager.ready(name)?,
        TableCommand::Unready => manager.unready(name)?,
        TableCommand::ChooseOrientation { reverse } => manager.choose_orientation(name, *reverse)?,
        TableCommand::Play { begin, end } => manager.play(name, *begin, *end)?,
        TableCommand::Draw {
            from_top,
            flip,
            insert_at,
        } => manager.draw(
            name,
            DrawRequest {
                from_top: *from_top,
                flip: *flip,
                insert_at: *insert_at,
            },
        )?,
        TableCommand::DrawAndPlay {
            from_top,
            flip,
            insert_at,
        } => manager.draw_and_play(
            name,
            DrawRequest {
                from_top: *from_top,
                flip: *flip,
                insert_at: *insert_at,
            },
        )?,
        TableCommand::AcknowledgeRoundEnd => manager.acknowledge_round_end(name)?,
        TableCommand::LockTable => manager.lock_table(name)?,
        TableCommand::UnlockTable => manager.unlock_table(name)?,
        TableCommand::TransferHost { target } => manager.transfer_host(name, target)?,
    };

    Ok(CommandResponse {
        table_id,
        events: events.iter().map(|e| event_to_dto(e, name)).collect(),
    })
}
