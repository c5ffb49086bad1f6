use crate::api::dto::{EventDto, OperationDto, RoundInfoDto, SeatCountsDto, SeatDto, SeatingDto};
use crate::domain::table::TableState;
use crate::engine::errors::EngineError;
use crate::engine::events::TableEvent;
use crate::engine::game_loop::GameTable;
use crate::engine::operation::Operation;
use crate::engine::scoring::{hidden_count, scored_count};

/// Operation -> OperationDto (позиция вставки остаётся только в логах).
pub fn operation_to_dto(op: &Operation) -> OperationDto {
    OperationDto {
        index: op.index,
        actor: op.actor.clone(),
        kind: op.op_type(),
        description: op.to_string(),
        detail: op.detail(),
    }
}

/// Публичная информация о раунде. Только во время игры и после неё.
pub fn round_info_to_dto(game: &GameTable) -> Result<RoundInfoDto, EngineError> {
    if !matches!(game.state(), TableState::Playing | TableState::RoundEnded) {
        return Err(EngineError::InvalidTableState {
            found: game.state(),
        });
    }
    let round = game.round()?;

    let seats = game
        .table
        .seats
        .iter()
        .map(|p| SeatCountsDto {
            player: p.name.clone(),
            goal_cards: scored_count(round, &p.name),
            remaining_cards: hidden_count(round, &p.name),
        })
        .collect();

    Ok(RoundInfoDto {
        table_id: game.id(),
        turn: round.history.len(),
        players: game.table.names(),
        seats,
        extra_points: round.extra_points.clone(),
        displayed: round.displayed.render(),
        last_operation: round.last_operation().map(operation_to_dto),
    })
}

pub fn seating_to_dto(game: &GameTable) -> SeatingDto {
    let table = &game.table;
    SeatingDto {
        table_id: table.id,
        state: table.state,
        locked: table.locked,
        host: table.host().map(|p| p.name.clone()),
        seats: table
            .seats
            .iter()
            .enumerate()
            .map(|(idx, p)| SeatDto {
                seat: idx as u8,
                name: p.name.clone(),
                state: p.state,
                is_host: idx == table.host_seat,
            })
            .collect(),
    }
}

/// Событие для игрока `viewer`. Из раздачи он видит только свою руку.
pub fn event_to_dto(event: &TableEvent, viewer: &str) -> EventDto {
    let mut dto = EventDto {
        kind: event.name().to_string(),
        table_id: event.table_id(),
        player: None,
        detail: None,
        displayed: None,
        operation: None,
    };

    match event {
        TableEvent::PlayerJoined { player, .. }
        | TableEvent::PlayerLeft { player, .. }
        | TableEvent::PlayerReady { player, .. }
        | TableEvent::PlayerUnready { player, .. }
        | TableEvent::OrientationChosen { player, .. }
        | TableEvent::PlayerAcknowledged { player, .. } => dto.player = Some(player.clone()),
        TableEvent::HostChanged { host, .. } => dto.player = Some(host.clone()),
        TableEvent::TableLocked { .. } | TableEvent::TableUnlocked { .. } => {}
        TableEvent::RoundInitialized { hands, .. } => {
            if let Some(own) = hands.iter().find(|h| h.player == viewer) {
                dto.player = Some(own.player.clone());
                dto.detail = Some(own.hand.clone());
            }
        }
        TableEvent::RoundStarted {
            first_player,
            displayed,
            ..
        } => {
            dto.player = Some(first_player.clone());
            dto.detail = Some(displayed.clone());
            dto.displayed = Some(displayed.clone());
        }
        TableEvent::TurnAdvanced {
            target,
            displayed,
            last_operation,
            ..
        } => {
            dto.player = Some(target.clone());
            dto.detail = Some(last_operation.to_string());
            dto.displayed = Some(displayed.clone());
            dto.operation = Some(operation_to_dto(last_operation));
        }
        TableEvent::RoundEnded {
            winner,
            reason,
            scores,
            ..
        } => {
            let scores: Vec<String> = scores.iter().map(|(n, s)| format!("{n}: {s}")).collect();
            dto.player = Some(winner.clone());
            dto.detail = Some(format!("{reason:?}; {}", scores.join(", ")));
        }
    }
    dto
}
