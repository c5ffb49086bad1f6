//! Проверки хода. Ничего не меняют: либо Ok, либо ошибка валидации.

use crate::domain::card::Card;
use crate::domain::combination::Combination;
use crate::domain::errors::DomainError;
use crate::domain::player::PlayerState;
use crate::domain::table::TableState;
use crate::domain::SeatIndex;
use crate::engine::errors::EngineError;
use crate::engine::game_loop::GameTable;
use crate::engine::operation::OperationType;
use crate::engine::positions::next_seat;

/// Очерёдность: может ли `actor` сейчас сделать ход типа `proposed`.
/// Возвращает место игрока.
pub fn validate_turn_order(
    game: &GameTable,
    actor: &str,
    proposed: OperationType,
) -> Result<SeatIndex, EngineError> {
    game.expect_table_state(&[TableState::Playing])?;
    let seat = game.seat_of(actor)?;
    game.table.seats[seat].expect_state(&[PlayerState::OnTurn])?;

    let round = game.round()?;
    let last = round
        .last_operation()
        .ok_or_else(|| EngineError::structural("история раунда пуста во время игры"))?;
    let last_seat = game.table.seat_of(&last.actor).ok_or_else(|| {
        EngineError::structural(format!("автор последней операции {} не за столом", last.actor))
    })?;

    match last.op_type() {
        OperationType::GameStart => {
            if seat != last_seat {
                return Err(EngineError::NotPlayersTurn(actor.to_string()));
            }
        }
        OperationType::Play | OperationType::Draw => {
            if Some(seat) != next_seat(&game.table, last_seat) {
                return Err(EngineError::NotPlayersTurn(actor.to_string()));
            }
        }
        OperationType::DrawAndPlay => {
            if seat != last_seat {
                return Err(EngineError::NotPlayersTurn(actor.to_string()));
            }
            if proposed != OperationType::Play {
                return Err(EngineError::PlayRequired);
            }
        }
        OperationType::GameEnd => {
            return Err(EngineError::InvalidTableState {
                found: game.table.state,
            })
        }
    }
    Ok(seat)
}

/// Комбинация допустима, лежит в руке и сильнее стола.
pub fn validate_play(game: &GameTable, seat: SeatIndex, combo: &Combination) -> Result<(), EngineError> {
    let round = game.round()?;
    if !combo.is_playable() {
        return Err(EngineError::InvalidCombination(combo.to_string()));
    }
    game.table.seats[seat].holds(combo, &round.pool)?;
    if !combo.outranks(&round.displayed) {
        return Err(EngineError::InsufficientRank {
            played: combo.to_string(),
            displayed: round.displayed.to_string(),
        });
    }
    Ok(())
}

/// Добор: карта-дубликат соответствует крайней карте стола,
/// позиция вставки в пределах руки, особый ход ещё не использован.
pub fn validate_draw(
    game: &GameTable,
    seat: SeatIndex,
    card: &Card,
    insert_at: usize,
    special: bool,
) -> Result<(), EngineError> {
    let round = game.round()?;
    let player = &game.table.seats[seat];

    if special && round.special_used.contains(&player.name) {
        return Err(EngineError::SpecialMoveUsed(player.name.clone()));
    }

    let ends = [round.displayed.end_card(true), round.displayed.end_card(false)];
    let target = ends
        .into_iter()
        .flatten()
        .find(|c| card.same_faces(c.value, c.other))
        .ok_or(EngineError::NothingToDraw)?;
    // Своя карта тоже добирается: очко тогда получает сам добирающий.
    if round.pool.get(target.id).is_none() {
        return Err(EngineError::structural(format!("карта {} со стола не в пуле", target.id)));
    }

    if insert_at > player.hand.len() {
        return Err(DomainError::InvalidInsertPosition {
            position: insert_at,
            hand_len: player.hand.len(),
        }
        .into());
    }
    Ok(())
}

/// Кто ходит после принятой операции.
pub fn next_actor(game: &GameTable, seat: SeatIndex, accepted: OperationType) -> Option<SeatIndex> {
    match accepted {
        OperationType::DrawAndPlay => Some(seat),
        _ => next_seat(&game.table, seat),
    }
}
