use tracing::{debug, info};

use crate::domain::card::{Card, CardState};
use crate::domain::player::PlayerState;
use crate::domain::SeatIndex;
use crate::engine::actions::{DrawRequest, TurnAction, TurnActionKind};
use crate::engine::errors::EngineError;
use crate::engine::events::TableEvent;
use crate::engine::game_loop::GameTable;
use crate::engine::operation::{OperationKind, OperationType};
use crate::engine::validation::{next_actor, validate_draw, validate_play, validate_turn_order};

impl GameTable {
    /// Применить ход игрока.
    pub fn apply_turn(&mut self, action: &TurnAction) -> Result<Vec<TableEvent>, EngineError> {
        match action.kind {
            TurnActionKind::Play { begin, end } => self.play(&action.player, begin, end),
            TurnActionKind::Draw(req) => self.draw(&action.player, req),
            TurnActionKind::DrawAndPlay(req) => self.draw_and_play(&action.player, req),
        }
    }

    /// Сыграть `hand[begin..end]`.
    pub fn play(&mut self, name: &str, begin: usize, end: usize) -> Result<Vec<TableEvent>, EngineError> {
        let seat = validate_turn_order(self, name, OperationType::Play)?;
        let combo = self.table.seats[seat].select_range(begin, end, &self.round()?.pool)?;
        validate_play(self, seat, &combo)?;
        self.turn_end(seat, OperationKind::Play(combo))
    }

    pub fn draw(&mut self, name: &str, req: DrawRequest) -> Result<Vec<TableEvent>, EngineError> {
        self.draw_inner(name, req, false)
    }

    /// Добор с правом сразу сыграть. Один раз за раунд на игрока.
    pub fn draw_and_play(&mut self, name: &str, req: DrawRequest) -> Result<Vec<TableEvent>, EngineError> {
        self.draw_inner(name, req, true)
    }

    fn draw_inner(&mut self, name: &str, req: DrawRequest, special: bool) -> Result<Vec<TableEvent>, EngineError> {
        let proposed = if special {
            OperationType::DrawAndPlay
        } else {
            OperationType::Draw
        };
        let seat = validate_turn_order(self, name, proposed)?;
        let card = self.replacement_card(name, req)?;
        validate_draw(self, seat, &card, req.insert_at, special)?;

        let insert_at = req.insert_at;
        let kind = if special {
            OperationKind::DrawAndPlay { card, insert_at }
        } else {
            OperationKind::Draw { card, insert_at }
        };
        self.turn_end(seat, kind)
    }

    /// Дубликат крайней карты стола для руки игрока.
    fn replacement_card(&self, name: &str, req: DrawRequest) -> Result<Card, EngineError> {
        let round = self.round()?;
        let target = round
            .displayed
            .end_card(req.from_top)
            .ok_or(EngineError::NothingToDraw)?;
        let claimed = round
            .pool
            .get(target.id)
            .ok_or_else(|| EngineError::structural(format!("карта {} со стола не в пуле", target.id)))?;

        let mut card = Card::new(round.peek_card_id(), claimed.up, claimed.down, claimed.up_active);
        card.set_state(CardState::Hidden);
        card.set_owner(Some(name.to_string()));
        if req.flip {
            card.flip()?;
        }
        Ok(card)
    }

    /// Ход принят: запись в историю, разрешение, проверка победы,
    /// передача хода.
    fn turn_end(&mut self, seat: SeatIndex, kind: OperationKind) -> Result<Vec<TableEvent>, EngineError> {
        let table_id = self.table.id;
        let extra_per_draw = self.table.rules.extra_point_per_draw;
        let actor = self.table.seats[seat].name.clone();

        let round = self.round.as_mut().ok_or(EngineError::NoActiveRound)?;
        let op = round.history.push(actor.clone(), kind).clone();
        debug!(table_id, player = %actor, seat, operation = %op.full_log(), "ход принят");

        let player = &mut self.table.seats[seat];
        match &op.kind {
            OperationKind::Play(combo) => {
                for id in round.displayed.card_ids() {
                    let card = round
                        .pool
                        .get_mut(id)
                        .ok_or_else(|| EngineError::structural(format!("карта {id} со стола не в пуле")))?;
                    card.set_state(CardState::Scored);
                    card.set_owner(Some(actor.clone()));
                }
                for id in combo.card_ids() {
                    let card = round
                        .pool
                        .get_mut(id)
                        .ok_or_else(|| EngineError::structural(format!("сыгранной карты {id} нет в пуле")))?;
                    card.set_state(CardState::Displayed);
                    player.hand.retain(|&h| h != id);
                }
                round.displayed = combo.clone();
            }
            OperationKind::Draw { card, insert_at } | OperationKind::DrawAndPlay { card, insert_at } => {
                let (target_id, owner) = round
                    .pool
                    .cards
                    .iter()
                    .find(|c| c.state == CardState::Displayed && c.same_faces(card.up, card.down))
                    .map(|c| (c.id, c.owner.clone()))
                    .ok_or_else(|| EngineError::structural("забираемой карты нет на столе"))?;
                let owner = owner.ok_or_else(|| {
                    EngineError::structural(format!("у карты {target_id} на столе нет владельца"))
                })?;
                *round.extra_points.entry(owner).or_insert(0) += extra_per_draw;

                round.pool.remove(target_id);
                let new_id = round.take_card_id();
                if new_id != card.id {
                    return Err(EngineError::structural(format!(
                        "id дубликата {} не совпал с выданным {new_id}",
                        card.id
                    )));
                }
                round.pool.push(card.clone());
                player.hand.insert(*insert_at, card.id);
                round.displayed = round.displayed.without(target_id);

                if op.op_type() == OperationType::DrawAndPlay {
                    round.special_used.insert(actor.clone());
                }
            }
            OperationKind::GameStart | OperationKind::GameEnd => {
                return Err(EngineError::structural("служебная операция как ход игрока"));
            }
        }
        player.set_state(PlayerState::WaitingTurn);

        round.check_partition(&self.table.seats)?;

        if let Some((winner, reason)) = self.detect_win(seat)? {
            return self.settle_round(winner, reason);
        }

        let next = next_actor(self, seat, op.op_type())
            .ok_or_else(|| EngineError::structural("некому передать ход"))?;
        let target = self.table.seats[next].name.clone();
        self.table.seats[next].set_state(PlayerState::OnTurn);
        self.refresh_notice();

        let displayed = self.displayed_render();
        info!(table_id, player = %actor, seat, target = %target, displayed = %displayed, "ход передан");
        Ok(vec![TableEvent::TurnAdvanced {
            table_id,
            target,
            displayed,
            last_operation: op,
        }])
    }
}
