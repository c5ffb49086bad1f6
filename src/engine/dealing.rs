use tracing::{debug, info};

use crate::domain::deck::{Deck, DECK_SIZE};
use crate::domain::player::PlayerState;
use crate::domain::table::TableState;
use crate::engine::errors::EngineError;
use crate::engine::events::{DealtHand, TableEvent};
use crate::engine::game_loop::{GameTable, RoundEngine};
use crate::engine::operation::OperationKind;
use crate::engine::RandomSource;

impl GameTable {
    /// Раздача: новая колода из 45 карт, случайная сторона у каждой,
    /// перемешивание, по `deal_allocation` карт каждому подряд.
    pub(crate) fn deal<R: RandomSource>(&mut self, rng: &mut R) -> Result<Vec<TableEvent>, EngineError> {
        let table_id = self.table.id;
        let seats = self.table.seated_count();
        let per_player = self.table.rules.cards_per_player(seats).ok_or_else(|| {
            EngineError::structural(format!("нет раздачи для {seats} мест"))
        })?;
        if seats * per_player > DECK_SIZE {
            return Err(EngineError::structural(format!(
                "{seats} x {per_player} карт больше колоды"
            )));
        }

        self.table.state = TableState::Initializing;

        let mut deck = Deck::full();
        for card in deck.cards.iter_mut() {
            card.up_active = rng.coin_flip();
        }
        rng.shuffle(&mut deck.cards);
        let hands = deck.split_hands(seats, per_player);

        let names = self.table.names();
        let mut round = RoundEngine::new(table_id, deck, &names);
        for (player, hand) in self.table.seats.iter_mut().zip(hands) {
            player
                .receive_hand(hand, &mut round.pool)
                .map_err(|e| EngineError::structural(format!("раздача игроку {}: {e}", player.name)))?;
        }

        for player in &self.table.seats {
            let all_dealt = player.hand.len() == per_player
                && player.hand.iter().all(|&id| {
                    round
                        .pool
                        .get(id)
                        .map(|c| c.is_dealt() && c.owner.as_deref() == Some(player.name.as_str()))
                        .unwrap_or(false)
                });
            if !all_dealt {
                return Err(EngineError::structural(format!(
                    "после раздачи рука {} не вся скрыта и принадлежит ему",
                    player.name
                )));
            }
        }
        round.check_partition(&self.table.seats)?;

        let dealt: Vec<DealtHand> = self
            .table
            .seats
            .iter()
            .map(|p| DealtHand {
                player: p.name.clone(),
                hand: p.render_hand(&round.pool),
            })
            .collect();

        for player in self.table.seats.iter_mut() {
            player.set_state(PlayerState::DealInit);
        }
        self.round = Some(round);
        self.table.state = TableState::PlayerAck;
        self.refresh_notice();

        info!(table_id, seats, per_player, "карты розданы");
        Ok(vec![TableEvent::RoundInitialized {
            table_id,
            hands: dealt,
        }])
    }

    /// Игрок выбирает сторону руки. Когда выбрали все, раунд начинается.
    pub fn choose_orientation<R: RandomSource>(
        &mut self,
        name: &str,
        reverse: bool,
        rng: &mut R,
    ) -> Result<Vec<TableEvent>, EngineError> {
        self.expect_table_state(&[TableState::PlayerAck])?;
        let seat = self.seat_of(name)?;
        let round = self.round.as_mut().ok_or(EngineError::NoActiveRound)?;
        let player = &mut self.table.seats[seat];
        // Повторный выбор отсекается здесь: игрок уже не в DealInit.
        player.choose_orientation(reverse, &mut round.pool)?;

        self.player_init_finish(seat, rng)
    }

    fn player_init_finish<R: RandomSource>(
        &mut self,
        seat: usize,
        rng: &mut R,
    ) -> Result<Vec<TableEvent>, EngineError> {
        let table_id = self.table.id;
        let name = self.table.seats[seat].name.clone();
        self.table.seats[seat].set_state(PlayerState::WaitingTurn);
        let round = self.round_mut()?;
        round.orientation_done[seat] = true;
        let all_done = round.orientation_done.iter().all(|&d| d);

        debug!(table_id, player = %name, seat, "сторона руки выбрана");
        let mut events = vec![TableEvent::OrientationChosen {
            table_id,
            player: name,
        }];

        if all_done {
            events.extend(self.start_play(rng)?);
        } else {
            self.refresh_notice();
        }
        Ok(events)
    }

    /// Все готовы: случайный первый ход, запись GameStart.
    fn start_play<R: RandomSource>(&mut self, rng: &mut R) -> Result<Vec<TableEvent>, EngineError> {
        let table_id = self.table.id;
        let seats = self.table.seated_count();
        let first = rng.pick_index(seats);
        let first_name = self
            .table
            .seats
            .get(first)
            .map(|p| p.name.clone())
            .ok_or_else(|| EngineError::structural(format!("первый ход: места {first} нет")))?;

        let round = self.round_mut()?;
        let start = round
            .history
            .push(first_name.clone(), OperationKind::GameStart)
            .clone();
        let displayed = round.displayed.render();

        self.table.state = TableState::Playing;
        self.table.seats[first].set_state(PlayerState::OnTurn);
        self.refresh_notice();

        info!(table_id, player = %first_name, seat = first, "раунд начат");
        Ok(vec![
            TableEvent::RoundStarted {
                table_id,
                first_player: first_name.clone(),
                displayed: displayed.clone(),
            },
            TableEvent::TurnAdvanced {
                table_id,
                target: first_name,
                displayed,
                last_operation: start,
            },
        ])
    }
}
