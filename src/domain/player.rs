use serde::{Deserialize, Serialize};

use crate::domain::card::CardState;
use crate::domain::combination::{render_faces, Combination};
use crate::domain::deck::Deck;
use crate::domain::errors::DomainError;
use crate::domain::{CardId, PlayerName, TableId};

/// Состояние игрока в рамках раунда.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Сидит (за столом или вне его), раунд не идёт.
    Seated,
    /// Объявил готовность, ждёт раздачи.
    Ready,
    /// Получил руку, выбирает ориентацию.
    DealInit,
    /// Раунд идёт, ход не его.
    WaitingTurn,
    /// Должен сделать ход.
    OnTurn,
    /// Раунд завершён, ждём подтверждения.
    RoundEnded,
}

impl TryFrom<i8> for PlayerState {
    type Error = DomainError;

    fn try_from(raw: i8) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(PlayerState::Seated),
            0 => Ok(PlayerState::Ready),
            1 => Ok(PlayerState::DealInit),
            2 => Ok(PlayerState::WaitingTurn),
            3 => Ok(PlayerState::OnTurn),
            4 => Ok(PlayerState::RoundEnded),
            _ => Err(DomainError::UnknownState {
                machine: "игрока",
                raw,
            }),
        }
    }
}

impl PlayerState {
    /// Игрок участвует в активном (ещё не завершённом) раунде.
    pub fn is_in_round(&self) -> bool {
        matches!(
            self,
            PlayerState::DealInit | PlayerState::WaitingTurn | PlayerState::OnTurn
        )
    }
}

/// Игрок. Стол хранится только как id и разрешается через реестр.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub name: PlayerName,
    pub table_id: Option<TableId>,
    pub state: PlayerState,
    /// Рука: порядок значим, по нему работает выбор диапазона.
    pub hand: Vec<CardId>,
}

impl Player {
    pub fn new(name: impl Into<PlayerName>) -> Self {
        Self {
            name: name.into(),
            table_id: None,
            state: PlayerState::Seated,
            hand: Vec::new(),
        }
    }

    /// Проверить, что игрок в одном из разрешённых состояний.
    pub fn expect_state(&self, allowed: &'static [PlayerState]) -> Result<(), DomainError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(DomainError::InvalidPlayerState {
                player: self.name.clone(),
                expected: allowed,
                found: self.state,
            })
        }
    }

    pub fn set_state(&mut self, state: PlayerState) {
        self.state = state;
    }

    pub fn set_state_raw(&mut self, raw: i8) -> Result<(), DomainError> {
        self.state = PlayerState::try_from(raw)?;
        Ok(())
    }

    /// Сесть за стол: только из Seated и только если ещё ни за каким не сидит.
    pub fn join_table(&mut self, table_id: TableId) -> Result<(), DomainError> {
        self.expect_state(&[PlayerState::Seated])?;
        if let Some(current) = self.table_id {
            return Err(DomainError::AlreadyAtTable {
                player: self.name.clone(),
                table_id: current,
            });
        }
        self.table_id = Some(table_id);
        Ok(())
    }

    pub fn ready_for_round(&mut self) -> Result<(), DomainError> {
        self.expect_state(&[PlayerState::Seated, PlayerState::RoundEnded])?;
        self.require_table()?;
        self.state = PlayerState::Ready;
        Ok(())
    }

    pub fn unready(&mut self) -> Result<(), DomainError> {
        self.expect_state(&[PlayerState::Ready])?;
        self.state = PlayerState::Seated;
        Ok(())
    }

    /// Встать из-за стола (никогда посреди раунда). Возвращает id стола.
    pub fn quit_table(&mut self) -> Result<TableId, DomainError> {
        self.expect_state(&[PlayerState::Seated, PlayerState::RoundEnded])?;
        let table_id = self.require_table()?;
        self.table_id = None;
        self.state = PlayerState::Seated;
        self.hand.clear();
        Ok(table_id)
    }

    /// Принять розданную руку: карты становятся Hidden и принадлежат игроку.
    pub fn receive_hand(&mut self, cards: Vec<CardId>, pool: &mut Deck) -> Result<(), DomainError> {
        self.expect_state(&[PlayerState::Ready])?;
        for &id in &cards {
            if let Some(card) = pool.get_mut(id) {
                card.set_state(CardState::Hidden);
                card.set_owner(Some(self.name.clone()));
            }
        }
        self.hand = cards;
        Ok(())
    }

    /// Выбрать ориентацию руки: при `reverse` перевернуть все карты.
    pub fn choose_orientation(&mut self, reverse: bool, pool: &mut Deck) -> Result<(), DomainError> {
        self.expect_state(&[PlayerState::DealInit])?;
        if reverse {
            for &id in &self.hand {
                if let Some(card) = pool.get_mut(id) {
                    card.flip()?;
                }
            }
        }
        Ok(())
    }

    /// Комбинация из `hand[begin..end]`.
    pub fn select_range(&self, begin: usize, end: usize, pool: &Deck) -> Result<Combination, DomainError> {
        if !(begin < end && end <= self.hand.len()) {
            return Err(DomainError::InvalidRange {
                begin,
                end,
                hand_len: self.hand.len(),
            });
        }
        let mut cards = Vec::with_capacity(end - begin);
        for &id in &self.hand[begin..end] {
            let card = pool.get(id).ok_or_else(|| DomainError::CardNotInHand {
                player: self.name.clone(),
                card: id,
            })?;
            cards.push(card);
        }
        Ok(Combination::from_cards(cards))
    }

    /// Все карты комбинации лежат в руке игрока, скрыты и принадлежат ему.
    pub fn holds(&self, combo: &Combination, pool: &Deck) -> Result<(), DomainError> {
        for id in combo.card_ids() {
            let owned = self.hand.contains(&id)
                && pool
                    .get(id)
                    .map(|c| c.state == CardState::Hidden && c.owner.as_deref() == Some(self.name.as_str()))
                    .unwrap_or(false);
            if !owned {
                return Err(DomainError::CardNotInHand {
                    player: self.name.clone(),
                    card: id,
                });
            }
        }
        Ok(())
    }

    pub fn acknowledge_round_end(&self) -> Result<(), DomainError> {
        self.expect_state(&[PlayerState::RoundEnded])
    }

    /// Рука в каноническом виде "активные,неактивные".
    pub fn render_hand(&self, pool: &Deck) -> String {
        render_faces(
            self.hand
                .iter()
                .filter_map(|&id| pool.get(id))
                .map(|c| (c.value(), c.other_value())),
        )
    }

    /// Очистить всё, что относится к раунду.
    pub fn clear_round(&mut self) {
        self.hand.clear();
        self.state = PlayerState::Seated;
    }

    fn require_table(&self) -> Result<TableId, DomainError> {
        self.table_id
            .ok_or_else(|| DomainError::NotAtTable(self.name.clone()))
    }
}
