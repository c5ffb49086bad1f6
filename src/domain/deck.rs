use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, FACE_MAX, FACE_MIN};
use crate::domain::CardId;

/// Размер полной колоды: все неупорядоченные пары различных значений 1..=10.
pub const DECK_SIZE: usize = 45;

/// Колода карт. В домене это просто упорядоченный список карт.
/// Перемешивание и выбор начальной стороны делает engine (через RNG из infra), НЕ здесь.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Deck {
    /// Полная колода в порядке (1,2), (1,3), (2,3), (1,4), ... (9,10).
    /// Младшее значение на верхней стороне, верхняя сторона активна.
    pub fn full() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        let mut id: CardId = 0;
        for high in FACE_MIN..=FACE_MAX {
            for low in FACE_MIN..high {
                cards.push(Card::new(id, low, high, true));
                id += 1;
            }
        }
        Deck { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    /// Найти карту по паре значений (без учёта порядка сторон).
    pub fn find_by_faces(&self, a: u8, b: u8) -> Option<&Card> {
        self.cards.iter().find(|c| c.same_faces(a, b))
    }

    /// Убрать карту из колоды (заменяется дубликатом при добыче).
    pub fn remove(&mut self, id: CardId) -> Option<Card> {
        let idx = self.cards.iter().position(|c| c.id == id)?;
        Some(self.cards.remove(idx))
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Разложить верх колоды по `seats` рукам по `per_player` карт подряд.
    /// Возвращает id карт каждой руки; остаток колоды не трогается.
    pub fn split_hands(&self, seats: usize, per_player: usize) -> Vec<Vec<CardId>> {
        (0..seats)
            .map(|seat| {
                self.cards
                    .iter()
                    .skip(seat * per_player)
                    .take(per_player)
                    .map(|c| c.id)
                    .collect()
            })
            .collect()
    }
}
