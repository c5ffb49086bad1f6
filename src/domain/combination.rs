use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::card::{face_symbol, parse_face, Card, FacePair};
use crate::domain::errors::DomainError;
use crate::domain::CardId;

/// Категория комбинации. Порядок вариантов = сила категории.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComboCategory {
    /// Недопустимая комбинация, сыграть нельзя.
    Invalid = 0,
    /// Пусто или одна карта.
    Single = 1,
    /// Подряд идущие значения (по возрастанию или по убыванию).
    Run = 2,
    /// Все значения равны.
    Set = 3,
}

/// Карта внутри комбинации: снимок значений на момент построения.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComboCard {
    pub id: CardId,
    pub value: u8,
    pub other: u8,
}

impl From<&Card> for ComboCard {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            value: card.value(),
            other: card.other_value(),
        }
    }
}

/// Упорядоченная группа карт с категорией.
///
/// Это снимок: категория считается один раз при построении и не следит
/// за последующими переворотами карт.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Combination {
    cards: Vec<ComboCard>,
    category: ComboCategory,
}

impl Combination {
    pub fn empty() -> Self {
        Self::from_snapshots(Vec::new())
    }

    pub fn from_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        Self::from_snapshots(cards.into_iter().map(ComboCard::from).collect())
    }

    /// Построить из пар (активная, неактивная).
    pub fn from_faces(faces: &[(u8, u8)]) -> Self {
        let cards = faces
            .iter()
            .enumerate()
            .map(|(i, &(value, other))| ComboCard {
                id: i as CardId,
                value,
                other,
            })
            .collect();
        Self::from_snapshots(cards)
    }

    pub fn from_snapshots(cards: Vec<ComboCard>) -> Self {
        let category = classify(&cards);
        Self { cards, category }
    }

    pub fn cards(&self) -> &[ComboCard] {
        &self.cards
    }

    pub fn card_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.iter().map(|c| c.id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.iter().any(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn category(&self) -> ComboCategory {
        self.category
    }

    pub fn is_playable(&self) -> bool {
        self.category != ComboCategory::Invalid
    }

    pub fn values(&self) -> Vec<u8> {
        self.cards.iter().map(|c| c.value).collect()
    }

    pub fn min_value(&self) -> Option<u8> {
        self.cards.iter().map(|c| c.value).min()
    }

    /// Сравнение силы: сначала число карт, затем категория, затем минимум.
    pub fn compare_rank(&self, other: &Combination) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then(self.category.cmp(&other.category))
            .then(self.min_value().cmp(&other.min_value()))
    }

    /// Строго сильнее другой комбинации.
    pub fn outranks(&self, other: &Combination) -> bool {
        self.compare_rank(other) == Ordering::Greater
    }

    /// Крайняя карта: `from_top`: первая, иначе последняя.
    pub fn end_card(&self, from_top: bool) -> Option<&ComboCard> {
        if from_top {
            self.cards.first()
        } else {
            self.cards.last()
        }
    }

    /// Новая комбинация без указанной карты (категория пересчитывается).
    pub fn without(&self, id: CardId) -> Combination {
        Self::from_snapshots(self.cards.iter().copied().filter(|c| c.id != id).collect())
    }

    /// Каноническая строка: "активные,неактивные", значения через пробел.
    pub fn render(&self) -> String {
        render_faces(self.cards.iter().map(|c| (c.value, c.other)))
    }
}

/// Общий рендер для комбинаций и рук.
pub fn render_faces<I>(faces: I) -> String
where
    I: IntoIterator<Item = (u8, u8)>,
{
    let (active, other): (Vec<String>, Vec<String>) = faces
        .into_iter()
        .map(|(v, o)| (face_symbol(v), face_symbol(o)))
        .unzip();
    format!("{},{}", active.join(" "), other.join(" "))
}

/// Обратный разбор `render_faces`: "6 T,1 3" -> [(6,1), (10,3)].
/// Пары идут в порядке карт, первая сторона активная.
pub fn parse_rendered(text: &str) -> Result<Vec<FacePair>, DomainError> {
    let invalid = || DomainError::InvalidFaces(text.to_string());
    let (active, other) = text.trim().split_once(',').ok_or_else(invalid)?;

    let active: Vec<&str> = active.split_whitespace().collect();
    let other: Vec<&str> = other.split_whitespace().collect();
    if active.len() != other.len() {
        return Err(invalid());
    }

    active
        .iter()
        .zip(&other)
        .map(|(a, o)| match (parse_face(a), parse_face(o)) {
            (Some(a), Some(o)) => Ok(FacePair(a, o)),
            _ => Err(invalid()),
        })
        .collect()
}

fn classify(cards: &[ComboCard]) -> ComboCategory {
    if cards.len() <= 1 {
        return ComboCategory::Single;
    }
    let values: Vec<i16> = cards.iter().map(|c| c.value as i16).collect();
    let ascending = values.windows(2).all(|w| w[1] - w[0] == 1);
    let descending = values.windows(2).all(|w| w[1] - w[0] == -1);
    if ascending || descending {
        return ComboCategory::Run;
    }
    if values.iter().all(|&v| v == values[0]) {
        return ComboCategory::Set;
    }
    ComboCategory::Invalid
}

/// Равенство = одинаковый мультимножество действующих значений.
impl PartialEq for Combination {
    fn eq(&self, other: &Self) -> bool {
        let mut a = self.values();
        let mut b = other.values();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

impl fmt::Display for Combination {
    /// Только действующие значения: `3 4 5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.cards.iter().map(|c| face_symbol(c.value)).collect();
        write!(f, "{}", parts.join(" "))
    }
}
