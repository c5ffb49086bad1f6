use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::{CardId, PlayerName};

/// Минимальное и максимальное значение стороны карты.
pub const FACE_MIN: u8 = 1;
pub const FACE_MAX: u8 = 10;

/// Где сейчас находится карта.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardState {
    /// Не роздана (в пуле).
    Unassigned,
    /// В руке игрока.
    Hidden,
    /// На столе, в выставленной комбинации.
    Displayed,
    /// В зачётной стопке игрока.
    Scored,
}

impl TryFrom<i8> for CardState {
    type Error = DomainError;

    /// Числовые коды состояний, как их видит внешний протокол.
    fn try_from(raw: i8) -> Result<Self, Self::Error> {
        match raw {
            -1 => Ok(CardState::Unassigned),
            1 => Ok(CardState::Displayed),
            2 => Ok(CardState::Hidden),
            3 => Ok(CardState::Scored),
            _ => Err(DomainError::UnknownState {
                machine: "карты",
                raw,
            }),
        }
    }
}

/// Неупорядоченная пара значений сторон. Используется для опознания карты
/// независимо от того, какая сторона сейчас активна.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FacePair(pub u8, pub u8);

impl FacePair {
    pub fn matches(&self, a: u8, b: u8) -> bool {
        (self.0 == a && self.1 == b) || (self.0 == b && self.1 == a)
    }
}

/// Парсинг "v1,v2" или "v1 v2"; `T` означает 10.
impl FromStr for FacePair {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(' ', ",");
        let parts: Vec<&str> = normalized.split(',').filter(|p| !p.is_empty()).collect();
        if parts.len() != 2 {
            return Err(DomainError::InvalidFaces(s.to_string()));
        }
        let a = parse_face(parts[0]).ok_or_else(|| DomainError::InvalidFaces(s.to_string()))?;
        let b = parse_face(parts[1]).ok_or_else(|| DomainError::InvalidFaces(s.to_string()))?;
        Ok(FacePair(a, b))
    }
}

/// Одна сторона: цифра, "10" или `T`.
pub fn parse_face(token: &str) -> Option<u8> {
    let value = match token {
        "T" | "t" => 10,
        other => other.parse::<u8>().ok()?,
    };
    (FACE_MIN..=FACE_MAX).contains(&value).then_some(value)
}

/// Текстовое представление значения стороны: 10 → `T`.
pub fn face_symbol(value: u8) -> String {
    if value == 10 {
        "T".to_string()
    } else {
        value.to_string()
    }
}

/// Двусторонняя карта. `up_active` выбирает, какая сторона сейчас в игре.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    pub up: u8,
    pub down: u8,
    pub up_active: bool,
    pub state: CardState,
    /// Владелец: None для нерозданной карты.
    pub owner: Option<PlayerName>,
}

impl Card {
    pub fn new(id: CardId, up: u8, down: u8, up_active: bool) -> Self {
        Self {
            id,
            up,
            down,
            up_active,
            state: CardState::Unassigned,
            owner: None,
        }
    }

    /// Действующее значение.
    pub fn value(&self) -> u8 {
        if self.up_active {
            self.up
        } else {
            self.down
        }
    }

    /// Значение неактивной стороны.
    pub fn other_value(&self) -> u8 {
        if self.up_active {
            self.down
        } else {
            self.up
        }
    }

    pub fn faces(&self) -> FacePair {
        FacePair(self.up, self.down)
    }

    /// Перевернуть карту. Разрешено только для карт в руке.
    pub fn flip(&mut self) -> Result<(), DomainError> {
        if self.state != CardState::Hidden {
            return Err(DomainError::InvalidCardState {
                expected: CardState::Hidden,
                found: self.state,
            });
        }
        self.up_active = !self.up_active;
        Ok(())
    }

    pub fn set_owner(&mut self, owner: Option<PlayerName>) {
        self.owner = owner;
    }

    pub fn set_state(&mut self, state: CardState) {
        self.state = state;
    }

    /// Переход по числовому коду (внешний протокол).
    pub fn set_state_raw(&mut self, raw: i8) -> Result<(), DomainError> {
        self.state = CardState::try_from(raw)?;
        Ok(())
    }

    /// Сравнение с парой значений без учёта порядка сторон.
    pub fn same_faces(&self, a: u8, b: u8) -> bool {
        self.faces().matches(a, b)
    }

    /// Сравнение с текстом "v1,v2" / "v1 v2". Битый текст просто не совпадает.
    pub fn matches_text(&self, text: &str) -> bool {
        text.parse::<FacePair>()
            .map(|p| self.same_faces(p.0, p.1))
            .unwrap_or(false)
    }

    /// Карта в руке и у неё есть владелец.
    pub fn is_dealt(&self) -> bool {
        self.state == CardState::Hidden && self.owner.is_some()
    }

    /// Сброс в начальное состояние между раундами.
    pub fn reset(&mut self) {
        self.state = CardState::Unassigned;
        self.up_active = true;
        self.owner = None;
    }
}

impl fmt::Display for Card {
    /// Только действующая сторона: `7`, `T`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", face_symbol(self.value()))
    }
}
