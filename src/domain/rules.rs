//! Конфигурация правил стола.
//!
//! Здесь описываем только "правила", без состояния и без привязки к конкретному столу.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::deck::DECK_SIZE;

/// Абсолютные границы числа мест, которые поддерживает движок.
pub const MIN_SEATS: u8 = 2;
pub const MAX_SEATS: u8 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("Некорректные правила: {0}")]
    Invalid(String),

    #[error("Не удалось разобрать JSON правил: {0}")]
    Malformed(String),
}

/// Правила для всех столов одного реестра.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    pub min_seats: u8,
    pub max_seats: u8,
    /// Число мест → карт на игрока.
    pub deal_allocation: BTreeMap<u8, u8>,
    /// Сколько очков получает владелец карты, которую забрали со стола.
    pub extra_point_per_draw: i32,
}

impl RulesConfig {
    /// Стандартные правила: 2–5 мест, раздача 11/12/11/9.
    pub fn standard() -> Self {
        Self {
            min_seats: MIN_SEATS,
            max_seats: MAX_SEATS,
            deal_allocation: BTreeMap::from([(2, 11), (3, 12), (4, 11), (5, 9)]),
            extra_point_per_draw: 1,
        }
    }

    /// Распарсить JSON и сразу проверить.
    pub fn from_json_str(raw: &str) -> Result<Self, RulesError> {
        let config: RulesConfig =
            serde_json::from_str(raw).map_err(|e| RulesError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if self.min_seats < MIN_SEATS || self.max_seats > MAX_SEATS {
            return Err(RulesError::Invalid(format!(
                "число мест должно быть в пределах {MIN_SEATS}..={MAX_SEATS}"
            )));
        }
        if self.min_seats > self.max_seats {
            return Err(RulesError::Invalid("min_seats больше max_seats".into()));
        }
        for seats in self.min_seats..=self.max_seats {
            let per_player = self.deal_allocation.get(&seats).copied().ok_or_else(|| {
                RulesError::Invalid(format!("нет раздачи для {seats} мест"))
            })?;
            if per_player == 0 {
                return Err(RulesError::Invalid(format!("ноль карт на игрока при {seats} местах")));
            }
            // При 5 местах по 9 карт колода уходит целиком.
            if seats as usize * per_player as usize > DECK_SIZE {
                return Err(RulesError::Invalid(format!(
                    "{seats} x {per_player} карт не помещается в колоду из {DECK_SIZE}"
                )));
            }
        }
        if self.extra_point_per_draw < 0 {
            return Err(RulesError::Invalid("extra_point_per_draw меньше нуля".into()));
        }
        Ok(())
    }

    pub fn cards_per_player(&self, seats: usize) -> Option<usize> {
        u8::try_from(seats)
            .ok()
            .and_then(|s| self.deal_allocation.get(&s))
            .map(|&n| n as usize)
    }

    pub fn seats_allowed(&self, seats: usize) -> bool {
        (self.min_seats as usize..=self.max_seats as usize).contains(&seats)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::standard()
    }
}
