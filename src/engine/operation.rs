use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::combination::Combination;
use crate::domain::PlayerName;

/// Тег операции без данных, для проверки очерёдности.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OperationType {
    GameStart,
    Play,
    Draw,
    DrawAndPlay,
    GameEnd,
}

/// Что сделал игрок.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum OperationKind {
    /// Раунд начат, `actor` ходит первым.
    GameStart,
    /// Выставил комбинацию.
    Play(Combination),
    /// Забрал крайнюю карту со стола; `card` это дубликат, вставленный в руку.
    Draw { card: Card, insert_at: usize },
    /// То же, что Draw, но ход остаётся за игроком (раз за раунд).
    DrawAndPlay { card: Card, insert_at: usize },
    /// Раунд окончен, `actor` это победитель.
    GameEnd,
}

/// Запись в истории раунда. Неизменяема после добавления.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Operation {
    pub index: u32,
    pub actor: PlayerName,
    pub kind: OperationKind,
}

impl Operation {
    pub fn op_type(&self) -> OperationType {
        match self.kind {
            OperationKind::GameStart => OperationType::GameStart,
            OperationKind::Play(_) => OperationType::Play,
            OperationKind::Draw { .. } => OperationType::Draw,
            OperationKind::DrawAndPlay { .. } => OperationType::DrawAndPlay,
            OperationKind::GameEnd => OperationType::GameEnd,
        }
    }

    /// Данные операции в каноническом виде (если есть).
    pub fn detail(&self) -> Option<String> {
        match &self.kind {
            OperationKind::Play(combo) => Some(combo.render()),
            OperationKind::Draw { card, .. } | OperationKind::DrawAndPlay { card, .. } => {
                Some(Combination::from_cards([card]).render())
            }
            OperationKind::GameStart | OperationKind::GameEnd => None,
        }
    }

    /// Подробная строка с позицией вставки, только для логов сервера.
    pub fn full_log(&self) -> String {
        match &self.kind {
            OperationKind::Draw { card, insert_at } => format!(
                "{} добирает {}, карта встаёт {}-й в руке",
                self.actor,
                card,
                insert_at + 1
            ),
            OperationKind::DrawAndPlay { card, insert_at } => format!(
                "{} добирает {}, карта встаёт {}-й в руке, и сразу играет",
                self.actor,
                card,
                insert_at + 1
            ),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Operation {
    /// Публичная строка истории (без позиции вставки).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OperationKind::GameStart => write!(f, "Раунд начат: первым ходит {}", self.actor),
            OperationKind::Play(combo) => write!(f, "{} играет {}", self.actor, combo),
            OperationKind::Draw { card, .. } => write!(f, "{} добирает {}", self.actor, card),
            OperationKind::DrawAndPlay { card, .. } => {
                write!(f, "{} добирает {} и сразу играет", self.actor, card)
            }
            OperationKind::GameEnd => write!(f, "Раунд окончен: победил {}", self.actor),
        }
    }
}

/// История раунда (только добавление).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct OperationLog {
    operations: Vec<Operation>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    pub fn push(&mut self, actor: PlayerName, kind: OperationKind) -> &Operation {
        let index = self.operations.len() as u32;
        self.operations.push(Operation { index, actor, kind });
        &self.operations[index as usize]
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn last(&self) -> Option<&Operation> {
        self.operations.last()
    }

    /// Последние `n` операций (или меньше, если история короче).
    pub fn tail(&self, n: usize) -> &[Operation] {
        let start = self.operations.len().saturating_sub(n);
        &self.operations[start..]
    }
}
