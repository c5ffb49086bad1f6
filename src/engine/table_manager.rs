// src/engine/table_manager.rs

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::rules::{RulesConfig, RulesError};
use crate::domain::{PlayerName, TableId};
use crate::engine::actions::{DrawRequest, TurnAction};
use crate::engine::errors::EngineError;
use crate::engine::events::{EventSink, TableEvent};
use crate::engine::game_loop::GameTable;
use crate::engine::RandomSource;
use crate::infra::ids::IdGenerator;

/// Ошибки уровня менеджера столов (над движком одного стола).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    /// Стол с таким ID не найден (или уже удалён).
    #[error("Стол {0} не найден")]
    TableNotFound(TableId),

    /// Игрок не сидит ни за одним столом.
    #[error("Игрок {0} не сидит ни за одним столом")]
    PlayerNotSeated(PlayerName),

    #[error("Игрок {player} уже сидит за столом {table_id}")]
    AlreadyAtTable { player: PlayerName, table_id: TableId },

    #[error("Недопустимое имя игрока: {0:?}")]
    InvalidPlayerName(PlayerName),

    #[error("Некорректные правила: {0}")]
    Config(String),

    /// Проброшенная ошибка из движка (EngineError).
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<RulesError> for ManagerError {
    fn from(e: RulesError) -> Self {
        ManagerError::Config(e.to_string())
    }
}

/// Внутренний объект: стол + свой RNG.
///
/// `closed` выставляется, когда стол удалён из реестра: кто успел взять
/// ссылку до удаления, увидит `TableNotFound`.
struct ManagedTable<R> {
    game: GameTable,
    rng: R,
    closed: bool,
}

type RngFactory<R> = Box<dyn Fn(TableId) -> R + Send + Sync>;

/// Менеджер столов:
/// - хранит столы по TableId, каждый под своей блокировкой;
/// - ведёт справочник "игрок → стол";
/// - применяет команды к копии стола и сохраняет её только при успехе;
/// - после снятия блокировки отдаёт события в `EventSink`.
///
/// Команды одного стола идут строго по очереди, разные столы друг друга
/// не ждут. Чтение видит только целиком применённые команды.
pub struct TableManager<R: RandomSource> {
    rules: RulesConfig,
    tables: DashMap<TableId, Arc<RwLock<ManagedTable<R>>>>,
    players: DashMap<PlayerName, TableId>,
    ids: IdGenerator,
    rng_factory: RngFactory<R>,
    sink: Arc<dyn EventSink>,
}

impl<R: RandomSource> TableManager<R> {
    /// Создать пустой менеджер. Правила проверяются сразу.
    pub fn new<F>(rules: RulesConfig, rng_factory: F, sink: Arc<dyn EventSink>) -> Result<Self, ManagerError>
    where
        F: Fn(TableId) -> R + Send + Sync + 'static,
    {
        rules.validate()?;
        Ok(Self {
            rules,
            tables: DashMap::new(),
            players: DashMap::new(),
            ids: IdGenerator::new(),
            rng_factory: Box::new(rng_factory),
            sink,
        })
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Есть ли стол с таким id.
    pub fn has_table(&self, table_id: TableId) -> bool {
        self.tables.contains_key(&table_id)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.tables.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// За каким столом сидит игрок.
    pub fn table_of(&self, name: &str) -> Option<TableId> {
        self.players.get(name).map(|e| *e.value())
    }

    /// Прочитать стол под блокировкой на чтение.
    pub fn read_table<T, F>(&self, table_id: TableId, f: F) -> Result<T, ManagerError>
    where
        F: FnOnce(&GameTable) -> Result<T, EngineError>,
    {
        let handle = self.handle(table_id)?;
        let guard = handle.read();
        if guard.closed {
            return Err(ManagerError::TableNotFound(table_id));
        }
        Ok(f(&guard.game)?)
    }

    /// Прочитать стол, за которым сидит игрок.
    pub fn read_for_player<T, F>(&self, name: &str, f: F) -> Result<T, ManagerError>
    where
        F: FnOnce(&GameTable) -> Result<T, EngineError>,
    {
        let table_id = self.seated_table(name)?;
        self.read_table(table_id, f)
    }

    /// Копия стола целиком.
    pub fn snapshot(&self, table_id: TableId) -> Result<GameTable, ManagerError> {
        self.read_table(table_id, |game| Ok(game.clone()))
    }

    /// Сесть за стол `table_id` или за новый стол, если id не указан.
    pub fn join(&self, name: &str, table_id: Option<TableId>) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        if name.trim().is_empty() {
            return Err(ManagerError::InvalidPlayerName(name.to_string()));
        }

        let (table_id, handle, created) = match table_id {
            Some(id) => (id, self.handle(id)?, false),
            None => {
                let id = self.ids.next_table_id();
                let managed = ManagedTable {
                    game: GameTable::new(id, self.rules.clone()),
                    rng: (self.rng_factory)(id),
                    closed: false,
                };
                (id, Arc::new(RwLock::new(managed)), true)
            }
        };

        // Место в справочнике занимаем до блокировки стола: так один игрок
        // не сядет за два стола одновременно.
        match self.players.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(e) => {
                return Err(ManagerError::AlreadyAtTable {
                    player: name.to_string(),
                    table_id: *e.get(),
                })
            }
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(table_id);
            }
        }

        let result = {
            let mut guard = handle.write();
            if guard.closed {
                Err(ManagerError::TableNotFound(table_id))
            } else {
                let mut draft = guard.game.clone();
                match draft.add_player(name) {
                    Ok(events) => {
                        guard.game = draft;
                        if created {
                            self.tables.insert(table_id, handle.clone());
                            info!(table_id, player = name, "создан новый стол");
                        }
                        Ok(events)
                    }
                    Err(e) => Err(ManagerError::Engine(e)),
                }
            }
        };

        match result {
            Ok(events) => {
                self.publish(&events);
                Ok((table_id, events))
            }
            Err(e) => {
                self.players.remove(name);
                self.log_rejection(table_id, name, "join", &e);
                Err(e)
            }
        }
    }

    /// Встать из-за стола. Пустой стол удаляется из реестра.
    pub fn leave(&self, name: &str) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        let table_id = self.seated_table(name)?;
        let handle = self.handle(table_id)?;

        let result = {
            let mut guard = handle.write();
            if guard.closed {
                Err(ManagerError::TableNotFound(table_id))
            } else {
                let mut draft = guard.game.clone();
                match draft.remove_player(name) {
                    Ok(events) => {
                        let now_empty = draft.table.is_empty();
                        guard.game = draft;
                        if now_empty {
                            guard.closed = true;
                            self.tables.remove(&table_id);
                            info!(table_id, "последний игрок ушёл, стол удалён");
                        }
                        Ok(events)
                    }
                    Err(e) => Err(ManagerError::Engine(e)),
                }
            }
        };

        match result {
            Ok(events) => {
                self.players.remove(name);
                self.publish(&events);
                Ok((table_id, events))
            }
            Err(e) => {
                self.log_rejection(table_id, name, "leave", &e);
                Err(e)
            }
        }
    }

    pub fn ready(&self, name: &str) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "ready", |game, rng| game.player_ready(name, rng))
    }

    pub fn unready(&self, name: &str) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "unready", |game, _| game.player_unready(name))
    }

    pub fn choose_orientation(&self, name: &str, reverse: bool) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "choose_orientation", |game, rng| {
            game.choose_orientation(name, reverse, rng)
        })
    }

    pub fn play(&self, name: &str, begin: usize, end: usize) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "play", |game, _| game.play(name, begin, end))
    }

    pub fn draw(&self, name: &str, req: DrawRequest) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "draw", |game, _| game.draw(name, req))
    }

    pub fn draw_and_play(&self, name: &str, req: DrawRequest) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "draw_and_play", |game, _| game.draw_and_play(name, req))
    }

    /// Применить ход игрока (play / draw / draw_and_play).
    pub fn apply_turn(&self, action: &TurnAction) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(&action.player, "turn", |game, _| game.apply_turn(action))
    }

    pub fn acknowledge_round_end(&self, name: &str) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "acknowledge", |game, _| game.acknowledge_round_end(name))
    }

    pub fn lock_table(&self, name: &str) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "lock", |game, _| game.lock_table(name))
    }

    pub fn unlock_table(&self, name: &str) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "unlock", |game, _| game.unlock_table(name))
    }

    pub fn transfer_host(&self, name: &str, target: &str) -> Result<(TableId, Vec<TableEvent>), ManagerError> {
        self.mutate(name, "transfer_host", |game, _| game.transfer_host(name, target))
    }

    /// Общая схема команды: блокировка стола, работа с копией, сохранение
    /// копии при успехе, события после снятия блокировки.
    fn mutate<F>(&self, name: &str, command: &'static str, f: F) -> Result<(TableId, Vec<TableEvent>), ManagerError>
    where
        F: FnOnce(&mut GameTable, &mut R) -> Result<Vec<TableEvent>, EngineError>,
    {
        let table_id = self.seated_table(name)?;
        let handle = self.handle(table_id)?;

        let result = {
            let mut guard = handle.write();
            if guard.closed {
                Err(ManagerError::TableNotFound(table_id))
            } else {
                let managed = &mut *guard;
                let mut draft = managed.game.clone();
                match f(&mut draft, &mut managed.rng) {
                    Ok(events) => {
                        managed.game = draft;
                        debug!(
                            table_id,
                            player = name,
                            command,
                            state = ?managed.game.state(),
                            "команда применена"
                        );
                        Ok(events)
                    }
                    Err(e) => Err(ManagerError::Engine(e)),
                }
            }
        };

        match result {
            Ok(events) => {
                self.publish(&events);
                Ok((table_id, events))
            }
            Err(e) => {
                self.log_rejection(table_id, name, command, &e);
                Err(e)
            }
        }
    }

    fn seated_table(&self, name: &str) -> Result<TableId, ManagerError> {
        self.table_of(name)
            .ok_or_else(|| ManagerError::PlayerNotSeated(name.to_string()))
    }

    /// Ссылка на стол. Запись в DashMap отпускается сразу.
    fn handle(&self, table_id: TableId) -> Result<Arc<RwLock<ManagedTable<R>>>, ManagerError> {
        self.tables
            .get(&table_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or(ManagerError::TableNotFound(table_id))
    }

    fn publish(&self, events: &[TableEvent]) {
        for event in events {
            self.sink.publish(event);
        }
    }

    fn log_rejection(&self, table_id: TableId, name: &str, command: &'static str, err: &ManagerError) {
        match err {
            ManagerError::Engine(e) if e.is_structural() => {
                error!(table_id, player = name, command, error = %e, "структурная ошибка, команда откатена");
            }
            _ => {
                debug!(table_id, player = name, command, error = %err, "команда отклонена");
            }
        }
    }
}
