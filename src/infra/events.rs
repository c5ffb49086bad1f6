//! Реализации `EventSink`.

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::TableId;
use crate::engine::events::{EventSink, TableEvent};

/// Ничего не делает.
#[derive(Clone, Debug, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, _event: &TableEvent) {}
}

/// Пишет каждое событие в лог.
#[derive(Clone, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: &TableEvent) {
        debug!(table_id = event.table_id(), event = event.name(), "событие стола");
    }
}

/// Хранит события в памяти (тесты, dev CLI).
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<TableEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<TableEvent> {
        self.events.lock().clone()
    }

    pub fn for_table(&self, table_id: TableId) -> Vec<TableEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.table_id() == table_id)
            .cloned()
            .collect()
    }

    /// Забрать накопленное и очистить буфер.
    pub fn drain(&self) -> Vec<TableEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: &TableEvent) {
        self.events.lock().push(event.clone());
    }
}
