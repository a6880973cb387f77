use tokio::sync::broadcast;

/// In-process notifications standing in for the browser's window events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Something was written through the storage façade; views should reload.
    DataChanged,
    /// The header search box changed.
    Search(String),
    /// A key in the shared key/value store was written (`None` = removed).
    Storage { key: String, new_value: Option<String> },
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire and forget. Having no subscribers is not an error.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self { Self::new(64) }
}
