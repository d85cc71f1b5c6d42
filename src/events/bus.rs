use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use tokio::sync::mpsc;

use super::messages::{EventKind, GameEvent};

type Handler = Arc<dyn Fn(&GameEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to detach the handler again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: Handler,
}

/// Synchronous publish/subscribe channel.
///
/// Handlers run on the emitting thread in the order they were attached. A
/// handler attached after an emission never sees it.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.attach(None, Arc::new(handler))
    }

    /// Receive only events of one kind
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.attach(Some(kind), Arc::new(handler))
    }

    /// Forward every event into an unbounded channel
    pub fn channel(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    /// Detach a handler. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.lock();
        let before = subscriptions.len();
        subscriptions.retain(|sub| sub.id != id);
        subscriptions.len() != before
    }

    pub fn emit(&self, event: &GameEvent) {
        // Snapshot so handlers may subscribe or unsubscribe while running
        let handlers: Vec<Handler> = self
            .lock()
            .iter()
            .filter(|sub| sub.kind.map_or(true, |kind| kind == event.kind()))
            .map(|sub| sub.handler.clone())
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    pub fn emit_all(&self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.emit(&event);
        }
    }

    fn attach(&self, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Subscription { id, kind, handler });
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
