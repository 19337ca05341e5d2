//! In-process progress change notifications.
//!
//! Views register a callback and receive a [`ProgressEvent`] each time a
//! project's progress is persisted. Dropping the returned [`Subscription`]
//! (or calling [`Subscription::unsubscribe`]) removes the listener.

use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEvent {
    pub project_id: Uuid,
    pub progress: u8,
}

type Listener = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Publisher side of progress notifications. Clones share one registry.
#[derive(Clone, Default)]
pub struct ProgressNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ProgressNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`; it stays registered while the returned handle lives.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().expect("notifier lock poisoned");
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Calls every listener, in registration order.
    pub fn notify(&self, event: &ProgressEvent) {
        // Snapshot so listeners may subscribe or unsubscribe while being called.
        let listeners: Vec<Listener> = {
            let registry = self.registry.lock().expect("notifier lock poisoned");
            registry.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        tracing::trace!(
            "Notifying {} listener(s) of progress {}% for project {}",
            listeners.len(),
            event.progress,
            event.project_id
        );

        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry
            .lock()
            .expect("notifier lock poisoned")
            .listeners
            .len()
    }
}

impl std::fmt::Debug for ProgressNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle for a registered listener.
#[must_use = "dropping a Subscription unregisters its listener"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Ok(mut registry) = registry.lock() {
            registry.listeners.retain(|(id, _)| *id != self.id);
        };
    }
}
