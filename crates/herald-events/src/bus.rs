use crate::key::EventKey;
use crate::observer::{DispatchObserver, DispatchOutcome, DispatchStatus, TracingObserver};
use crate::payload::Payload;
use crate::subscriber::{same_instance, Subscriber, SubscriberHandle};
use futures::FutureExt;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::Instrument;

// Each key's list is copy-on-write so a publish can hold a snapshot while
// the registry keeps changing.
type Registry = HashMap<EventKey, Arc<Vec<SubscriberHandle>>>;

/// Registry of subscribers keyed by event name, with fire-and-forget publish.
///
/// Cloning is cheap; clones share one registry.
#[derive(Clone)]
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
    runtime: Option<Handle>,
    observer: Arc<dyn DispatchObserver>,
}

impl EventBus {
    /// Bus that spawns handlers onto the Tokio runtime it was created in.
    ///
    /// Created outside any runtime, it falls back to the runtime of each
    /// publishing thread.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(HashMap::new())),
            runtime: Handle::try_current().ok(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Spawn handlers onto `handle` instead of the ambient runtime. Lets
    /// threads outside any runtime publish.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Register `subscriber` under `key`. Adding a subscriber that is already
    /// registered under the same key is a no-op.
    pub fn add_subscriber(&self, key: impl Into<EventKey>, subscriber: SubscriberHandle) {
        let key = key.into();
        let added = {
            let mut registry = self.registry.write();
            let subscribers = registry.entry(key.clone()).or_default();
            if subscribers.iter().any(|s| same_instance(s, &subscriber)) {
                false
            } else {
                Arc::make_mut(subscribers).push(subscriber.clone());
                true
            }
        };

        if added {
            tracing::debug!(key = %key, subscriber = subscriber.name(), "subscriber added");
        }
    }

    /// Unregister `subscriber` from `key`. Unknown keys and absent subscribers
    /// are ignored.
    pub fn remove_subscriber<S>(&self, key: impl AsRef<str>, subscriber: &Arc<S>)
    where
        S: Subscriber + ?Sized,
    {
        let key = key.as_ref();

        let mut registry = self.registry.write();
        let Some(subscribers) = registry.get_mut(key) else {
            return;
        };
        let Some(index) = subscribers.iter().position(|s| same_instance(s, subscriber)) else {
            return;
        };

        Arc::make_mut(subscribers).remove(index);
        let now_empty = subscribers.is_empty();
        if now_empty {
            registry.remove(key);
        }
        drop(registry);

        tracing::debug!(key = %key, subscriber = subscriber.name(), "subscriber removed");
    }

    /// Dispatch `payload` to every subscriber registered under `key`.
    ///
    /// Each handler is spawned as its own task, in registration order, and
    /// this call returns without waiting for any of them. Publishing to a key
    /// with no subscribers does nothing.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime on a bus that was neither
    /// created inside one nor given one through [`EventBus::with_runtime`].
    pub fn publish_event(&self, key: impl Into<EventKey>, payload: impl Into<Arc<Payload>>) {
        let key = key.into();
        let subscribers = self.snapshot(key.as_str());

        if subscribers.is_empty() {
            tracing::debug!(key = %key, "no subscribers for event");
            return;
        }

        tracing::debug!(key = %key, subscribers = subscribers.len(), "publishing event");

        let payload = payload.into();
        for subscriber in subscribers.iter() {
            self.spawn_handler(key.clone(), subscriber.clone(), payload.clone());
        }
    }

    /// Subscribers for `key` in registration order.
    pub fn subscribers(&self, key: impl AsRef<str>) -> Vec<SubscriberHandle> {
        self.snapshot(key.as_ref()).to_vec()
    }

    pub fn subscriber_count(&self, key: impl AsRef<str>) -> usize {
        self.registry
            .read()
            .get(key.as_ref())
            .map_or(0, |subscribers| subscribers.len())
    }

    pub fn is_subscribed<S>(&self, key: impl AsRef<str>, subscriber: &Arc<S>) -> bool
    where
        S: Subscriber + ?Sized,
    {
        self.snapshot(key.as_ref())
            .iter()
            .any(|s| same_instance(s, subscriber))
    }

    /// Keys with at least one subscriber, sorted.
    pub fn keys(&self) -> Vec<EventKey> {
        let mut keys: Vec<EventKey> = self
            .registry
            .read()
            .iter()
            .filter(|(_, subscribers)| !subscribers.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    fn snapshot(&self, key: &str) -> Arc<Vec<SubscriberHandle>> {
        self.registry.read().get(key).cloned().unwrap_or_default()
    }

    fn spawn_handler(&self, key: EventKey, subscriber: SubscriberHandle, payload: Arc<Payload>) {
        let observer = self.observer.clone();
        let span = tracing::debug_span!("dispatch", key = %key, subscriber = subscriber.name());

        let task = async move {
            let started = Instant::now();
            let result = AssertUnwindSafe(subscriber.handle(&payload))
                .catch_unwind()
                .await;

            let status = match result {
                Ok(Ok(())) => DispatchStatus::Completed,
                Ok(Err(error)) => DispatchStatus::Failed(format!("{error:#}")),
                Err(panic) => DispatchStatus::Panicked(panic_message(&*panic)),
            };

            observer.on_outcome(&DispatchOutcome {
                key,
                subscriber: subscriber.name().to_string(),
                status,
                elapsed: started.elapsed(),
            });
        }
        .instrument(span);

        // The join handle is dropped: nothing waits on a dispatched handler.
        match &self.runtime {
            Some(handle) => {
                handle.spawn(task);
            }
            None => {
                tokio::spawn(task);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("keys", &self.keys())
            .field("dedicated_runtime", &self.runtime.is_some())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
