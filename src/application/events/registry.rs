//! Event listener registry - maps event types to ordered listener lists

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

use crate::application::errors::{BotError, ListenerError};
use crate::application::guard::guarded;
use crate::domain::entities::{Event, EventType};

/// Listener result
pub type ListenerResult = Result<(), BotError>;

/// Listener function type; identity is the `Arc` allocation
pub type Listener = Arc<dyn Fn(&Event) -> ListenerResult + Send + Sync>;

/// Wrap a closure as a listener
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&Event) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Registry of listeners keyed by event type
#[derive(Default)]
pub struct EventListenerRegistry {
    listeners: RwLock<HashMap<EventType, Vec<Listener>>>,
    self_id: RwLock<Option<String>>,
}

impl EventListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener for an event type
    pub fn add(&self, event_type: EventType, listener: Listener) -> Result<(), ListenerError> {
        let mut listeners = self.listeners.write()
            .map_err(|_| ListenerError::Internal("Lock poisoned".to_string()))?;

        listeners.entry(event_type).or_default().push(listener);
        Ok(())
    }

    /// Remove the first listener that is the same allocation as `listener`
    pub fn remove(&self, event_type: EventType, listener: &Listener) -> Result<(), ListenerError> {
        let mut listeners = self.listeners.write()
            .map_err(|_| ListenerError::Internal("Lock poisoned".to_string()))?;

        let not_found = || ListenerError::NotFound(event_type.to_string());
        let list = listeners.get_mut(&event_type).ok_or_else(not_found)?;
        let index = list
            .iter()
            .position(|l| Arc::ptr_eq(l, listener))
            .ok_or_else(not_found)?;

        list.remove(index);
        Ok(())
    }

    /// Snapshot of every registered listener
    pub fn listeners(&self) -> HashMap<EventType, Vec<Listener>> {
        self.listeners.read()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the listeners for one event type, in registration order
    pub fn listeners_for(&self, event_type: EventType) -> Vec<Listener> {
        self.listeners.read()
            .ok()
            .and_then(|l| l.get(&event_type).cloned())
            .unwrap_or_default()
    }

    /// Record the connected account so its own events are ignored
    pub fn set_self_id(&self, id: Option<String>) {
        if let Ok(mut self_id) = self.self_id.write() {
            *self_id = id;
        }
    }

    pub fn self_id(&self) -> Option<String> {
        self.self_id.read().ok().and_then(|id| id.clone())
    }

    fn is_own_event(&self, event: &Event) -> bool {
        match (&event.user, self.self_id()) {
            (Some(user), Some(self_id)) => user.id == self_id,
            _ => false,
        }
    }

    /// Call every listener for the event's type; returns how many were called
    ///
    /// Listeners run against a snapshot, so they may add or remove listeners
    /// without affecting the pass in progress. A failing listener is logged
    /// and the remaining ones still run.
    pub fn dispatch(&self, event: &Event) -> usize {
        if self.is_own_event(event) {
            debug!("Ignoring own {} event", event.event_type);
            return 0;
        }

        let listeners = self.listeners_for(event.event_type);
        for listener in &listeners {
            match guarded(|| listener(event)) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Listener for {} failed: {}", event.event_type, e),
                Err(panic) => error!("Listener for {} panicked: {}", event.event_type, panic),
            }
        }
        listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Channel, IncomingMessage, User};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn message_from(author: &str) -> Event {
        Event::message_create(IncomingMessage::new(User::new(author), Channel::new("c"), "hello"))
    }

    #[test]
    fn test_add_then_remove_leaves_type_empty() {
        let registry = EventListenerRegistry::new();
        let l = listener(|_| Ok(()));

        registry.add(EventType::MessageCreate, l.clone()).unwrap();
        assert_eq!(registry.listeners()[&EventType::MessageCreate].len(), 1);

        registry.remove(EventType::MessageCreate, &l).unwrap();
        assert!(registry.listeners_for(EventType::MessageCreate).is_empty());
    }

    #[test]
    fn test_remove_unknown_listener_is_not_found() {
        let registry = EventListenerRegistry::new();
        let kept = listener(|_| Ok(()));
        registry.add(EventType::MessageCreate, kept.clone()).unwrap();

        // Same behaviour, different allocation
        let stranger = listener(|_| Ok(()));
        let err = registry.remove(EventType::MessageCreate, &stranger).unwrap_err();
        assert_eq!(err, ListenerError::NotFound("MESSAGE_CREATE".to_string()));

        let remaining = registry.listeners_for(EventType::MessageCreate);
        assert_eq!(remaining.len(), 1);
        assert!(Arc::ptr_eq(&remaining[0], &kept));

        assert!(registry.remove(EventType::MessageDelete, &kept).is_err());
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let registry = EventListenerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let seen = seen.clone();
            registry
                .add(EventType::MessageCreate, listener(move |_| {
                    seen.lock().unwrap().push(i);
                    Ok(())
                }))
                .unwrap();
        }

        assert_eq!(registry.dispatch(&message_from("u1")), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_own_events_are_filtered() {
        let registry = EventListenerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        registry
            .add(EventType::MessageCreate, listener(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();
        registry.set_self_id(Some("bot".to_string()));

        registry.dispatch(&message_from("bot"));
        registry.dispatch(&message_from("someone"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failing_listener_does_not_stop_others() {
        let registry = EventListenerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        registry
            .add(EventType::MessageCreate, listener(|_| Err(BotError::Internal("nope".into()))))
            .unwrap();
        registry
            .add(EventType::MessageCreate, listener(|_| panic!("bad plugin")))
            .unwrap();
        let counter = calls.clone();
        registry
            .add(EventType::MessageCreate, listener(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();

        registry.dispatch(&message_from("u1"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_can_register_during_dispatch() {
        let registry = Arc::new(EventListenerRegistry::new());
        let inner = registry.clone();
        registry
            .add(EventType::MessageCreate, listener(move |_| {
                inner
                    .add(EventType::MessageCreate, listener(|_| Ok(())))
                    .map_err(BotError::from)
            }))
            .unwrap();

        assert_eq!(registry.dispatch(&message_from("u1")), 1);
        assert_eq!(registry.listeners_for(EventType::MessageCreate).len(), 2);
    }
}
