//! Synchronous event dispatch to registered listeners.

use std::sync::{Arc, PoisonError, RwLock};

use super::event::NodeEvent;

/// Error type a listener may surface; logged by the dispatcher, never
/// propagated to the caller that raised the event.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Receiver of node lifecycle events.
pub trait EventListener: Send + Sync {
    /// Handle one event. Runs on the dispatching thread.
    fn on_event(&self, event: &NodeEvent) -> Result<(), ListenerError>;
}

/// Synchronous pub/sub hub for [`NodeEvent`]s.
///
/// Constructed explicitly and shared by handle wherever events are raised.
/// Delivery is in registration order on the calling thread. The listener
/// list is snapshotted before delivery, so a listener may register further
/// listeners without deadlocking; additions become visible on the next
/// dispatch.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    /// Create a dispatcher with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners are notified in registration order.
    pub fn register(&self, listener: Arc<dyn EventListener>) {
        self.write().push(listener);
    }

    /// Register a closure as a listener.
    pub fn register_fn<F>(&self, listener: F)
    where
        F: Fn(&NodeEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnListener(listener)));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.read().len()
    }

    /// Deliver an event to every registered listener.
    ///
    /// A listener error is logged and delivery continues with the next
    /// listener.
    pub fn dispatch(&self, event: &NodeEvent) {
        let listeners: Vec<Arc<dyn EventListener>> = self.read().clone();
        for listener in listeners {
            if let Err(err) = listener.on_event(event) {
                log::error!("event listener failed on {:?}: {}", event, err);
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Arc<dyn EventListener>>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Arc<dyn EventListener>>> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }
}

struct FnListener<F>(F);

impl<F> EventListener for FnListener<F>
where
    F: Fn(&NodeEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn on_event(&self, event: &NodeEvent) -> Result<(), ListenerError> {
        (self.0)(event)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_dispatch_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            dispatcher.register_fn(move |_| {
                order.lock().unwrap().push(tag);
                Ok(())
            });
        }

        dispatcher.dispatch(&NodeEvent::NodeOnline { node_id: 4 });
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_listener_error_does_not_stop_delivery() {
        let dispatcher = EventDispatcher::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        dispatcher.register_fn(|_| Err("boom".into()));
        let counter = Arc::clone(&delivered);
        dispatcher.register_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        dispatcher.dispatch(&NodeEvent::NodeRemoved { node_id: 2 });
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_register_during_dispatch() {
        let dispatcher = Arc::new(EventDispatcher::new());

        let inner = Arc::clone(&dispatcher);
        dispatcher.register_fn(move |_| {
            inner.register_fn(|_| Ok(()));
            Ok(())
        });

        dispatcher.dispatch(&NodeEvent::HomeIdChanged { home_id: 0xDEAD_BEEF });
        assert_eq!(dispatcher.listener_count(), 2);
    }
}
