//! Node Lifecycle Events
//!
//! Synchronous pub/sub used by the node registry and health monitor to
//! announce node state transitions to the rest of the hub agent.
//!
//! Listeners are invoked in registration order on the thread that raised
//! the event. A failing listener is logged and skipped; it never blocks
//! delivery to the listeners registered after it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use zwave_rs::events::{EventDispatcher, NodeEvent};
//!
//! let events = EventDispatcher::new();
//! events.register_fn(|event| {
//!     if let NodeEvent::NodeOffline { node_id } = event {
//!         println!("node {} went offline", node_id);
//!     }
//!     Ok(())
//! });
//!
//! events.dispatch(&NodeEvent::NodeOffline { node_id: 9 });
//! ```

mod dispatcher;
mod event;

pub use dispatcher::{EventDispatcher, EventListener, ListenerError};
pub use event::NodeEvent;
