//! Herald events - in-process event bus
//!
//! Subscribers register against string event keys; publishing an event
//! spawns every matching subscriber's handler as its own Tokio task and
//! returns without waiting for any of them.
//!
//! ```ignore
//! let bus = EventBus::new();
//! bus.add_subscriber("order.created", printer.clone());
//! bus.publish_event("order.created", Payload::new().with("identifier", "abc-123"));
//! ```

mod bus;
mod error;
mod key;
mod observer;
mod payload;
mod subscriber;

pub use bus::EventBus;
pub use error::{EventError, Result};
pub use key::EventKey;
pub use observer::{DispatchObserver, DispatchOutcome, DispatchStatus, TracingObserver};
pub use payload::Payload;
pub use subscriber::{same_subscriber, Subscriber, SubscriberHandle};
