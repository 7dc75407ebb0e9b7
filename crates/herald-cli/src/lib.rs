//! Herald CLI
//!
//! Wires the order subscribers to an [`EventBus`](herald_events::EventBus)
//! and publishes events from the command line:
//! - `herald run`: publish one `order.created` event and wait for handlers
//! - `herald publish <KEY>`: publish an arbitrary payload
//! - `herald config show`: print the resolved configuration

pub mod commands;
pub mod orders;

pub use commands::{Cli, Commands, ConfigCommands};
pub use orders::{
    new_order_payload, order_bus, OrderEmailSubscriber, OrderNotificationSubscriber,
    OrderPrintingSubscriber,
};
