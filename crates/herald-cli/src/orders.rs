//! Order subscribers used by the demo.
//!
//! Each one simulates a slow side effect (printing, emailing, pushing a
//! notification) by sleeping before it reports the order identifier.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use colored::Colorize;
use herald_config::DemoSettings;
use herald_events::{EventBus, Payload, Subscriber};
use std::sync::Arc;
use std::time::Duration;

fn order_identifier(payload: &Payload) -> anyhow::Result<&str> {
    payload
        .get_str("identifier")
        .context("order payload has no string `identifier`")
}

fn announce(identifier: &str, destination: &str) {
    println!(
        "Sending order {} to {} at {}...",
        identifier.yellow(),
        destination,
        Utc::now().format("%H:%M:%S%.3f").to_string().dimmed()
    );
}

pub struct OrderPrintingSubscriber {
    delay: Duration,
}

impl OrderPrintingSubscriber {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Subscriber for OrderPrintingSubscriber {
    async fn handle(&self, payload: &Payload) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        announce(order_identifier(payload)?, "printer queue");
        Ok(())
    }

    fn name(&self) -> &str {
        "order-printing"
    }
}

pub struct OrderEmailSubscriber {
    delay: Duration,
}

impl OrderEmailSubscriber {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Subscriber for OrderEmailSubscriber {
    async fn handle(&self, payload: &Payload) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        announce(order_identifier(payload)?, "emailer queue");
        Ok(())
    }

    fn name(&self) -> &str {
        "order-email"
    }
}

pub struct OrderNotificationSubscriber {
    delay: Duration,
}

impl OrderNotificationSubscriber {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Subscriber for OrderNotificationSubscriber {
    async fn handle(&self, payload: &Payload) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        announce(order_identifier(payload)?, "push notification service");
        Ok(())
    }

    fn name(&self) -> &str {
        "order-notification"
    }
}

/// Bus with the printing, email and notification subscribers registered
/// under `settings.event_key`, in that order.
pub fn order_bus(settings: &DemoSettings) -> EventBus {
    let bus = EventBus::new();
    let key = settings.event_key.as_str();
    let delays = &settings.delays;

    let printing = OrderPrintingSubscriber::new(Duration::from_millis(delays.printing_ms));
    let email = OrderEmailSubscriber::new(Duration::from_millis(delays.email_ms));
    let notification =
        OrderNotificationSubscriber::new(Duration::from_millis(delays.notification_ms));

    bus.add_subscriber(key, Arc::new(printing));
    bus.add_subscriber(key, Arc::new(email));
    bus.add_subscriber(key, Arc::new(notification));

    bus
}

/// `{"identifier": <uuid v4>}`
pub fn new_order_payload() -> Payload {
    Payload::new().with("identifier", uuid::Uuid::new_v4().to_string())
}
