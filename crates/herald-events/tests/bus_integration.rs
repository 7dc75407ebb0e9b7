//! Integration tests for herald-events.
//!
//! Tests cover:
//! 1. The order-created scenario with three subscribers
//! 2. Slow handlers overtaking the return of `publish_event`
//! 3. Publishing from threads outside the runtime, with and without an
//!    explicit runtime handle
//! 4. Registry mutation racing with publication

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use herald_events::{EventBus, Payload, Subscriber, SubscriberHandle};
use parking_lot::Mutex;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    subscriber: &'static str,
    payload: Payload,
}

struct OrderSubscriber {
    name: &'static str,
    delay: Duration,
    invocations: Arc<Mutex<Vec<Invocation>>>,
    notify: mpsc::UnboundedSender<&'static str>,
}

impl OrderSubscriber {
    fn new(
        name: &'static str,
        delay: Duration,
        invocations: Arc<Mutex<Vec<Invocation>>>,
        notify: mpsc::UnboundedSender<&'static str>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            delay,
            invocations,
            notify,
        })
    }
}

#[async_trait]
impl Subscriber for OrderSubscriber {
    async fn handle(&self, payload: &Payload) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        self.invocations.lock().push(Invocation {
            subscriber: self.name,
            payload: payload.clone(),
        });
        let _ = self.notify.send(self.name);
        Ok(())
    }

    fn name(&self) -> &str {
        self.name
    }
}

struct Fixture {
    bus: EventBus,
    invocations: Arc<Mutex<Vec<Invocation>>>,
    done: mpsc::UnboundedReceiver<&'static str>,
}

fn order_fixture(delays: [u64; 3]) -> Fixture {
    let bus = EventBus::new();
    let invocations = Arc::new(Mutex::new(Vec::new()));
    let (tx, done) = mpsc::unbounded_channel();

    for (name, delay_ms) in ["printing", "email", "notification"].into_iter().zip(delays) {
        bus.add_subscriber(
            "order.created",
            OrderSubscriber::new(
                name,
                Duration::from_millis(delay_ms),
                invocations.clone(),
                tx.clone(),
            ),
        );
    }

    Fixture {
        bus,
        invocations,
        done,
    }
}

async fn wait_for(
    done: &mut mpsc::UnboundedReceiver<&'static str>,
    count: usize,
) -> Vec<&'static str> {
    let mut finished = Vec::new();
    for _ in 0..count {
        let name = tokio::time::timeout(Duration::from_secs(5), done.recv())
            .await
            .expect("timed out waiting for handlers")
            .expect("channel closed");
        finished.push(name);
    }
    finished
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_order_created_reaches_every_subscriber_once() {
    let mut fixture = order_fixture([0, 0, 0]);
    let payload = Payload::new().with("identifier", "abc-123");

    fixture.bus.publish_event("order.created", payload.clone());
    wait_for(&mut fixture.done, 3).await;

    let mut invocations = fixture.invocations.lock().clone();
    invocations.sort_by_key(|i| i.subscriber);

    assert_eq!(invocations.len(), 3);
    assert_eq!(
        invocations.iter().map(|i| i.subscriber).collect::<Vec<_>>(),
        vec!["email", "notification", "printing"]
    );
    assert!(invocations.iter().all(|i| i.payload == payload));
}

#[tokio::test]
async fn test_order_declined_reaches_nobody() {
    let mut fixture = order_fixture([0, 0, 0]);

    fixture.bus.publish_event(
        "order.declined",
        Payload::new().with("identifier", "abc-123"),
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(fixture.invocations.lock().is_empty());
    assert!(fixture.done.try_recv().is_err());
}

#[tokio::test]
async fn test_publish_returns_before_slow_handlers_finish() {
    let mut fixture = order_fixture([300, 200, 100]);

    let started = Instant::now();
    fixture
        .bus
        .publish_event("order.created", Payload::new().with("identifier", "abc-123"));
    let publish_took = started.elapsed();

    assert!(publish_took < Duration::from_millis(100));
    assert!(fixture.invocations.lock().is_empty());

    // Launched in registration order, completed in latency order.
    let finished = wait_for(&mut fixture.done, 3).await;
    assert_eq!(finished, vec!["notification", "email", "printing"]);
}

// ---------------------------------------------------------------------------
// Runtimes and threads
// ---------------------------------------------------------------------------

#[test]
fn test_publish_from_plain_thread_with_runtime_handle() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_time()
        .build()
        .unwrap();

    let bus = EventBus::new().with_runtime(runtime.handle().clone());
    let invocations = Arc::new(Mutex::new(Vec::new()));
    let (tx, mut done) = mpsc::unbounded_channel();
    bus.add_subscriber(
        "order.created",
        OrderSubscriber::new("printing", Duration::ZERO, invocations.clone(), tx),
    );

    let publisher = bus.clone();
    std::thread::spawn(move || {
        publisher.publish_event("order.created", Payload::new().with("identifier", "t-1"));
    })
    .join()
    .unwrap();

    let finished = runtime.block_on(wait_for(&mut done, 1));
    assert_eq!(finished, vec!["printing"]);
    assert_eq!(
        invocations.lock()[0].payload.get_str("identifier"),
        Some("t-1")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bus_built_in_runtime_publishes_from_plain_thread() {
    let bus = EventBus::new();
    let invocations = Arc::new(Mutex::new(Vec::new()));
    let (tx, mut done) = mpsc::unbounded_channel();
    bus.add_subscriber(
        "order.created",
        OrderSubscriber::new("email", Duration::ZERO, invocations.clone(), tx),
    );

    let publisher = bus.clone();
    let joined = std::thread::spawn(move || {
        publisher.publish_event("order.created", Payload::new().with("identifier", "t-2"));
    })
    .join();
    assert!(joined.is_ok(), "publishing thread panicked");

    let finished = wait_for(&mut done, 1).await;
    assert_eq!(finished, vec!["email"]);
    assert_eq!(
        invocations.lock()[0].payload.get_str("identifier"),
        Some("t-2")
    );
}

struct Counter {
    hits: Arc<AtomicUsize>,
}

#[async_trait]
impl Subscriber for Counter {
    async fn handle(&self, _payload: &Payload) -> anyhow::Result<()> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mutation_and_publication() {
    let bus = EventBus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let stable: SubscriberHandle = Arc::new(Counter { hits: hits.clone() });
    bus.add_subscriber("order.created", stable.clone());

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let bus = bus.clone();
        let hits = hits.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..100 {
                let churn: SubscriberHandle = Arc::new(Counter { hits: hits.clone() });
                bus.add_subscriber("order.created", churn.clone());
                bus.publish_event("order.created", Payload::new());
                bus.remove_subscriber("order.created", &churn);
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(bus.subscribers("order.created").len(), 1);
    assert!(bus.is_subscribed("order.created", &stable));

    // Every publish reached at least the stable subscriber.
    let deadline = Instant::now() + Duration::from_secs(5);
    while hits.load(Ordering::SeqCst) < 400 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(hits.load(Ordering::SeqCst) >= 400);
}
