use crate::payload::Payload;
use async_trait::async_trait;
use std::sync::Arc;

/// A consumer of published events.
///
/// `handle` runs on its own task for every publish the subscriber is
/// registered for. Its result is never returned to the publisher; errors and
/// panics are only reported to the bus's [`DispatchObserver`].
///
/// [`DispatchObserver`]: crate::DispatchObserver
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn handle(&self, payload: &Payload) -> anyhow::Result<()>;

    /// Diagnostic name used in logs and dispatch outcomes.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

pub type SubscriberHandle = Arc<dyn Subscriber>;

/// Identity comparison: true when both handles point at the same subscriber
/// instance. Vtable pointers are ignored.
pub fn same_subscriber(a: &SubscriberHandle, b: &SubscriberHandle) -> bool {
    same_instance(a, b)
}

pub(crate) fn same_instance<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
