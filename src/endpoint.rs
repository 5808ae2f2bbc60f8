//! Transport-facing endpoint handler.
//!
//! [`EndpointHandler`] is the single object a transport integration drives:
//! decoded packets, inactivity, writability changes, and raised faults each
//! map to one method. One handler instance serves every connection — it
//! holds no per-connection state, only the dispatcher and the two lifecycle
//! observers, so it is cheap to share behind an `Arc` across the runtime's
//! worker pool. Per-connection ordering is the transport's job: frames for
//! one connection must be delivered here strictly in arrival order, one at a
//! time.

use std::sync::Arc;

use crate::{
    backpressure::WritabilityMonitor,
    connection::Connection,
    dispatch::{Dispatcher, SubscriptionPolicy},
    fault::{self, EndpointError},
    lifecycle::LifecycleTracker,
    packet::ControlPacket,
    processor::PacketProcessor,
};

/// Facade combining dispatch, lifecycle tracking, backpressure propagation,
/// and fault handling behind the four transport callbacks.
pub struct EndpointHandler {
    dispatcher: Dispatcher,
    lifecycle: LifecycleTracker,
    writability: WritabilityMonitor,
}

impl EndpointHandler {
    /// Create a handler with the default [`SubscriptionPolicy`].
    #[must_use]
    pub fn new(processor: Arc<dyn PacketProcessor>) -> Self {
        Self::with_policy(processor, SubscriptionPolicy::default())
    }

    /// Create a handler with an explicit subscription policy.
    #[must_use]
    pub fn with_policy(processor: Arc<dyn PacketProcessor>, policy: SubscriptionPolicy) -> Self {
        Self {
            dispatcher: Dispatcher::with_policy(Arc::clone(&processor), policy),
            lifecycle: LifecycleTracker::new(Arc::clone(&processor)),
            writability: WritabilityMonitor::new(processor),
        }
    }

    /// Subscription policy applied by the dispatcher.
    #[must_use]
    pub fn policy(&self) -> SubscriptionPolicy { self.dispatcher.policy() }

    /// A decoded packet arrived on `conn`.
    ///
    /// Dispatch failures are classified and terminal: the fault is logged at
    /// its category's severity and the connection is closed. A successful
    /// dispatch leaves the connection untouched.
    pub async fn packet_received(&self, conn: &dyn Connection, packet: ControlPacket) {
        if let Err(error) = self.dispatcher.dispatch(conn, packet).await {
            fault::handle_fault(conn, &error).await;
        }
    }

    /// The transport reported `conn` as inactive.
    pub async fn connection_inactive(&self, conn: &dyn Connection) {
        self.lifecycle.connection_inactive(conn).await;
    }

    /// The transport reported a writability transition for `conn`.
    pub fn writability_changed(&self, conn: &dyn Connection) {
        self.writability.writability_changed(conn);
    }

    /// The transport or decoder raised a fault for `conn` outside dispatch.
    ///
    /// Decoder corruption reports enter here as
    /// [`EndpointError::Decode`]; transport failures as
    /// [`EndpointError::Io`].
    pub async fn fault_raised(&self, conn: &dyn Connection, error: EndpointError) {
        fault::handle_fault(conn, &error).await;
    }

    /// Lifecycle tracker owned by this handler, for maintenance tasks.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleTracker { &self.lifecycle }
}
