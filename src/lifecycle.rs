//! Connection-loss detection and notification.
//!
//! [`LifecycleTracker`] reacts to the transport reporting a connection as
//! inactive, whether from a peer close, a local close, or an idle timeout the
//! transport enforced. If the handle carries a bound client identity the
//! collaborator is told the client's connection was lost; a handle that never
//! completed a CONNECT has no logical session to reconcile and produces no
//! notification. Either way the transport resource is released afterwards —
//! notification strictly precedes release so the collaborator can still read
//! last-known state off the handle.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::{
    connection::{Connection, ConnectionId},
    processor::PacketProcessor,
};

/// Observer translating transport-inactive events into connection-lost
/// notifications.
pub struct LifecycleTracker {
    processor: Arc<dyn PacketProcessor>,
    /// Connections whose inactive event has already been handled. First
    /// insert wins, making duplicate inactive events for one handle a no-op.
    notified: DashMap<ConnectionId, ()>,
}

impl LifecycleTracker {
    /// Create a tracker notifying the provided collaborator.
    #[must_use]
    pub fn new(processor: Arc<dyn PacketProcessor>) -> Self {
        Self {
            processor,
            notified: DashMap::new(),
        }
    }

    /// Handle the transport reporting `conn` as inactive.
    ///
    /// Issues at most one connection-lost notification per connection id,
    /// then closes the handle. Safe to call again for the same handle.
    pub async fn connection_inactive(&self, conn: &dyn Connection) {
        if self.notified.insert(conn.id(), ()).is_some() {
            debug!(connection_id = %conn.id(), "duplicate inactive event ignored");
            return;
        }

        match conn.client_id().filter(|id| !id.is_empty()) {
            Some(client_id) => {
                debug!(
                    connection_id = %conn.id(),
                    client_id = %client_id,
                    "connection lost, notifying processor",
                );
                crate::metrics::inc_connections_lost();
                self.processor.connection_lost(&client_id, conn).await;
            }
            None => {
                // Never completed a CONNECT; nothing to reconcile.
                debug!(
                    connection_id = %conn.id(),
                    "connection went inactive before CONNECT completed",
                );
            }
        }

        conn.close().await;
    }

    /// Drop bookkeeping for connection ids the transport has fully retired.
    ///
    /// Transports recycling connection ids must not call this while a
    /// retired id may still receive a late inactive event.
    pub fn forget(&self, id: &ConnectionId) { self.notified.remove(id); }

    /// Number of connections whose teardown has been recorded.
    #[must_use]
    pub fn recorded(&self) -> usize { self.notified.len() }
}
