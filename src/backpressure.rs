//! Transport writability observation.
//!
//! The transport reports every writability transition; only the recovering
//! edge matters here. When a connection's send buffer drains below its low
//! watermark the collaborator is told it may resume sending queued data for
//! that connection. The reverse edge is deliberately unobserved: the
//! collaborator sees its own send backlog and stops proactively, this signal
//! only unblocks it.

use std::sync::Arc;

use tracing::trace;

use crate::{connection::Connection, processor::PacketProcessor};

/// Observer forwarding writable transitions to the collaborator.
pub struct WritabilityMonitor {
    processor: Arc<dyn PacketProcessor>,
}

impl WritabilityMonitor {
    /// Create a monitor notifying the provided collaborator.
    #[must_use]
    pub fn new(processor: Arc<dyn PacketProcessor>) -> Self { Self { processor } }

    /// Handle a writability transition reported by the transport.
    ///
    /// Notifies the collaborator only when the connection is now writable.
    /// The notification is fire-and-forget: `notify_writable` hands off to
    /// the collaborator's own scheduling and never blocks this task.
    pub fn writability_changed(&self, conn: &dyn Connection) {
        if conn.is_writable() {
            trace!(connection_id = %conn.id(), "transport writable again");
            self.processor.notify_writable(conn);
        }
    }
}
