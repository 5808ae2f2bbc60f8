//! Transport-side connection handle contract.
//!
//! A [`Connection`] is an opaque reference to one live transport session. The
//! transport creates it on accept and destroys it on close; this layer only
//! reads state from it and reacts. The handle carries the two pieces of
//! per-connection state this crate cares about: the writability flag (owned by
//! the transport) and the logical client identity (bound exactly once by the
//! processing collaborator while handling CONNECT).

use std::io;

use async_trait::async_trait;

use crate::packet::ControlPacket;

/// Identifier assigned to a transport connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create a new [`ConnectionId`] with the provided value.
    #[must_use]
    pub fn new(id: u64) -> Self { Self(id) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub fn as_u64(&self) -> u64 { self.0 }
}

impl From<u64> for ConnectionId {
    fn from(value: u64) -> Self { Self(value) }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

/// Handle to one live transport session.
///
/// Implementations wrap whatever the transport uses for a socket session.
/// All methods must be callable concurrently from different tasks; this layer
/// never invokes two of them concurrently for the same frame, but lifecycle
/// and writability callbacks may race with dispatch on other connections.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Stable identifier for this transport session.
    fn id(&self) -> ConnectionId;

    /// Logical client identity bound to this connection, if a CONNECT has
    /// been processed. Empty or absent before that point.
    fn client_id(&self) -> Option<String>;

    /// Bind the logical client identity.
    ///
    /// Called by the processing collaborator exactly once, while handling a
    /// successful CONNECT. Implementations keep the first binding; later
    /// calls are ignored.
    fn bind_client_id(&self, client_id: &str);

    /// Whether the transport's send buffer currently accepts more data.
    fn is_writable(&self) -> bool;

    /// Enqueue `packet` on the transport's send buffer and request a flush.
    ///
    /// This is a non-blocking enqueue; the transport completes the flush
    /// asynchronously.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the transport has already failed or
    /// closed.
    async fn write_and_flush(&self, packet: ControlPacket) -> io::Result<()>;

    /// Release the transport session.
    ///
    /// Must be idempotent: closing an already-closed connection is a no-op.
    async fn close(&self);
}
