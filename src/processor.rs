//! Contract with the processing collaborator.
//!
//! The collaborator owns everything stateful: session persistence,
//! subscription matching, retained messages, and the QoS 1/2 delivery state
//! machines. This crate only routes packets to it. All entry points take the
//! [`Connection`] handle the packet arrived on; the collaborator binds the
//! client identity to that handle while processing CONNECT and uses it to
//! tell a superseding reconnection apart from a genuine loss.
//!
//! Entry points are async so implementations may await their own I/O, but
//! they must not block the calling task for unbounded time; frame processing
//! for a connection is serialized behind them.

use async_trait::async_trait;

use crate::{
    connection::Connection,
    fault::FaultKind,
    packet::{Connect, PacketId, Publish, SubAck, Subscribe, SubscribeReturnCode, Unsubscribe},
};

/// Error returned by collaborator entry points.
///
/// Collaborators that can recognise a transport-level cause tag it with the
/// matching variant so the fault classifier logs it at the right severity;
/// everything else travels as [`ProcessorError::Other`] and is treated as
/// unclassified.
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    /// The collaborator detected frame-level corruption in packet contents.
    #[error("corrupted frame: {0}")]
    CorruptedFrame(String),
    /// The collaborator observed the peer dropping the connection.
    #[error("connection reset by peer")]
    PeerReset,
    /// Any other failure.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProcessorError {
    /// Wrap an arbitrary error as an unclassified processor failure.
    #[must_use]
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ProcessorError::Other(Box::new(error))
    }

    /// Severity category this error classifies into.
    #[must_use]
    pub fn fault_kind(&self) -> FaultKind {
        match self {
            ProcessorError::CorruptedFrame(_) => FaultKind::CorruptedFrame,
            ProcessorError::PeerReset => FaultKind::PeerReset,
            ProcessorError::Other(_) => FaultKind::Unclassified,
        }
    }
}

/// Result alias for collaborator entry points.
pub type ProcessorResult = Result<(), ProcessorError>;

/// Stateful packet-handling collaborator behind the dispatcher.
///
/// One implementation instance serves every connection; per-connection state
/// lives on the [`Connection`] handle or inside the collaborator's own
/// stores, never in this crate.
#[async_trait]
pub trait PacketProcessor: Send + Sync {
    /// Handle a CONNECT packet. A successful handshake binds the client
    /// identity to `conn` via [`Connection::bind_client_id`].
    async fn process_connect(&self, conn: &dyn Connection, packet: Connect) -> ProcessorResult;

    /// Handle an inbound PUBLISH.
    async fn process_publish(&self, conn: &dyn Connection, packet: Publish) -> ProcessorResult;

    /// Handle a PUBACK completing a QoS 1 delivery.
    async fn process_puback(&self, conn: &dyn Connection, packet_id: PacketId) -> ProcessorResult;

    /// Handle a PUBREC for the first leg of a QoS 2 delivery.
    async fn process_pubrec(&self, conn: &dyn Connection, packet_id: PacketId) -> ProcessorResult;

    /// Handle a PUBREL releasing a QoS 2 exchange.
    async fn process_pubrel(&self, conn: &dyn Connection, packet_id: PacketId) -> ProcessorResult;

    /// Handle a PUBCOMP completing a QoS 2 delivery.
    async fn process_pubcomp(&self, conn: &dyn Connection, packet_id: PacketId) -> ProcessorResult;

    /// Handle a SUBSCRIBE forwarded under
    /// [`SubscriptionPolicy::Process`](crate::dispatch::SubscriptionPolicy::Process).
    async fn process_subscribe(&self, conn: &dyn Connection, packet: Subscribe) -> ProcessorResult;

    /// Handle an UNSUBSCRIBE forwarded under
    /// [`SubscriptionPolicy::Process`](crate::dispatch::SubscriptionPolicy::Process).
    async fn process_unsubscribe(
        &self,
        conn: &dyn Connection,
        packet: Unsubscribe,
    ) -> ProcessorResult;

    /// Handle an orderly DISCONNECT. Only the handle is needed; the packet
    /// carries no further fields.
    async fn process_disconnect(&self, conn: &dyn Connection) -> ProcessorResult;

    /// A connection whose identity was bound went inactive.
    ///
    /// `conn` is the handle that was lost; implementations compare it
    /// against the session's current handle to distinguish a superseding
    /// reconnection from a genuine loss. Called before the transport
    /// resource is released, so last-known state on the handle is still
    /// readable.
    async fn connection_lost(&self, client_id: &str, conn: &dyn Connection);

    /// The transport for `conn` became writable again; queued outbound data
    /// may resume. Must not block: implementations hand off to their own
    /// scheduling.
    fn notify_writable(&self, conn: &dyn Connection);

    /// Build the acknowledgment refusing every filter of `request`.
    ///
    /// Pure helper used by the dispatcher's refuse-all subscription policy;
    /// the default echoes the request's packet identifier with a
    /// [`SubscribeReturnCode::Failure`] per filter.
    fn reject_subscription(&self, request: &Subscribe) -> SubAck {
        SubAck {
            packet_id: request.packet_id,
            return_codes: vec![SubscribeReturnCode::Failure; request.filters.len()],
        }
    }
}
