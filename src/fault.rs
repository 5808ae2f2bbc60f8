//! Fault classification and terminal handling for a connection.
//!
//! Every fault raised on the dispatch or transport path ends the same way:
//! the connection is closed. What varies is the log severity, chosen from an
//! explicit three-way classification rather than by matching on concrete
//! error types at the call site:
//!
//! - [`FaultKind::CorruptedFrame`]: the decoder could not parse a frame. A
//!   misbehaving or incompatible client, logged at warn.
//! - [`FaultKind::PeerReset`]: the peer dropped the socket abruptly. Normal
//!   network weather, logged at warn.
//! - [`FaultKind::Unclassified`]: anything else, indicating a defect in
//!   dispatch or collaborator logic, logged at error with full detail.

use std::io;

use thiserror::Error;
use tracing::{error, warn};

use crate::{connection::Connection, processor::ProcessorError};

/// Fault raised by the external decoder when bytes could not be parsed into
/// a valid frame.
///
/// Distinct from generic I/O errors so the classifier can treat frame
/// corruption as a client problem rather than a broker defect. Once a frame
/// fails to parse the stream may be desynchronised, so the only recovery is
/// closing the connection.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("corrupted frame: {detail}")]
pub struct CorruptedFrame {
    /// Decoder-supplied description of the parse failure.
    pub detail: String,
}

impl CorruptedFrame {
    /// Create a new corrupted-frame fault with the provided detail.
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Severity category assigned to a fault by [`EndpointError::fault_kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// The decoder rejected inbound bytes as an unparseable frame.
    CorruptedFrame,
    /// The peer closed the underlying socket abruptly.
    PeerReset,
    /// Any other failure; treated as a defect.
    Unclassified,
}

/// Top-level fault type raised on the dispatch and transport paths.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The decoder signalled an unparseable frame.
    #[error(transparent)]
    Decode(#[from] CorruptedFrame),
    /// An error in the underlying transport.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    /// The processing collaborator failed while handling a forwarded packet.
    #[error("processor error: {0}")]
    Processor(#[source] ProcessorError),
}

impl EndpointError {
    /// Classify this fault into its severity category.
    ///
    /// I/O errors count as a peer reset when the kind indicates the remote
    /// end dropped the socket; collaborator errors carry their own optional
    /// tag and default to [`FaultKind::Unclassified`].
    #[must_use]
    pub fn fault_kind(&self) -> FaultKind {
        match self {
            EndpointError::Decode(_) => FaultKind::CorruptedFrame,
            EndpointError::Io(error) => match error.kind() {
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe => FaultKind::PeerReset,
                _ => FaultKind::Unclassified,
            },
            EndpointError::Processor(error) => error.fault_kind(),
        }
    }
}

/// Log `error` at the severity matching its category, then close `conn`.
///
/// The terminal action is identical for every category: a faulted connection
/// is never kept alive in a possibly-inconsistent state. No retry happens at
/// this layer; MQTT's acknowledgment scheme is the correct place for that and
/// it lives with the collaborator's QoS state machines.
pub async fn handle_fault(conn: &dyn Connection, error: &EndpointError) {
    match error.fault_kind() {
        FaultKind::CorruptedFrame => {
            warn!(
                connection_id = %conn.id(),
                %error,
                "error decoding a packet, probably a badly formatted packet",
            );
        }
        FaultKind::PeerReset => {
            warn!(
                connection_id = %conn.id(),
                %error,
                "network connection closed abruptly",
            );
        }
        FaultKind::Unclassified => {
            error!(
                connection_id = %conn.id(),
                error = ?error,
                "unexpected failure while handling connection",
            );
        }
    }
    crate::metrics::inc_faults(error.fault_kind());
    conn.close().await;
}

#[cfg(test)]
mod tests;
