//! Metric helpers for `brokerframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops so call sites stay unconditional.

use crate::{fault::FaultKind, packet::PacketType};

/// Name of the counter tracking dispatched inbound packets.
pub const PACKETS_DISPATCHED: &str = "brokerframe_packets_dispatched_total";
/// Name of the counter tracking direct replies written by the dispatcher.
pub const DIRECT_REPLIES: &str = "brokerframe_direct_replies_total";
/// Name of the counter tracking classified faults.
pub const FAULTS_TOTAL: &str = "brokerframe_faults_total";
/// Name of the counter tracking connection-lost notifications.
pub const CONNECTIONS_LOST: &str = "brokerframe_connections_lost_total";

#[cfg(feature = "metrics")]
impl FaultKind {
    fn label(self) -> &'static str {
        match self {
            FaultKind::CorruptedFrame => "corrupted_frame",
            FaultKind::PeerReset => "peer_reset",
            FaultKind::Unclassified => "unclassified",
        }
    }
}

/// Record a dispatched inbound packet of the given type.
pub fn inc_packets(packet_type: PacketType) {
    #[cfg(feature = "metrics")]
    metrics::counter!(PACKETS_DISPATCHED, "packet_type" => packet_type.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = packet_type;
}

/// Record a direct reply written back by the dispatcher.
pub fn inc_direct_replies(packet_type: PacketType) {
    #[cfg(feature = "metrics")]
    metrics::counter!(DIRECT_REPLIES, "packet_type" => packet_type.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = packet_type;
}

/// Record a classified fault.
pub fn inc_faults(kind: FaultKind) {
    #[cfg(feature = "metrics")]
    metrics::counter!(FAULTS_TOTAL, "kind" => kind.label()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a connection-lost notification.
pub fn inc_connections_lost() {
    #[cfg(feature = "metrics")]
    metrics::counter!(CONNECTIONS_LOST).increment(1);
}
