//! Frame dispatching for inbound control packets.
//!
//! [`Dispatcher`] maps each decoded packet to exactly one handling action:
//! forward to the collaborator, answer directly on the transport, or
//! deliberately ignore. The mapping is a closed `match` over
//! [`ControlPacket`], so adding a variant forces a decision here rather than
//! falling into a default error arm.
//!
//! The dispatcher is stateless and shared across connections: it holds only
//! the collaborator reference and the subscription policy. Per-connection
//! state lives on the [`Connection`] handle.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    connection::Connection,
    fault::EndpointError,
    packet::{ControlPacket, PacketType, Unsubscribe},
    processor::PacketProcessor,
};

/// How SUBSCRIBE and UNSUBSCRIBE packets are handled.
///
/// The refuse-all mode models a broker configured to accept no new
/// subscriptions while still acknowledging requests so clients do not time
/// out waiting: SUBSCRIBE is answered with a failure code per filter and
/// UNSUBSCRIBE with a no-op acknowledgment, and neither reaches the
/// collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubscriptionPolicy {
    /// Refuse every SUBSCRIBE and fake-acknowledge every UNSUBSCRIBE.
    #[default]
    RefuseAll,
    /// Forward both packet types to the collaborator for normal handling.
    Process,
}

/// Stateless router from decoded packets to handling actions.
pub struct Dispatcher {
    processor: Arc<dyn PacketProcessor>,
    policy: SubscriptionPolicy,
}

impl Dispatcher {
    /// Create a dispatcher with the default [`SubscriptionPolicy`].
    #[must_use]
    pub fn new(processor: Arc<dyn PacketProcessor>) -> Self {
        Self::with_policy(processor, SubscriptionPolicy::default())
    }

    /// Create a dispatcher with an explicit subscription policy.
    #[must_use]
    pub fn with_policy(processor: Arc<dyn PacketProcessor>, policy: SubscriptionPolicy) -> Self {
        Self { processor, policy }
    }

    /// Subscription policy this dispatcher applies.
    #[must_use]
    pub fn policy(&self) -> SubscriptionPolicy { self.policy }

    /// Route one decoded packet to its handling action.
    ///
    /// Direct replies (SUBSCRIBE under refuse-all, UNSUBSCRIBE under
    /// refuse-all, PINGREQ) are flushed to the transport before this returns.
    /// Outbound-only packet types arriving inbound are ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`EndpointError`] when a collaborator entry point or a
    /// direct transport write fails. The fault is logged here with
    /// packet-type context and re-raised for the fault classifier; it is
    /// never swallowed, so a failed frame always reaches a teardown
    /// decision.
    pub async fn dispatch(
        &self,
        conn: &dyn Connection,
        packet: ControlPacket,
    ) -> Result<(), EndpointError> {
        let packet_type = packet.packet_type();
        debug!(connection_id = %conn.id(), %packet_type, "received control packet");
        crate::metrics::inc_packets(packet_type);

        let result = self.route(conn, packet).await;
        if let Err(error) = &result {
            debug!(
                connection_id = %conn.id(),
                %packet_type,
                %error,
                "packet handling failed, deferring to fault classifier",
            );
        }
        result
    }

    async fn route(
        &self,
        conn: &dyn Connection,
        packet: ControlPacket,
    ) -> Result<(), EndpointError> {
        let packet_type = packet.packet_type();
        match packet {
            ControlPacket::Connect(connect) => self
                .processor
                .process_connect(conn, connect)
                .await
                .map_err(EndpointError::Processor),
            ControlPacket::Publish(publish) => self
                .processor
                .process_publish(conn, publish)
                .await
                .map_err(EndpointError::Processor),
            ControlPacket::PubAck { packet_id } => self
                .processor
                .process_puback(conn, packet_id)
                .await
                .map_err(EndpointError::Processor),
            ControlPacket::PubRec { packet_id } => self
                .processor
                .process_pubrec(conn, packet_id)
                .await
                .map_err(EndpointError::Processor),
            ControlPacket::PubRel { packet_id } => self
                .processor
                .process_pubrel(conn, packet_id)
                .await
                .map_err(EndpointError::Processor),
            ControlPacket::PubComp { packet_id } => self
                .processor
                .process_pubcomp(conn, packet_id)
                .await
                .map_err(EndpointError::Processor),
            ControlPacket::Subscribe(subscribe) => match self.policy {
                SubscriptionPolicy::RefuseAll => {
                    let reject = self.processor.reject_subscription(&subscribe);
                    debug!(
                        connection_id = %conn.id(),
                        packet_id = %reject.packet_id,
                        filters = subscribe.filters.len(),
                        "refusing subscription request",
                    );
                    crate::metrics::inc_direct_replies(PacketType::SubAck);
                    conn.write_and_flush(ControlPacket::SubAck(reject)).await?;
                    Ok(())
                }
                SubscriptionPolicy::Process => self
                    .processor
                    .process_subscribe(conn, subscribe)
                    .await
                    .map_err(EndpointError::Processor),
            },
            ControlPacket::Unsubscribe(unsubscribe) => match self.policy {
                SubscriptionPolicy::RefuseAll => {
                    // Acknowledge without removing any subscription state.
                    let Unsubscribe { packet_id, .. } = unsubscribe;
                    crate::metrics::inc_direct_replies(PacketType::UnsubAck);
                    conn.write_and_flush(ControlPacket::UnsubAck { packet_id })
                        .await?;
                    Ok(())
                }
                SubscriptionPolicy::Process => self
                    .processor
                    .process_unsubscribe(conn, unsubscribe)
                    .await
                    .map_err(EndpointError::Processor),
            },
            ControlPacket::PingReq => {
                crate::metrics::inc_direct_replies(PacketType::PingResp);
                conn.write_and_flush(ControlPacket::PingResp).await?;
                Ok(())
            }
            ControlPacket::Disconnect => self
                .processor
                .process_disconnect(conn)
                .await
                .map_err(EndpointError::Processor),
            // Outbound-only acknowledgment types; a client sending one is
            // misbehaving but harmless, so they fall through untouched.
            ControlPacket::ConnAck { .. }
            | ControlPacket::SubAck(_)
            | ControlPacket::UnsubAck { .. }
            | ControlPacket::PingResp => {
                trace!(connection_id = %conn.id(), %packet_type, "ignoring outbound-only packet type");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests;
