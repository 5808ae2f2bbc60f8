//! Typed MQTT control-packet model consumed by the dispatcher.
//!
//! Packets arrive here already decoded and validated by the wire codec; this
//! module only names their shapes. The [`ControlPacket`] enum is closed: every
//! inbound type the dispatcher acts on has a variant, and the outbound-only
//! acknowledgment types are present so an exhaustive `match` can route them to
//! the deliberate no-op branch rather than a catch-all error.

use bytes::Bytes;

/// MQTT packet identifier carried by acknowledged packet types.
///
/// The wire format reserves zero, but the decoder owns that validation; this
/// newtype only provides a typed handle for correlation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PacketId(u16);

impl PacketId {
    /// Create a new [`PacketId`] with the provided value.
    #[must_use]
    pub fn new(id: u16) -> Self { Self(id) }

    /// Return the inner `u16` representation.
    #[must_use]
    pub fn as_u16(&self) -> u16 { self.0 }
}

impl From<u16> for PacketId {
    fn from(value: u16) -> Self { Self(value) }
}

impl std::fmt::Display for PacketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PacketId({})", self.0)
    }
}

/// Delivery quality-of-service level requested for a publication.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum QoS {
    /// Fire-and-forget delivery.
    #[default]
    AtMostOnce,
    /// Acknowledged delivery (PUBACK flow).
    AtLeastOnce,
    /// Assured delivery (PUBREC/PUBREL/PUBCOMP flow).
    ExactlyOnce,
}

/// Per-filter outcome reported in a SUBACK.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscribeReturnCode {
    /// Subscription granted at QoS 0.
    GrantedQos0,
    /// Subscription granted at QoS 1.
    GrantedQos1,
    /// Subscription granted at QoS 2.
    GrantedQos2,
    /// Subscription refused.
    Failure,
}

/// Fields of a CONNECT packet relevant to session establishment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connect {
    /// Logical client identity requested by the peer.
    pub client_id: String,
    /// Whether the peer asked for a fresh session.
    pub clean_session: bool,
    /// Keep-alive interval negotiated by the peer, in seconds.
    pub keep_alive_secs: u16,
}

/// An application message published by the peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Publish {
    /// Topic the message is published to.
    pub topic: String,
    /// Delivery QoS requested by the sender.
    pub qos: QoS,
    /// Packet identifier; present only for QoS 1 and 2.
    pub packet_id: Option<PacketId>,
    /// Retain flag from the fixed header.
    pub retain: bool,
    /// Duplicate-delivery flag from the fixed header.
    pub dup: bool,
    /// Application payload.
    pub payload: Bytes,
}

/// One topic filter requested in a SUBSCRIBE packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicFilter {
    /// Topic filter string, possibly containing wildcards.
    pub filter: String,
    /// Maximum QoS the subscriber is willing to receive.
    pub qos: QoS,
}

/// A subscription request covering one or more topic filters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscribe {
    /// Identifier echoed by the SUBACK.
    pub packet_id: PacketId,
    /// Requested filters, in request order.
    pub filters: Vec<TopicFilter>,
}

/// Acknowledgment for a SUBSCRIBE, one return code per requested filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubAck {
    /// Identifier of the SUBSCRIBE being answered.
    pub packet_id: PacketId,
    /// Outcomes in the same order as the request's filters.
    pub return_codes: Vec<SubscribeReturnCode>,
}

/// A request to remove one or more subscriptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unsubscribe {
    /// Identifier echoed by the UNSUBACK.
    pub packet_id: PacketId,
    /// Filters to remove.
    pub filters: Vec<String>,
}

/// Decoded MQTT control packet.
///
/// Produced by the external decoder and consumed exactly once by
/// [`Dispatcher::dispatch`](crate::dispatch::Dispatcher::dispatch). The
/// QoS acknowledgment variants carry only their packet identifier, matching
/// the variable header of those packet types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlPacket {
    /// Session establishment request.
    Connect(Connect),
    /// Session establishment response (outbound only; ignored inbound).
    ConnAck {
        /// Whether the broker resumed stored session state.
        session_present: bool,
    },
    /// Application message.
    Publish(Publish),
    /// QoS 1 delivery acknowledgment.
    PubAck {
        /// Identifier of the PUBLISH being acknowledged.
        packet_id: PacketId,
    },
    /// QoS 2 delivery, first acknowledgment leg.
    PubRec {
        /// Identifier of the PUBLISH being acknowledged.
        packet_id: PacketId,
    },
    /// QoS 2 delivery, release leg.
    PubRel {
        /// Identifier of the exchange being released.
        packet_id: PacketId,
    },
    /// QoS 2 delivery, completion leg.
    PubComp {
        /// Identifier of the completed exchange.
        packet_id: PacketId,
    },
    /// Subscription request.
    Subscribe(Subscribe),
    /// Subscription acknowledgment (outbound only; ignored inbound).
    SubAck(SubAck),
    /// Unsubscription request.
    Unsubscribe(Unsubscribe),
    /// Unsubscription acknowledgment (outbound only; ignored inbound).
    UnsubAck {
        /// Identifier of the UNSUBSCRIBE being answered.
        packet_id: PacketId,
    },
    /// Keep-alive probe.
    PingReq,
    /// Keep-alive response (outbound only; ignored inbound).
    PingResp,
    /// Orderly session termination.
    Disconnect,
}

impl ControlPacket {
    /// Return the wire-level type tag of this packet.
    #[must_use]
    pub fn packet_type(&self) -> PacketType {
        match self {
            ControlPacket::Connect(_) => PacketType::Connect,
            ControlPacket::ConnAck { .. } => PacketType::ConnAck,
            ControlPacket::Publish(_) => PacketType::Publish,
            ControlPacket::PubAck { .. } => PacketType::PubAck,
            ControlPacket::PubRec { .. } => PacketType::PubRec,
            ControlPacket::PubRel { .. } => PacketType::PubRel,
            ControlPacket::PubComp { .. } => PacketType::PubComp,
            ControlPacket::Subscribe(_) => PacketType::Subscribe,
            ControlPacket::SubAck(_) => PacketType::SubAck,
            ControlPacket::Unsubscribe(_) => PacketType::Unsubscribe,
            ControlPacket::UnsubAck { .. } => PacketType::UnsubAck,
            ControlPacket::PingReq => PacketType::PingReq,
            ControlPacket::PingResp => PacketType::PingResp,
            ControlPacket::Disconnect => PacketType::Disconnect,
        }
    }
}

/// Control-packet type tag, used for log lines and metric labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// CONNECT packet.
    Connect,
    /// CONNACK packet.
    ConnAck,
    /// PUBLISH packet.
    Publish,
    /// PUBACK packet.
    PubAck,
    /// PUBREC packet.
    PubRec,
    /// PUBREL packet.
    PubRel,
    /// PUBCOMP packet.
    PubComp,
    /// SUBSCRIBE packet.
    Subscribe,
    /// SUBACK packet.
    SubAck,
    /// UNSUBSCRIBE packet.
    Unsubscribe,
    /// UNSUBACK packet.
    UnsubAck,
    /// PINGREQ packet.
    PingReq,
    /// PINGRESP packet.
    PingResp,
    /// DISCONNECT packet.
    Disconnect,
}

impl PacketType {
    /// Stable lowercase name for logs and metric labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PacketType::Connect => "connect",
            PacketType::ConnAck => "connack",
            PacketType::Publish => "publish",
            PacketType::PubAck => "puback",
            PacketType::PubRec => "pubrec",
            PacketType::PubRel => "pubrel",
            PacketType::PubComp => "pubcomp",
            PacketType::Subscribe => "subscribe",
            PacketType::SubAck => "suback",
            PacketType::Unsubscribe => "unsubscribe",
            PacketType::UnsubAck => "unsuback",
            PacketType::PingReq => "pingreq",
            PacketType::PingResp => "pingresp",
            PacketType::Disconnect => "disconnect",
        }
    }
}

impl std::fmt::Display for PacketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
