#![doc(html_root_url = "https://docs.rs/brokerframe/latest")]
//! Public API for the `brokerframe` library.
//!
//! This crate is the control-packet dispatch and connection-lifecycle layer
//! of an MQTT broker endpoint. It sits on top of a decoded-frame transport:
//! the transport feeds it typed [`packet::ControlPacket`] values plus
//! lifecycle, writability, and fault callbacks, and it routes each of those
//! to a [`processor::PacketProcessor`] collaborator that owns sessions,
//! subscriptions, and the QoS delivery state machines.
//!
//! The entry point for transport integrations is
//! [`endpoint::EndpointHandler`]; the individual pieces (dispatcher,
//! lifecycle tracker, writability monitor, fault classifier) are public for
//! transports that wire the callbacks separately.

pub mod backpressure;
pub mod connection;
pub mod dispatch;
pub mod endpoint;
pub mod fault;
pub mod lifecycle;
pub mod metrics;
pub mod packet;
pub mod processor;
pub mod test_support;

pub use backpressure::WritabilityMonitor;
pub use connection::{Connection, ConnectionId};
pub use dispatch::{Dispatcher, SubscriptionPolicy};
pub use endpoint::EndpointHandler;
pub use fault::{CorruptedFrame, EndpointError, FaultKind};
pub use lifecycle::LifecycleTracker;
pub use packet::{ControlPacket, PacketId, PacketType, QoS};
pub use processor::{PacketProcessor, ProcessorError, ProcessorResult};
