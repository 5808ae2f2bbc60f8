#![cfg(any(test, feature = "test-support"))]
//! Test doubles for exercising the endpoint without a real transport.
//!
//! [`RecordingConnection`] stands in for a transport session and captures
//! every packet written to it; [`RecordingProcessor`] stands in for the
//! processing collaborator and records each entry-point invocation, with
//! optional one-shot failure injection. Both are plain `std::sync`
//! state so assertions never race the code under test.

use std::{
    io,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    connection::{Connection, ConnectionId},
    packet::{Connect, ControlPacket, PacketId, Publish, Subscribe, Unsubscribe},
    processor::{PacketProcessor, ProcessorError, ProcessorResult},
};

/// In-memory transport handle capturing writes and close calls.
pub struct RecordingConnection {
    id: ConnectionId,
    client_id: Mutex<Option<String>>,
    writable: AtomicBool,
    close_calls: AtomicUsize,
    written: Mutex<Vec<ControlPacket>>,
    fail_writes: AtomicBool,
}

impl RecordingConnection {
    /// Create a handle with no bound client identity, initially writable.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id: ConnectionId::new(id),
            client_id: Mutex::new(None),
            writable: AtomicBool::new(true),
            close_calls: AtomicUsize::new(0),
            written: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Create a handle with a client identity already bound.
    #[must_use]
    pub fn with_client_id(id: u64, client_id: &str) -> Self {
        let conn = Self::new(id);
        conn.bind_client_id(client_id);
        conn
    }

    /// Flip the writability flag the transport would own.
    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::SeqCst);
    }

    /// Make subsequent writes fail with [`io::ErrorKind::BrokenPipe`].
    pub fn fail_writes(&self) { self.fail_writes.store(true, Ordering::SeqCst); }

    /// Snapshot of every packet written so far, in write order.
    #[must_use]
    pub fn written(&self) -> Vec<ControlPacket> {
        self.written.lock().expect("written lock").clone()
    }

    /// Whether `close` has been called at least once.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.close_calls.load(Ordering::SeqCst) > 0 }

    /// Number of times `close` has been called.
    #[must_use]
    pub fn close_calls(&self) -> usize { self.close_calls.load(Ordering::SeqCst) }
}

#[async_trait]
impl Connection for RecordingConnection {
    fn id(&self) -> ConnectionId { self.id }

    fn client_id(&self) -> Option<String> {
        self.client_id.lock().expect("client_id lock").clone()
    }

    fn bind_client_id(&self, client_id: &str) {
        let mut bound = self.client_id.lock().expect("client_id lock");
        if bound.is_none() {
            *bound = Some(client_id.to_owned());
        }
    }

    fn is_writable(&self) -> bool { self.writable.load(Ordering::SeqCst) }

    async fn write_and_flush(&self, packet: ControlPacket) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "send buffer gone"));
        }
        self.written.lock().expect("written lock").push(packet);
        Ok(())
    }

    async fn close(&self) { self.close_calls.fetch_add(1, Ordering::SeqCst); }
}

/// One recorded collaborator invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessorCall {
    /// `process_connect` was invoked.
    Connect {
        /// Handle the packet arrived on.
        connection: ConnectionId,
        /// The forwarded packet.
        packet: Connect,
    },
    /// `process_publish` was invoked.
    Publish {
        /// Handle the packet arrived on.
        connection: ConnectionId,
        /// The forwarded packet.
        packet: Publish,
    },
    /// `process_puback` was invoked.
    PubAck {
        /// Handle the packet arrived on.
        connection: ConnectionId,
        /// Identifier of the acknowledged delivery.
        packet_id: PacketId,
    },
    /// `process_pubrec` was invoked.
    PubRec {
        /// Handle the packet arrived on.
        connection: ConnectionId,
        /// Identifier of the acknowledged delivery.
        packet_id: PacketId,
    },
    /// `process_pubrel` was invoked.
    PubRel {
        /// Handle the packet arrived on.
        connection: ConnectionId,
        /// Identifier of the released exchange.
        packet_id: PacketId,
    },
    /// `process_pubcomp` was invoked.
    PubComp {
        /// Handle the packet arrived on.
        connection: ConnectionId,
        /// Identifier of the completed exchange.
        packet_id: PacketId,
    },
    /// `process_subscribe` was invoked.
    Subscribe {
        /// Handle the packet arrived on.
        connection: ConnectionId,
        /// The forwarded packet.
        packet: Subscribe,
    },
    /// `process_unsubscribe` was invoked.
    Unsubscribe {
        /// Handle the packet arrived on.
        connection: ConnectionId,
        /// The forwarded packet.
        packet: Unsubscribe,
    },
    /// `process_disconnect` was invoked.
    Disconnect {
        /// Handle the packet arrived on.
        connection: ConnectionId,
    },
    /// `connection_lost` was invoked.
    ConnectionLost {
        /// Identity of the lost client.
        client_id: String,
        /// Handle that went inactive.
        connection: ConnectionId,
    },
    /// `notify_writable` was invoked.
    Writable {
        /// Handle that became writable.
        connection: ConnectionId,
    },
}

/// Call-recording collaborator with one-shot failure injection.
#[derive(Default)]
pub struct RecordingProcessor {
    calls: Mutex<Vec<ProcessorCall>>,
    fail_next: Mutex<Option<ProcessorError>>,
}

impl RecordingProcessor {
    /// Create a processor that records calls and never fails.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Fail the next fallible entry point with `error`, then recover.
    pub fn fail_next(&self, error: ProcessorError) {
        *self.fail_next.lock().expect("fail_next lock") = Some(error);
    }

    /// Snapshot of recorded calls, in invocation order.
    #[must_use]
    pub fn calls(&self) -> Vec<ProcessorCall> { self.calls.lock().expect("calls lock").clone() }

    fn push(&self, call: ProcessorCall) { self.calls.lock().expect("calls lock").push(call); }

    fn record(&self, call: ProcessorCall) -> ProcessorResult {
        self.push(call);
        match self.fail_next.lock().expect("fail_next lock").take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PacketProcessor for RecordingProcessor {
    async fn process_connect(&self, conn: &dyn Connection, packet: Connect) -> ProcessorResult {
        self.record(ProcessorCall::Connect {
            connection: conn.id(),
            packet,
        })
    }

    async fn process_publish(&self, conn: &dyn Connection, packet: Publish) -> ProcessorResult {
        self.record(ProcessorCall::Publish {
            connection: conn.id(),
            packet,
        })
    }

    async fn process_puback(&self, conn: &dyn Connection, packet_id: PacketId) -> ProcessorResult {
        self.record(ProcessorCall::PubAck {
            connection: conn.id(),
            packet_id,
        })
    }

    async fn process_pubrec(&self, conn: &dyn Connection, packet_id: PacketId) -> ProcessorResult {
        self.record(ProcessorCall::PubRec {
            connection: conn.id(),
            packet_id,
        })
    }

    async fn process_pubrel(&self, conn: &dyn Connection, packet_id: PacketId) -> ProcessorResult {
        self.record(ProcessorCall::PubRel {
            connection: conn.id(),
            packet_id,
        })
    }

    async fn process_pubcomp(&self, conn: &dyn Connection, packet_id: PacketId) -> ProcessorResult {
        self.record(ProcessorCall::PubComp {
            connection: conn.id(),
            packet_id,
        })
    }

    async fn process_subscribe(&self, conn: &dyn Connection, packet: Subscribe) -> ProcessorResult {
        self.record(ProcessorCall::Subscribe {
            connection: conn.id(),
            packet,
        })
    }

    async fn process_unsubscribe(
        &self,
        conn: &dyn Connection,
        packet: Unsubscribe,
    ) -> ProcessorResult {
        self.record(ProcessorCall::Unsubscribe {
            connection: conn.id(),
            packet,
        })
    }

    async fn process_disconnect(&self, conn: &dyn Connection) -> ProcessorResult {
        self.record(ProcessorCall::Disconnect {
            connection: conn.id(),
        })
    }

    async fn connection_lost(&self, client_id: &str, conn: &dyn Connection) {
        self.push(ProcessorCall::ConnectionLost {
            client_id: client_id.to_owned(),
            connection: conn.id(),
        });
    }

    fn notify_writable(&self, conn: &dyn Connection) {
        self.push(ProcessorCall::Writable {
            connection: conn.id(),
        });
    }
}
