//! Unit tests for the frame dispatcher.
//!
//! Covers the fixed type-to-action table: forwarding branches, the
//! subscription policy overrides, direct replies, the ignore branch for
//! outbound-only types, and fault propagation.

use std::{io, sync::Arc};

use bytes::Bytes;
use rstest::rstest;

use super::*;
use crate::{
    connection::ConnectionId,
    fault::FaultKind,
    packet::{Connect, PacketId, Publish, QoS, SubAck, Subscribe, SubscribeReturnCode, TopicFilter},
    processor::ProcessorError,
    test_support::{ProcessorCall, RecordingConnection, RecordingProcessor},
};

fn connect_packet() -> Connect {
    Connect {
        client_id: "client-42".to_owned(),
        clean_session: true,
        keep_alive_secs: 30,
    }
}

fn publish_packet() -> Publish {
    Publish {
        topic: "sensors/kitchen/temp".to_owned(),
        qos: QoS::AtLeastOnce,
        packet_id: Some(PacketId::new(11)),
        retain: false,
        dup: false,
        payload: Bytes::from_static(b"21.5"),
    }
}

fn subscribe_packet(packet_id: u16, filters: &[&str]) -> Subscribe {
    Subscribe {
        packet_id: PacketId::new(packet_id),
        filters: filters
            .iter()
            .map(|filter| TopicFilter {
                filter: (*filter).to_owned(),
                qos: QoS::AtLeastOnce,
            })
            .collect(),
    }
}

#[tokio::test]
async fn connect_forwards_packet_and_handle() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    dispatcher
        .dispatch(&conn, ControlPacket::Connect(connect_packet()))
        .await
        .expect("dispatch connect");

    assert_eq!(
        processor.calls(),
        vec![ProcessorCall::Connect {
            connection: conn.id(),
            packet: connect_packet(),
        }]
    );
    assert!(conn.written().is_empty(), "connect must not write directly");
}

#[tokio::test]
async fn publish_forwards_packet_and_handle() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    dispatcher
        .dispatch(&conn, ControlPacket::Publish(publish_packet()))
        .await
        .expect("dispatch publish");

    assert_eq!(
        processor.calls(),
        vec![ProcessorCall::Publish {
            connection: conn.id(),
            packet: publish_packet(),
        }]
    );
    assert!(conn.written().is_empty());
}

/// Each QoS acknowledgment type reaches its dedicated entry point with the
/// request's packet identifier and triggers no direct write.
#[rstest]
#[case::puback(
    ControlPacket::PubAck { packet_id: PacketId::new(3) },
    ProcessorCall::PubAck { connection: ConnectionId::new(7), packet_id: PacketId::new(3) },
)]
#[case::pubrec(
    ControlPacket::PubRec { packet_id: PacketId::new(4) },
    ProcessorCall::PubRec { connection: ConnectionId::new(7), packet_id: PacketId::new(4) },
)]
#[case::pubrel(
    ControlPacket::PubRel { packet_id: PacketId::new(5) },
    ProcessorCall::PubRel { connection: ConnectionId::new(7), packet_id: PacketId::new(5) },
)]
#[case::pubcomp(
    ControlPacket::PubComp { packet_id: PacketId::new(6) },
    ProcessorCall::PubComp { connection: ConnectionId::new(7), packet_id: PacketId::new(6) },
)]
#[tokio::test]
async fn qos_acknowledgments_forward_to_dedicated_entry_points(
    #[case] packet: ControlPacket,
    #[case] expected: ProcessorCall,
) {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    dispatcher.dispatch(&conn, packet).await.expect("dispatch");

    assert_eq!(processor.calls(), vec![expected]);
    assert!(conn.written().is_empty());
}

#[tokio::test]
async fn disconnect_forwards_handle_only() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    dispatcher
        .dispatch(&conn, ControlPacket::Disconnect)
        .await
        .expect("dispatch disconnect");

    assert_eq!(
        processor.calls(),
        vec![ProcessorCall::Disconnect {
            connection: conn.id(),
        }]
    );
}

#[tokio::test]
async fn subscribe_is_refused_with_one_failure_per_filter() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    dispatcher
        .dispatch(
            &conn,
            ControlPacket::Subscribe(subscribe_packet(9, &["a", "b"])),
        )
        .await
        .expect("dispatch subscribe");

    assert!(
        processor.calls().is_empty(),
        "refused subscribe must never reach the processor"
    );
    assert_eq!(
        conn.written(),
        vec![ControlPacket::SubAck(SubAck {
            packet_id: PacketId::new(9),
            return_codes: vec![SubscribeReturnCode::Failure, SubscribeReturnCode::Failure],
        })]
    );
}

#[tokio::test]
async fn unsubscribe_is_acknowledged_without_processing() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    dispatcher
        .dispatch(
            &conn,
            ControlPacket::Unsubscribe(crate::packet::Unsubscribe {
                packet_id: PacketId::new(4),
                filters: vec!["a".to_owned()],
            }),
        )
        .await
        .expect("dispatch unsubscribe");

    assert!(processor.calls().is_empty());
    assert_eq!(
        conn.written(),
        vec![ControlPacket::UnsubAck {
            packet_id: PacketId::new(4),
        }]
    );
}

#[tokio::test]
async fn pingreq_is_answered_directly() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    dispatcher
        .dispatch(&conn, ControlPacket::PingReq)
        .await
        .expect("dispatch pingreq");

    assert!(processor.calls().is_empty());
    assert_eq!(conn.written(), vec![ControlPacket::PingResp]);
}

/// Outbound-only acknowledgment types arriving inbound are ignored without
/// error, writes, or collaborator calls.
#[rstest]
#[case::connack(ControlPacket::ConnAck { session_present: false })]
#[case::suback(ControlPacket::SubAck(SubAck {
    packet_id: PacketId::new(1),
    return_codes: vec![SubscribeReturnCode::GrantedQos0],
}))]
#[case::unsuback(ControlPacket::UnsubAck { packet_id: PacketId::new(2) })]
#[case::pingresp(ControlPacket::PingResp)]
#[tokio::test]
async fn outbound_only_types_are_ignored(#[case] packet: ControlPacket) {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    dispatcher.dispatch(&conn, packet).await.expect("dispatch");

    assert!(processor.calls().is_empty());
    assert!(conn.written().is_empty());
}

#[tokio::test]
async fn process_policy_forwards_subscribe_and_unsubscribe() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::with_policy(processor.clone(), SubscriptionPolicy::Process);
    let conn = RecordingConnection::new(7);

    dispatcher
        .dispatch(
            &conn,
            ControlPacket::Subscribe(subscribe_packet(9, &["a", "b"])),
        )
        .await
        .expect("dispatch subscribe");
    dispatcher
        .dispatch(
            &conn,
            ControlPacket::Unsubscribe(crate::packet::Unsubscribe {
                packet_id: PacketId::new(10),
                filters: vec!["a".to_owned()],
            }),
        )
        .await
        .expect("dispatch unsubscribe");

    assert_eq!(
        processor.calls(),
        vec![
            ProcessorCall::Subscribe {
                connection: conn.id(),
                packet: subscribe_packet(9, &["a", "b"]),
            },
            ProcessorCall::Unsubscribe {
                connection: conn.id(),
                packet: crate::packet::Unsubscribe {
                    packet_id: PacketId::new(10),
                    filters: vec!["a".to_owned()],
                },
            },
        ]
    );
    assert!(conn.written().is_empty(), "forwarding must not write directly");
}

#[test]
fn refuse_all_is_the_default_policy() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor);
    assert_eq!(dispatcher.policy(), SubscriptionPolicy::RefuseAll);
}

#[tokio::test]
async fn processor_fault_is_re_raised_unclassified() {
    let processor = Arc::new(RecordingProcessor::new());
    processor.fail_next(ProcessorError::other(io::Error::other(
        "session store offline",
    )));
    let dispatcher = Dispatcher::new(processor.clone());
    let conn = RecordingConnection::new(7);

    let error = dispatcher
        .dispatch(&conn, ControlPacket::Publish(publish_packet()))
        .await
        .expect_err("processor failure must propagate");

    assert_eq!(error.fault_kind(), FaultKind::Unclassified);
    assert!(!conn.is_closed(), "teardown belongs to the fault classifier");
}

#[tokio::test]
async fn tagged_processor_fault_keeps_its_category() {
    let processor = Arc::new(RecordingProcessor::new());
    processor.fail_next(ProcessorError::PeerReset);
    let dispatcher = Dispatcher::new(processor);
    let conn = RecordingConnection::new(7);

    let error = dispatcher
        .dispatch(&conn, ControlPacket::Disconnect)
        .await
        .expect_err("tagged failure must propagate");

    assert_eq!(error.fault_kind(), FaultKind::PeerReset);
}

#[tokio::test]
async fn failed_direct_reply_surfaces_transport_error() {
    let processor = Arc::new(RecordingProcessor::new());
    let dispatcher = Dispatcher::new(processor);
    let conn = RecordingConnection::new(7);
    conn.fail_writes();

    let error = dispatcher
        .dispatch(&conn, ControlPacket::PingReq)
        .await
        .expect_err("write failure must propagate");

    assert_eq!(error.fault_kind(), FaultKind::PeerReset);
}
