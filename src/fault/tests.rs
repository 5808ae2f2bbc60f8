//! Unit tests for fault classification and terminal handling.

use std::io;

use rstest::rstest;
use tracing_test::traced_test;

use super::*;
use crate::{processor::ProcessorError, test_support::RecordingConnection};

#[rstest]
#[case::reset(io::ErrorKind::ConnectionReset, FaultKind::PeerReset)]
#[case::aborted(io::ErrorKind::ConnectionAborted, FaultKind::PeerReset)]
#[case::broken_pipe(io::ErrorKind::BrokenPipe, FaultKind::PeerReset)]
#[case::timed_out(io::ErrorKind::TimedOut, FaultKind::Unclassified)]
#[case::other(io::ErrorKind::Other, FaultKind::Unclassified)]
fn io_errors_classify_by_kind(#[case] kind: io::ErrorKind, #[case] expected: FaultKind) {
    let error = EndpointError::Io(io::Error::new(kind, "socket fault"));
    assert_eq!(error.fault_kind(), expected);
}

#[test]
fn decode_errors_classify_as_corrupted_frame() {
    let error = EndpointError::Decode(CorruptedFrame::new("remaining length overflow"));
    assert_eq!(error.fault_kind(), FaultKind::CorruptedFrame);
}

#[rstest]
#[case::tagged_corruption(
    ProcessorError::CorruptedFrame("bad topic encoding".to_owned()),
    FaultKind::CorruptedFrame,
)]
#[case::tagged_reset(ProcessorError::PeerReset, FaultKind::PeerReset)]
#[case::untagged(
    ProcessorError::other(io::Error::other("store offline")),
    FaultKind::Unclassified,
)]
fn processor_errors_keep_their_tags(#[case] error: ProcessorError, #[case] expected: FaultKind) {
    assert_eq!(EndpointError::Processor(error).fault_kind(), expected);
}

#[traced_test]
#[tokio::test]
async fn corrupted_frame_logs_warning_and_closes() {
    let conn = RecordingConnection::new(7);
    let error = EndpointError::Decode(CorruptedFrame::new("remaining length overflow"));

    handle_fault(&conn, &error).await;

    assert_eq!(conn.close_calls(), 1);
    logs_assert(|lines: &[&str]| {
        if !lines
            .iter()
            .any(|line| line.contains("WARN") && line.contains("badly formatted packet"))
        {
            return Err("expected warn-level malformed-packet log".to_owned());
        }
        if lines.iter().any(|line| line.contains("ERROR")) {
            return Err("decode faults must never log at error level".to_owned());
        }
        Ok(())
    });
}

#[traced_test]
#[tokio::test]
async fn peer_reset_logs_warning_and_closes() {
    let conn = RecordingConnection::new(7);
    let error = EndpointError::Io(io::Error::new(
        io::ErrorKind::ConnectionReset,
        "connection reset by peer",
    ));

    handle_fault(&conn, &error).await;

    assert_eq!(conn.close_calls(), 1);
    logs_assert(|lines: &[&str]| {
        if !lines
            .iter()
            .any(|line| line.contains("WARN") && line.contains("closed abruptly"))
        {
            return Err("expected warn-level abrupt-close log".to_owned());
        }
        if lines.iter().any(|line| line.contains("ERROR")) {
            return Err("peer resets must never log at error level".to_owned());
        }
        Ok(())
    });
}

#[traced_test]
#[tokio::test]
async fn unclassified_fault_logs_error_with_detail_and_closes() {
    let conn = RecordingConnection::new(7);
    let error = EndpointError::Processor(ProcessorError::other(io::Error::other(
        "session store offline",
    )));

    handle_fault(&conn, &error).await;

    assert_eq!(conn.close_calls(), 1);
    logs_assert(|lines: &[&str]| {
        lines
            .iter()
            .find(|line| {
                line.contains("ERROR")
                    && line.contains("unexpected failure")
                    && line.contains("session store offline")
            })
            .map(|_| ())
            .ok_or_else(|| "expected error-level log with full fault detail".to_owned())
    });
}

#[tokio::test]
async fn terminal_action_is_close_for_every_category() {
    for error in [
        EndpointError::Decode(CorruptedFrame::new("bad frame")),
        EndpointError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone")),
        EndpointError::Processor(ProcessorError::other(io::Error::other("defect"))),
    ] {
        let conn = RecordingConnection::new(7);
        handle_fault(&conn, &error).await;
        assert_eq!(conn.close_calls(), 1, "{error} must close the connection");
    }
}
