//! Communicator protocol tests using MockTransport.
//!
//! These tests verify client behavior without network dependencies by using
//! a programmable mock transport that simulates SNMP agent responses.
//!
//! Run with: `cargo test --test client_mock`

mod common;

use common::{mock_client, sys_descr, sys_name, sys_object_id};
use snmp_v1::transport::{MockTransport, ResponseBuilder};
use snmp_v1::{Error, ErrorStatus, PduType, Value, Version, oid};

fn mock() -> MockTransport {
    MockTransport::new("127.0.0.1:161".parse().unwrap())
}

// ============================================================================
// GetRequest
// ============================================================================

#[tokio::test]
async fn get_entry_returns_values_in_request_order() {
    let mock = mock();
    mock.queue_response(
        ResponseBuilder::new(1)
            .varbind(sys_descr(), "Linux router")
            .varbind(sys_name(), "r1")
            .build(b"public"),
    );
    let client = mock_client(&mock);

    let result = client.get_entry(&[sys_descr(), sys_name()]).await.unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].value, Value::from("Linux router"));
    assert_eq!(result[1].oid, sys_name());

    let sent = mock.requests()[0].message.clone().unwrap();
    assert_eq!(sent.version, Version::V1);
    assert_eq!(&sent.community[..], b"public");
    let pdu = sent.into_standard_pdu().unwrap();
    assert_eq!(pdu.pdu_type, PduType::GetRequest);
    assert!(pdu.varbinds.iter().all(|vb| vb.value == Value::Null));
}

#[tokio::test]
async fn get_entry_rejects_wrong_echoed_oid() {
    let mock = mock();
    mock.queue_response(
        ResponseBuilder::new(1)
            .varbind(sys_object_id(), "Linux router")
            .build(b"public"),
    );
    let client = mock_client(&mock);

    let err = client.get_entry(&[sys_descr()]).await.unwrap_err();
    match *err {
        Error::Get { status, index, ref message, .. } => {
            assert_eq!(status, ErrorStatus::GenErr);
            assert_eq!(index, 1);
            assert!(message.contains("1.3.6.1.2.1.1.1.0"));
            assert!(message.contains("1.3.6.1.2.1.1.2.0"));
        }
        ref other => panic!("expected Get error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_error_status_carries_index_and_oid() {
    let mock = mock();
    mock.queue_response(
        ResponseBuilder::new(1)
            .varbind(sys_descr(), Value::Null)
            .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 99, 0), Value::Null)
            .error_status(ErrorStatus::NoSuchName)
            .error_index(2)
            .build(b"public"),
    );
    let client = mock_client(&mock);

    let err = client
        .get_entry(&[sys_descr(), oid!(1, 3, 6, 1, 2, 1, 1, 99, 0)])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(ErrorStatus::NoSuchName));
    assert_eq!(err.index(), Some(2));
    assert!(err.to_string().contains("1.3.6.1.2.1.1.99.0"));
}

#[tokio::test]
async fn get_next_entry_accepts_any_returned_oid() {
    let mock = mock();
    mock.queue_response(
        ResponseBuilder::new(1)
            .varbind(sys_object_id(), Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 8072)))
            .build(b"public"),
    );
    let client = mock_client(&mock);

    let vb = client.get_next(&sys_descr()).await.unwrap();
    assert_eq!(vb.oid, sys_object_id());
    let pdu = mock.requests()[0].message.clone().unwrap().into_standard_pdu().unwrap();
    assert_eq!(pdu.pdu_type, PduType::GetNextRequest);
}

// ============================================================================
// SetRequest
// ============================================================================

#[tokio::test]
async fn set_entry_length_mismatch_sends_nothing() {
    let mock = mock();
    let client = mock_client(&mock);

    let err = client
        .set_entry(&[sys_name(), sys_descr()], &[Value::from("r2")])
        .await
        .unwrap_err();

    assert_eq!(mock.sent_count(), 0);
    match *err {
        Error::Set { status, index, .. } => {
            assert_eq!(status, ErrorStatus::GenErr);
            assert_eq!(index, 0);
        }
        ref other => panic!("expected Set error, got {other:?}"),
    }
}

#[tokio::test]
async fn set_entry_sends_values() {
    let mock = mock();
    mock.queue_response(ResponseBuilder::new(1).varbind(sys_name(), "r2").build(b"public"));
    let client = mock_client(&mock);

    let result = client.set_entry(&[sys_name()], &[Value::from("r2")]).await.unwrap();
    assert_eq!(result[0].value, Value::from("r2"));

    let pdu = mock.requests()[0].message.clone().unwrap().into_standard_pdu().unwrap();
    assert_eq!(pdu.pdu_type, PduType::SetRequest);
    assert_eq!(pdu.varbinds[0].value, Value::from("r2"));
}

#[tokio::test]
async fn set_read_only_has_its_own_message() {
    let mock = mock();
    mock.queue_response(
        ResponseBuilder::new(1)
            .varbind(sys_descr(), "x")
            .error_status(ErrorStatus::ReadOnly)
            .error_index(1)
            .build(b"public"),
    );
    let client = mock_client(&mock);

    let err = client.set(&sys_descr(), Value::from("x")).await.unwrap_err();
    assert!(matches!(*err, Error::Set { status: ErrorStatus::ReadOnly, index: 1, .. }));
    assert!(err.to_string().contains("is read-only"));
}

// ============================================================================
// Request correlation and transport failures
// ============================================================================

#[tokio::test]
async fn stale_response_is_discarded_and_counted() {
    let mock = mock();
    mock.queue_raw_response(ResponseBuilder::new(9999).varbind(sys_descr(), "stale").build(b"public"));
    mock.queue_response(ResponseBuilder::new(1).varbind(sys_descr(), "fresh").build(b"public"));
    let client = mock_client(&mock);

    let vb = client.get(&sys_descr()).await.unwrap();
    assert_eq!(vb.value, Value::from("fresh"));
    assert_eq!(client.discarded_responses(), 1);
    assert_eq!(mock.sent_count(), 1);
}

#[tokio::test]
async fn request_ids_increase_per_request() {
    let mock = mock();
    mock.set_responder(|request| {
        let pdu = request.standard_pdu()?;
        Some(snmp_v1::Message::v1("public", pdu.to_response()))
    });
    let client = mock_client(&mock);

    client.get(&sys_descr()).await.unwrap();
    client.get(&sys_name()).await.unwrap();

    let ids: Vec<i32> = mock.requests().iter().filter_map(|r| r.request_id()).collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[1], ids[0] + 1);
}

#[tokio::test]
async fn timeout_is_not_retried() {
    let mock = mock();
    mock.queue_timeout();
    let client = mock_client(&mock);

    let err = client.get(&sys_descr()).await.unwrap_err();
    assert!(matches!(*err, Error::Timeout { .. }));
    assert_eq!(mock.sent_count(), 1);
}

#[tokio::test]
async fn io_error_surfaces_as_network() {
    let mock = mock();
    mock.queue_io_error("connection refused");
    let client = mock_client(&mock);

    let err = client.get(&sys_descr()).await.unwrap_err();
    assert!(matches!(*err, Error::Network { .. }));
}

#[tokio::test]
async fn malformed_response_is_a_decode_error() {
    let mock = mock();
    mock.queue_raw_response(vec![0x30, 0x03, 0x02, 0x01]);
    let client = mock_client(&mock);

    let err = client.get(&sys_descr()).await.unwrap_err();
    assert!(matches!(*err, Error::Decode { .. }));
}
