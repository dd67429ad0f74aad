//! GetNext walk tests: scripted mock agents and an in-process agent.

mod common;

use common::{TestAgent, combined, interface_table, mock_client, system_mib, system_subtree};
use snmp_v1::transport::MockTransport;
use snmp_v1::{Error, ErrorStatus, Message, Oid, Pdu, PduType, Value, VarBind, oid};
use std::collections::BTreeMap;
use std::ops::{Bound, ControlFlow};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Mock agent answering GetNext from an ordered view.
///
/// Past the end of the view it answers noSuchName, as v1 agents do.
fn scripted(view: BTreeMap<Oid, Value>) -> MockTransport {
    let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
    mock.set_responder(move |request| {
        let pdu = request.standard_pdu()?;
        let mut varbinds = Vec::with_capacity(pdu.varbinds.len());
        for (i, vb) in pdu.varbinds.iter().enumerate() {
            match view.range((Bound::Excluded(&vb.oid), Bound::Unbounded)).next() {
                Some((oid, value)) => varbinds.push(VarBind::new(oid.clone(), value.clone())),
                None => {
                    let refusal = pdu.to_error_response(ErrorStatus::NoSuchName, i as i32 + 1);
                    return Some(Message::v1("public", refusal));
                }
            }
        }
        Some(Message::v1("public", Pdu::new(PduType::Response, pdu.request_id, varbinds)))
    });
    mock
}

fn view(oids: &[Oid]) -> BTreeMap<Oid, Value> {
    oids.iter()
        .enumerate()
        .map(|(i, oid)| (oid.clone(), Value::integer(i as i32)))
        .collect()
}

// ============================================================================
// Single-column walk
// ============================================================================

#[tokio::test]
async fn table_walk_stops_at_first_oid_outside_base() {
    let mock = scripted(view(&[
        oid!(1, 3, 6, 1, 2, 1, 1, 1),
        oid!(1, 3, 6, 1, 2, 1, 1, 2),
        oid!(1, 3, 6, 1, 2, 1, 2, 1),
    ]));
    let client = mock_client(&mock);

    let results = client.retrieve_table(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap();
    let oids: Vec<Oid> = results.into_iter().map(|vb| vb.oid).collect();
    assert_eq!(oids, vec![oid!(1, 3, 6, 1, 2, 1, 1, 1), oid!(1, 3, 6, 1, 2, 1, 1, 2)]);
    assert_eq!(mock.sent_count(), 3);
}

#[tokio::test]
async fn table_walk_uses_text_prefix() {
    let mock = scripted(view(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), oid!(1, 3, 6, 1, 2, 1, 10, 1)]));
    let client = mock_client(&mock);

    let results = client.retrieve_table(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].oid, oid!(1, 3, 6, 1, 2, 1, 10, 1));
}

#[tokio::test]
async fn table_walk_ends_cleanly_at_end_of_view() {
    let mock = scripted(view(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]));
    let client = mock_client(&mock);

    let results = client.retrieve_table(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn table_walk_stops_on_repeated_oid() {
    let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
    mock.set_responder(|request| {
        let pdu = request.standard_pdu()?;
        let stuck = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::integer(1));
        Some(Message::v1("public", Pdu::new(PduType::Response, pdu.request_id, vec![stuck])))
    });
    let client = mock_client(&mock);

    let results = client.retrieve_table(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(mock.sent_count(), 2);
}

#[tokio::test]
async fn cancellation_takes_effect_between_rounds() {
    let cancel = CancellationToken::new();
    let rounds = Arc::new(AtomicUsize::new(0));
    let view = view(&[
        oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
        oid!(1, 3, 6, 1, 2, 1, 1, 2, 0),
        oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
        oid!(1, 3, 6, 1, 2, 1, 1, 4, 0),
    ]);

    let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
    {
        let cancel = cancel.clone();
        let rounds = rounds.clone();
        mock.set_responder(move |request| {
            let pdu = request.standard_pdu()?;
            if rounds.fetch_add(1, Ordering::SeqCst) == 1 {
                cancel.cancel();
            }
            let (oid, value) = view
                .range((Bound::Excluded(&pdu.varbinds[0].oid), Bound::Unbounded))
                .next()?;
            let vb = VarBind::new(oid.clone(), value.clone());
            Some(Message::v1("public", Pdu::new(PduType::Response, pdu.request_id, vec![vb])))
        });
    }
    let client = mock_client(&mock);

    let results = client
        .retrieve_table_until(&oid!(1, 3, 6, 1, 2, 1, 1), &cancel)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(mock.sent_count(), 2);
}

#[tokio::test]
async fn walk_sink_can_stop_early() {
    let mock = scripted(view(&[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)]));
    let client = mock_client(&mock);

    let mut seen = Vec::new();
    client
        .walk_with(&oid!(1, 3, 6, 1, 2, 1, 1), &CancellationToken::new(), |vb| {
            seen.push(vb);
            ControlFlow::Break(())
        })
        .await
        .unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(mock.sent_count(), 1);
}

/// Mock agent whose GetNext answers follow `next`, which may cycle.
fn cycling(next: Vec<(Oid, Oid)>) -> MockTransport {
    let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
    mock.set_responder(move |request| {
        let pdu = request.standard_pdu()?;
        let varbinds = pdu
            .varbinds
            .iter()
            .map(|vb| {
                let (_, successor) = next.iter().find(|(from, _)| *from == vb.oid)?;
                Some(VarBind::new(successor.clone(), Value::integer(1)))
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Message::v1("public", Pdu::new(PduType::Response, pdu.request_id, varbinds)))
    });
    mock
}

#[tokio::test]
async fn walk_all_fails_when_agent_steps_backwards() {
    let mock = cycling(vec![
        (oid!(1, 3, 6, 1, 1), oid!(1, 3, 6, 1, 2)),
        (oid!(1, 3, 6, 1, 2), oid!(1, 3, 6, 1, 1)),
    ]);
    let client = mock_client(&mock);

    let err = client.retrieve_all_from(&oid!(1, 3, 6, 1, 1)).await.unwrap_err();
    assert_eq!(err.status(), Some(ErrorStatus::GenErr));
    assert_eq!(err.index(), Some(1));
    assert!(err.to_string().contains("not increasing"));
    assert_eq!(mock.sent_count(), 2);
}

#[tokio::test]
async fn table_walk_fails_when_agent_steps_backwards() {
    let mock = cycling(vec![
        (oid!(1, 3, 6, 1, 2, 1, 1), oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)),
        (oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)),
        (oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)),
    ]);
    let client = mock_client(&mock);

    let err = client.retrieve_table(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap_err();
    assert!(matches!(*err, Error::Get { status: ErrorStatus::GenErr, index: 1, .. }));
    assert_eq!(mock.sent_count(), 2);
}

#[tokio::test]
async fn row_walk_fails_when_a_column_steps_backwards() {
    let mock = cycling(vec![
        (column(1), column(1).child(1)),
        (column(2), column(2).child(2)),
        (column(1).child(1), column(1).child(2)),
        (column(2).child(2), column(2).child(1)),
    ]);
    let client = mock_client(&mock);

    let err = client
        .retrieve_table_columns(&[column(1), column(2)])
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(ErrorStatus::GenErr));
    assert_eq!(err.index(), Some(2));
}

// ============================================================================
// Row-wise walk
// ============================================================================

fn column(n: u32) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, n)
}

#[tokio::test]
async fn row_walk_returns_lockstep_rows() {
    let mut cells = Vec::new();
    for col in 1..=3 {
        for row in 1..=2 {
            cells.push(column(col).child(row));
        }
    }
    let mock = scripted(view(&cells));
    let client = mock_client(&mock);

    let rows = client
        .retrieve_table_columns(&[column(1), column(2), column(3)])
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.iter().map(Vec::len).sum::<usize>(), 6);
    assert_eq!(rows[1][2].oid, column(3).child(2));
}

#[tokio::test]
async fn row_walk_reports_incomplete_row_column() {
    let cells = vec![
        column(1).child(1),
        column(1).child(2),
        column(2).child(1),
        column(3).child(1),
        column(3).child(2),
    ];
    let mock = scripted(view(&cells));
    let client = mock_client(&mock);

    let err = client
        .retrieve_table_columns(&[column(1), column(2), column(3)])
        .await
        .unwrap_err();
    match *err {
        Error::IncompleteRow { index, .. } => assert_eq!(index, 2),
        ref other => panic!("expected IncompleteRow, got {other:?}"),
    }
    assert_eq!(err.status(), Some(ErrorStatus::GenErr));
}

#[tokio::test]
async fn row_walk_with_no_columns_sends_nothing() {
    let mock = scripted(BTreeMap::new());
    let client = mock_client(&mock);

    assert!(client.retrieve_table_columns(&[]).await.unwrap().is_empty());
    assert_eq!(mock.sent_count(), 0);
}

// ============================================================================
// Unbounded walk
// ============================================================================

#[tokio::test]
async fn walk_all_crosses_subtrees_until_end_of_view() {
    let mock = scripted(view(&[
        oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
        oid!(1, 3, 6, 1, 2, 1, 2, 1, 0),
        oid!(1, 3, 6, 1, 4, 1, 9, 1),
    ]));
    let client = mock_client(&mock);

    let results = client.retrieve_all_from(&oid!(1, 3)).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[2].oid, oid!(1, 3, 6, 1, 4, 1, 9, 1));
}

// ============================================================================
// Against a real agent
// ============================================================================

#[tokio::test]
async fn walks_against_in_process_agent() {
    let agent = TestAgent::with_data(combined([system_mib(), interface_table(3)])).await;
    let client = agent.client().await;

    let system = client.retrieve_table(&system_subtree()).await.unwrap();
    assert_eq!(system.len(), 7);
    assert_eq!(system[0].value, Value::from("Test SNMP Agent"));

    let rows = client
        .retrieve_table_columns(&[column(1), column(2), column(5)])
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][1].value, Value::from("eth2"));
    assert_eq!(rows[0][2].value, Value::Gauge32(1_000_000_000));

    let everything = client.retrieve_all_from(&oid!(1, 3)).await.unwrap();
    assert_eq!(everything.len(), 7 + 1 + 3 * 6);
}
