//! BER encoding/decoding benchmarks.
//!
//! The codec sits on the hot path of every request, response and trap.

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use snmp_v1::ber::{Decoder, EncodeBuf, decode_length, encode_length};
use snmp_v1::oid::Oid;
use snmp_v1::value::Value;
use snmp_v1::varbind::{VarBind, decode_varbind_list, encode_varbind_list};
use snmp_v1::{Message, Pdu, PduType};
use std::hint::black_box;

fn common_oids() -> Vec<(&'static str, Oid)> {
    vec![
        ("sysDescr", Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0])),
        ("ifIndex", Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1])),
        (
            "long_oid",
            Oid::from_slice(&[1, 3, 6, 1, 4, 1, 9, 9, 42, 1, 2, 3, 4, 5, 6, 7]),
        ),
    ]
}

fn bench_oid(c: &mut Criterion) {
    let mut group = c.benchmark_group("oid");

    for (name, oid) in common_oids() {
        group.bench_with_input(BenchmarkId::new("to_ber", name), &oid, |b, oid| {
            b.iter(|| black_box(oid.to_ber()))
        });

        let encoded = oid.to_ber();
        group.bench_with_input(BenchmarkId::new("from_ber", name), &encoded, |b, data| {
            b.iter(|| black_box(Oid::from_ber(data).unwrap()))
        });

        let text = oid.to_string();
        group.bench_with_input(BenchmarkId::new("parse", name), &text, |b, s| {
            b.iter(|| black_box(Oid::parse(s).unwrap()))
        });
    }

    group.finish();
}

fn bench_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("length");

    for len in [5usize, 200, 70_000] {
        group.bench_with_input(BenchmarkId::new("encode", len), &len, |b, &len| {
            b.iter(|| black_box(encode_length(len)))
        });

        let encoded = encode_length(len);
        group.bench_with_input(BenchmarkId::new("decode", len), &encoded, |b, data| {
            b.iter(|| black_box(decode_length(data, 0).unwrap()))
        });
    }

    group.finish();
}

fn sample_values() -> Vec<(&'static str, Value)> {
    vec![
        ("integer", Value::integer(-123_456)),
        ("big_integer", Value::integer(i128::MAX)),
        ("octet_string", Value::from("Linux router 5.15.0-91-generic x86_64")),
        ("counter32", Value::Counter32(3_000_000_000)),
        ("counter64", Value::Counter64(u64::MAX / 3)),
        ("timeticks", Value::TimeTicks(123_456_789)),
        ("ip_address", Value::IpAddress([192, 168, 1, 1])),
        ("oid", Value::ObjectIdentifier(Oid::from_slice(&[1, 3, 6, 1, 4, 1, 8072, 3, 2, 10]))),
    ]
}

fn bench_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("value");

    for (name, value) in sample_values() {
        group.bench_with_input(BenchmarkId::new("encode", name), &value, |b, value| {
            b.iter(|| black_box(value.to_bytes()))
        });

        let encoded = value.to_bytes();
        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, data| {
            b.iter(|| black_box(Value::decode(&mut Decoder::new(data.clone())).unwrap()))
        });
    }

    group.finish();
}

fn interface_row(count: u32) -> Vec<VarBind> {
    (1..=count)
        .map(|i| {
            VarBind::new(
                Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 10, i]),
                Value::Counter32(i * 1_000_003),
            )
        })
        .collect()
}

fn bench_varbind_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("varbind_list");

    for count in [1u32, 10, 50] {
        let varbinds = interface_row(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("encode", count), &varbinds, |b, vbs| {
            b.iter(|| {
                let mut buf = EncodeBuf::new();
                encode_varbind_list(&mut buf, vbs);
                black_box(buf.finish())
            })
        });

        let mut buf = EncodeBuf::new();
        encode_varbind_list(&mut buf, &varbinds);
        let encoded = buf.finish();
        group.bench_with_input(BenchmarkId::new("decode", count), &encoded, |b, data| {
            b.iter(|| black_box(decode_varbind_list(&mut Decoder::new(data.clone())).unwrap()))
        });
    }

    group.finish();
}

fn bench_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("message");

    let response = Message::v1("public", Pdu::new(PduType::Response, 42, interface_row(10)));
    let encoded: Bytes = response.encode();
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    group.bench_function("encode_response", |b| b.iter(|| black_box(response.encode())));
    group.bench_function("decode_response", |b| {
        b.iter(|| black_box(Message::decode(encoded.clone()).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_oid,
    bench_length,
    bench_value,
    bench_varbind_list,
    bench_message
);
criterion_main!(benches);
