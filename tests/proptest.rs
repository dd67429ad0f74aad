//! Property-based tests for the BER codec.
//!
//! Every value the crate can build must survive encode then decode
//! unchanged, lengths must use the minimal form, and OIDs must keep their
//! arcs.

use bytes::Bytes;
use num_bigint::BigInt;
use proptest::prelude::*;
use snmp_v1::ber::{Decoder, decode_length, encode_length};
use snmp_v1::oid::Oid;
use snmp_v1::value::Value;
use snmp_v1::varbind::VarBind;
use snmp_v1::{Message, Pdu, PduType};

// =============================================================================
// Strategies
// =============================================================================

/// OIDs that round-trip through BER.
///
/// BER packs the first two arcs into one subidentifier, so arc2 is bounded
/// by 39 under arcs 0 and 1.
fn arb_oid() -> impl Strategy<Value = Oid> {
    prop_oneof![
        Just(Oid::empty()),
        (0u32..=1, 0u32..40, prop::collection::vec(any::<u32>(), 0..=20)).prop_map(
            |(arc1, arc2, rest)| {
                let mut arcs = vec![arc1, arc2];
                arcs.extend(rest);
                Oid::from_slice(&arcs)
            }
        ),
        (0u32..=(u32::MAX - 80), prop::collection::vec(any::<u32>(), 0..=20)).prop_map(
            |(arc2, rest)| {
                let mut arcs = vec![2, arc2];
                arcs.extend(rest);
                Oid::from_slice(&arcs)
            }
        ),
    ]
}

fn arb_bytes() -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..=256).prop_map(Bytes::from)
}

/// Integers well beyond 64 bits, in both signs.
fn arb_big_integer() -> impl Strategy<Value = BigInt> {
    prop::collection::vec(any::<u8>(), 1..=24).prop_map(|bytes| BigInt::from_signed_bytes_be(&bytes))
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::integer),
        arb_big_integer().prop_map(Value::Integer),
        arb_bytes().prop_map(Value::OctetString),
        arb_bytes().prop_map(Value::BitString),
        Just(Value::Null),
        arb_oid().prop_map(Value::ObjectIdentifier),
        any::<[u8; 4]>().prop_map(Value::IpAddress),
        any::<[u8; 6]>().prop_map(Value::NsapAddress),
        any::<u32>().prop_map(Value::Counter32),
        any::<u32>().prop_map(Value::Gauge32),
        any::<u32>().prop_map(Value::TimeTicks),
        any::<u32>().prop_map(Value::UInteger32),
        any::<u64>().prop_map(Value::Counter64),
    ]
}

fn arb_varbinds() -> impl Strategy<Value = Vec<VarBind>> {
    prop::collection::vec(
        (arb_oid(), arb_value()).prop_map(|(oid, value)| VarBind::new(oid, value)),
        0..=8,
    )
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn value_round_trips(value in arb_value()) {
        let encoded = value.to_bytes();
        let mut decoder = Decoder::new(encoded);
        let decoded = Value::decode(&mut decoder).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert!(decoder.is_empty());
    }

    #[test]
    fn nested_sequences_round_trip(items in prop::collection::vec(arb_value(), 0..=6)) {
        let value = Value::Sequence(vec![Value::Sequence(items.clone()), Value::Sequence(items)]);
        let decoded = Value::decode(&mut Decoder::new(value.to_bytes())).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn length_round_trips_in_minimal_form(len in 0usize..=0x00FF_FFFF) {
        let encoded = encode_length(len);
        let (decoded, consumed) = decode_length(&encoded, 0).unwrap();
        prop_assert_eq!(decoded, len);
        prop_assert_eq!(consumed, encoded.len());

        if len < 0x80 {
            prop_assert_eq!(encoded.len(), 1);
        } else {
            let significant = (usize::BITS - len.leading_zeros()).div_ceil(8) as usize;
            prop_assert_eq!(encoded[0], 0x80 | significant as u8);
            prop_assert_eq!(encoded.len(), 1 + significant);
            prop_assert_ne!(encoded[1], 0);
        }
    }

    #[test]
    fn oid_arcs_round_trip(oid in arb_oid()) {
        prop_assert_eq!(Oid::from_ber(&oid.to_ber()).unwrap(), oid.clone());
        prop_assert_eq!(Oid::parse(&oid.to_string()).unwrap(), oid);
    }

    #[test]
    fn counter32_wraps_modulo_2_32(n in any::<u64>()) {
        prop_assert_eq!(Value::counter32(n), Value::Counter32(n as u32));
    }

    #[test]
    fn gauge32_pegs_at_ceiling(n in any::<u64>()) {
        let expected = u32::try_from(n).unwrap_or(u32::MAX);
        prop_assert_eq!(Value::gauge32(n).unwrap(), Value::Gauge32(expected));
    }

    #[test]
    fn message_round_trips(request_id in any::<i32>(), community in arb_bytes(), varbinds in arb_varbinds()) {
        let message = Message::v1(community, Pdu::new(PduType::Response, request_id, varbinds));
        prop_assert_eq!(Message::decode(message.encode()).unwrap(), message);
    }

    #[test]
    fn truncated_messages_never_panic(varbinds in arb_varbinds(), cut in any::<prop::sample::Index>()) {
        let encoded = Message::v1("public", Pdu::new(PduType::GetRequest, 1, varbinds)).encode();
        let cut = cut.index(encoded.len());
        prop_assert!(Message::decode(encoded.slice(..cut)).is_err());
    }
}
