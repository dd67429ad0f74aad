//! BER (Basic Encoding Rules) codec for the SNMP subset of ASN.1.
//!
//! Decoding is zero-copy over [`Bytes`]; encoding builds the message
//! back to front so that every length is known when its header is written.

mod decode;
mod encode;
mod length;

pub use decode::{Decoder, MAX_NESTING_DEPTH};
pub use encode::EncodeBuf;
pub use length::{MAX_LENGTH_OCTETS, decode_length, encode_length};

use bytes::Bytes;

use crate::error::Result;

/// Tag octets used by SNMPv1 (RFC 1155/1157) and the v2 PDU extensions.
pub mod tag {
    /// ASN.1 universal class.
    pub mod universal {
        pub const INTEGER: u8 = 0x02;
        pub const BIT_STRING: u8 = 0x03;
        pub const OCTET_STRING: u8 = 0x04;
        pub const NULL: u8 = 0x05;
        pub const OBJECT_IDENTIFIER: u8 = 0x06;
        pub const SEQUENCE: u8 = 0x30;
    }

    /// SNMP application types.
    pub mod application {
        pub const IP_ADDRESS: u8 = 0x40;
        pub const COUNTER32: u8 = 0x41;
        pub const GAUGE32: u8 = 0x42;
        pub const TIMETICKS: u8 = 0x43;
        pub const OPAQUE: u8 = 0x44;
        pub const NSAP_ADDRESS: u8 = 0x45;
        pub const COUNTER64: u8 = 0x46;
        pub const UINTEGER32: u8 = 0x47;
    }

    /// Context-specific constructed PDU tags.
    pub mod pdu {
        pub const GET_REQUEST: u8 = 0xA0;
        pub const GET_NEXT_REQUEST: u8 = 0xA1;
        pub const RESPONSE: u8 = 0xA2;
        pub const SET_REQUEST: u8 = 0xA3;
        pub const TRAP_V1: u8 = 0xA4;
        pub const GET_BULK_REQUEST: u8 = 0xA5;
        pub const INFORM_REQUEST: u8 = 0xA6;
        pub const TRAP_V2: u8 = 0xA7;
    }

    /// Whether `tag` is one of the PDU tags.
    pub fn is_pdu(tag: u8) -> bool {
        (pdu::GET_REQUEST..=pdu::TRAP_V2).contains(&tag)
    }
}

/// One raw Type-Length-Value triple.
///
/// `total_len` counts the header as well as the content, so
/// `position + total_len` is where the next TLV starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    /// Tag octet. Unmapped tags are carried as-is.
    pub tag: u8,
    /// Declared content length.
    pub length: usize,
    /// Exactly `length` content bytes.
    pub value: Bytes,
    /// Header bytes plus `length`.
    pub total_len: usize,
}

/// Read the TLV starting at `position` in `buffer`.
///
/// Fails with a decode error if the buffer ends before the declared
/// length; never reads past `position + total_len`.
///
/// ```
/// use bytes::Bytes;
/// use snmp_v1::ber::extract_tlv;
///
/// let data = Bytes::from_static(&[0x04, 0x02, b'h', b'i', 0x05, 0x00]);
/// let first = extract_tlv(&data, 0).unwrap();
/// assert_eq!(first.tag, 0x04);
/// assert_eq!(&first.value[..], b"hi");
/// assert_eq!(first.total_len, 4);
///
/// let second = extract_tlv(&data, first.total_len).unwrap();
/// assert_eq!(second.tag, 0x05);
/// ```
pub fn extract_tlv(buffer: &Bytes, position: usize) -> Result<Tlv> {
    let mut decoder = Decoder::new(buffer.slice(position.min(buffer.len())..));
    decoder.set_base_offset(position);
    decoder.read_tlv()
}
