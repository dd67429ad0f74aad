//! SNMP message wrapper.
//!
//! `Message ::= SEQUENCE { version INTEGER, community OCTET STRING, data PDU }`
//! (RFC 1157 Section 4). The same layout carries v2c traffic with version 1.

use std::net::SocketAddr;

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::{AnyPdu, Pdu};
use crate::sequence::{Shape, Slot, is_integer, is_octet_string, is_pdu};
use crate::value::Value;

/// Layout of a community message.
pub const MESSAGE_SHAPE: Shape = Shape {
    what: "message",
    slots: &[
        Slot {
            name: "version",
            accepts: is_integer,
        },
        Slot {
            name: "community",
            accepts: is_octet_string,
        },
        Slot {
            name: "PDU",
            accepts: is_pdu,
        },
    ],
};

/// Protocol version carried in the first slot of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    /// SNMPv1 (wire value 0)
    #[default]
    V1,
    /// SNMPv2c (wire value 1), read so v2 traps and informs can be received
    V2c,
}

impl Version {
    /// Wire value.
    pub fn as_i32(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
        }
    }

    /// Create from wire value.
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            _ => None,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::V1 => write!(f, "v1"),
            Version::V2c => write!(f, "v2c"),
        }
    }
}

/// Community-based SNMP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// SNMP version
    pub version: Version,
    /// Community string
    pub community: Bytes,
    /// Protocol data unit
    pub pdu: AnyPdu,
}

impl Message {
    /// Create a new message.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: impl Into<AnyPdu>) -> Self {
        Self {
            version,
            community: community.into(),
            pdu: pdu.into(),
        }
    }

    /// Create a v1 message.
    pub fn v1(community: impl Into<Bytes>, pdu: impl Into<AnyPdu>) -> Self {
        Self::new(Version::V1, community, pdu)
    }

    /// The four-slot PDU, if this message carries one.
    pub fn standard_pdu(&self) -> Option<&Pdu> {
        match &self.pdu {
            AnyPdu::Standard(pdu) => Some(pdu),
            _ => None,
        }
    }

    /// Consume and return the four-slot PDU, if this message carries one.
    pub fn into_standard_pdu(self) -> Option<Pdu> {
        match self.pdu {
            AnyPdu::Standard(pdu) => Some(pdu),
            _ => None,
        }
    }

    /// Encode to BER.
    ///
    /// ```
    /// use snmp_v1::{Message, oid};
    /// use snmp_v1::pdu::Pdu;
    ///
    /// let msg = Message::v1("public", Pdu::get_request(1, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]));
    /// let bytes = msg.encode();
    /// assert_eq!(Message::decode(bytes).unwrap(), msg);
    /// ```
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_i32(self.version.as_i32());
        });
        buf.finish()
    }

    /// Decode a complete datagram.
    pub fn decode(data: Bytes) -> Result<Self> {
        Self::decode_with(Decoder::new(data))
    }

    /// Decode a datagram received from `source`, which is attached to decode logs.
    pub fn decode_from(data: Bytes, source: SocketAddr) -> Result<Self> {
        Self::decode_with(Decoder::with_target(data, source))
    }

    fn decode_with(mut decoder: Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let start = seq.offset();
        let elements = MESSAGE_SHAPE.decode(&mut seq)?;
        decoder.finish()?;

        let [version, community, pdu]: [Value; 3] = elements.try_into().map_err(|_| {
            Error::decode(start, DecodeErrorKind::BadSlot("version"))
        })?;

        let raw_version = version
            .as_integer()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| Error::decode(start, DecodeErrorKind::BadSlot("version")))?;
        let version = Version::from_i32(raw_version)
            .ok_or_else(|| seq.error(DecodeErrorKind::UnknownVersion(raw_version)))?;

        let (Value::OctetString(community), Value::Pdu(pdu)) = (community, pdu) else {
            return Err(Error::decode(start, DecodeErrorKind::BadSlot("community")));
        };

        Ok(Message {
            version,
            community,
            pdu: *pdu,
        })
    }
}
