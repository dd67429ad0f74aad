//! SNMP value types.
//!
//! [`Value`] is a closed sum type over every type that can appear on the
//! wire. Each variant knows its tag, how to encode itself and how to be
//! rebuilt from a TLV.

use std::fmt;
use std::net::Ipv4Addr;

use bytes::Bytes;
use num_bigint::{BigInt, Sign};

use crate::ber::{Decoder, EncodeBuf, Tlv, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::format::hex;
use crate::oid::Oid;
use crate::pdu::AnyPdu;

/// Hundredths of a second per day, hour, minute and second.
const TICKS_PER_DAY: u32 = 8_640_000;
const TICKS_PER_HOUR: u32 = 360_000;
const TICKS_PER_MINUTE: u32 = 6_000;
const TICKS_PER_SECOND: u32 = 100;

/// SNMP value.
///
/// Integer-derived application types are stored in their natural width
/// after the wrap or peg rule for the type has been applied, so a value
/// read back from the wire always compares equal to the one encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Value {
    /// INTEGER, arbitrary precision.
    Integer(BigInt),

    /// OCTET STRING (arbitrary bytes).
    OctetString(Bytes),

    /// BIT STRING, carried as raw content bytes.
    BitString(Bytes),

    /// NULL. Also the decoded form of Opaque.
    Null,

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, network order)
    IpAddress([u8; 4]),

    /// NsapAddress (6 bytes)
    NsapAddress([u8; 6]),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// Gauge32 (unsigned 32-bit, pegs at 2^32-1)
    Gauge32(u32),

    /// TimeTicks (hundredths of a second)
    TimeTicks(u32),

    /// UInteger32 (unsigned 32-bit, wrapping)
    UInteger32(u32),

    /// Counter64 (unsigned 64-bit, wrapping)
    Counter64(u64),

    /// Generic SEQUENCE of values.
    Sequence(Vec<Value>),

    /// A complete PDU, as found in the third slot of a message.
    Pdu(Box<AnyPdu>),

    /// Unrecognized tag, kept verbatim.
    Unknown { tag: u8, data: Bytes },
}

/// The variant of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    OctetString,
    BitString,
    Null,
    ObjectIdentifier,
    IpAddress,
    NsapAddress,
    Counter32,
    Gauge32,
    TimeTicks,
    UInteger32,
    Counter64,
    Sequence,
    Pdu,
    Unknown,
}

impl ValueKind {
    /// Map a net-snmp style type letter to a kind.
    ///
    /// `x` (hex string) maps to [`ValueKind::OctetString`]; callers decode
    /// the hex themselves.
    ///
    /// ```
    /// use snmp_v1::ValueKind;
    ///
    /// assert_eq!(ValueKind::from_type_letter('c'), Some(ValueKind::Counter32));
    /// assert_eq!(ValueKind::from_type_letter('?'), None);
    /// ```
    pub fn from_type_letter(letter: char) -> Option<Self> {
        Some(match letter {
            'i' => Self::Integer,
            'u' => Self::UInteger32,
            'c' => Self::Counter32,
            'C' => Self::Counter64,
            'g' => Self::Gauge32,
            't' => Self::TimeTicks,
            'a' => Self::IpAddress,
            's' | 'x' => Self::OctetString,
            'o' => Self::ObjectIdentifier,
            'n' => Self::Null,
            'b' => Self::BitString,
            'N' => Self::NsapAddress,
            _ => return None,
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "INTEGER",
            Self::OctetString => "STRING",
            Self::BitString => "BITS",
            Self::Null => "NULL",
            Self::ObjectIdentifier => "OID",
            Self::IpAddress => "IpAddress",
            Self::NsapAddress => "NsapAddress",
            Self::Counter32 => "Counter32",
            Self::Gauge32 => "Gauge32",
            Self::TimeTicks => "Timeticks",
            Self::UInteger32 => "UInteger32",
            Self::Counter64 => "Counter64",
            Self::Sequence => "SEQUENCE",
            Self::Pdu => "PDU",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Input accepted by [`Value::set`].
///
/// Integer-derived kinds take [`Input::Integer`] or its decimal text;
/// string kinds take bytes or text; OIDs take an [`Oid`] or dotted text;
/// addresses take text or raw octets of the right width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Integer(BigInt),
    Text(String),
    Bytes(Bytes),
    Oid(Oid),
}

macro_rules! impl_integer_input {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Input {
                fn from(v: $t) -> Self {
                    Input::Integer(BigInt::from(v))
                }
            }
        )*
    };
}

impl_integer_input!(i32, i64, u32, u64);

impl From<BigInt> for Input {
    fn from(v: BigInt) -> Self {
        Input::Integer(v)
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Text(s.to_owned())
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Text(s)
    }
}

impl From<&[u8]> for Input {
    fn from(data: &[u8]) -> Self {
        Input::Bytes(Bytes::copy_from_slice(data))
    }
}

impl From<Vec<u8>> for Input {
    fn from(data: Vec<u8>) -> Self {
        Input::Bytes(Bytes::from(data))
    }
}

impl From<Bytes> for Input {
    fn from(data: Bytes) -> Self {
        Input::Bytes(data)
    }
}

impl From<Oid> for Input {
    fn from(oid: Oid) -> Self {
        Input::Oid(oid)
    }
}

impl From<Ipv4Addr> for Input {
    fn from(addr: Ipv4Addr) -> Self {
        Input::Bytes(Bytes::copy_from_slice(&addr.octets()))
    }
}

/// Low 32 bits of the magnitude, negated for negative inputs (x mod 2^32).
fn wrap32(n: &BigInt) -> u32 {
    let (sign, digits) = n.to_u32_digits();
    let low = digits.first().copied().unwrap_or(0);
    if sign == Sign::Minus {
        low.wrapping_neg()
    } else {
        low
    }
}

/// x mod 2^64.
fn wrap64(n: &BigInt) -> u64 {
    let (sign, digits) = n.to_u64_digits();
    let low = digits.first().copied().unwrap_or(0);
    if sign == Sign::Minus {
        low.wrapping_neg()
    } else {
        low
    }
}

fn reject_negative(n: &BigInt, kind: ValueKind) -> Result<()> {
    if n.sign() == Sign::Minus {
        return Err(Error::bad_value(format!("{} cannot be negative: {}", kind, n)));
    }
    Ok(())
}

impl Value {
    /// INTEGER from any integer type.
    pub fn integer(n: impl Into<BigInt>) -> Self {
        Value::Integer(n.into())
    }

    /// Counter32, reduced modulo 2^32.
    ///
    /// ```
    /// use snmp_v1::Value;
    ///
    /// assert_eq!(Value::counter32(4_294_967_296u64), Value::Counter32(0));
    /// assert_eq!(Value::counter32(-1), Value::Counter32(u32::MAX));
    /// ```
    pub fn counter32(n: impl Into<BigInt>) -> Self {
        Value::Counter32(wrap32(&n.into()))
    }

    /// UInteger32, reduced modulo 2^32.
    pub fn uinteger32(n: impl Into<BigInt>) -> Self {
        Value::UInteger32(wrap32(&n.into()))
    }

    /// Counter64, reduced modulo 2^64.
    pub fn counter64(n: impl Into<BigInt>) -> Self {
        Value::Counter64(wrap64(&n.into()))
    }

    /// Gauge32, pegged at 2^32-1. Negative input is rejected.
    ///
    /// ```
    /// use snmp_v1::Value;
    ///
    /// assert_eq!(Value::gauge32(5_000_000_000u64).unwrap(), Value::Gauge32(u32::MAX));
    /// assert!(Value::gauge32(-1).is_err());
    /// ```
    pub fn gauge32(n: impl Into<BigInt>) -> Result<Self> {
        let n = n.into();
        reject_negative(&n, ValueKind::Gauge32)?;
        Ok(Value::Gauge32(u32::try_from(&n).unwrap_or(u32::MAX)))
    }

    /// TimeTicks, keeping the low 32 bits of the input. Negative input is rejected.
    pub fn timeticks(n: impl Into<BigInt>) -> Result<Self> {
        let n = n.into();
        reject_negative(&n, ValueKind::TimeTicks)?;
        Ok(Value::TimeTicks(wrap32(&n)))
    }

    /// OCTET STRING from bytes or text.
    pub fn octet_string(data: impl Into<Bytes>) -> Self {
        Value::OctetString(data.into())
    }

    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::OctetString(_) => ValueKind::OctetString,
            Value::BitString(_) => ValueKind::BitString,
            Value::Null => ValueKind::Null,
            Value::ObjectIdentifier(_) => ValueKind::ObjectIdentifier,
            Value::IpAddress(_) => ValueKind::IpAddress,
            Value::NsapAddress(_) => ValueKind::NsapAddress,
            Value::Counter32(_) => ValueKind::Counter32,
            Value::Gauge32(_) => ValueKind::Gauge32,
            Value::TimeTicks(_) => ValueKind::TimeTicks,
            Value::UInteger32(_) => ValueKind::UInteger32,
            Value::Counter64(_) => ValueKind::Counter64,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Pdu(_) => ValueKind::Pdu,
            Value::Unknown { .. } => ValueKind::Unknown,
        }
    }

    /// The wire tag of this value.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Integer(_) => tag::universal::INTEGER,
            Value::OctetString(_) => tag::universal::OCTET_STRING,
            Value::BitString(_) => tag::universal::BIT_STRING,
            Value::Null => tag::universal::NULL,
            Value::ObjectIdentifier(_) => tag::universal::OBJECT_IDENTIFIER,
            Value::IpAddress(_) => tag::application::IP_ADDRESS,
            Value::NsapAddress(_) => tag::application::NSAP_ADDRESS,
            Value::Counter32(_) => tag::application::COUNTER32,
            Value::Gauge32(_) => tag::application::GAUGE32,
            Value::TimeTicks(_) => tag::application::TIMETICKS,
            Value::UInteger32(_) => tag::application::UINTEGER32,
            Value::Counter64(_) => tag::application::COUNTER64,
            Value::Sequence(_) => tag::universal::SEQUENCE,
            Value::Pdu(pdu) => pdu.pdu_type().tag(),
            Value::Unknown { tag, .. } => *tag,
        }
    }

    /// Replace the payload, keeping the kind.
    ///
    /// The wrap or peg rule of the kind applies to integer input. Input of
    /// the wrong shape fails with [`Error::BadValue`] and leaves the value
    /// untouched.
    ///
    /// ```
    /// use snmp_v1::Value;
    ///
    /// let mut v = Value::Counter32(0);
    /// v.set(4_294_967_297u64).unwrap();
    /// assert_eq!(v, Value::Counter32(1));
    ///
    /// let mut ip = Value::IpAddress([0; 4]);
    /// ip.set("10.0.0.1").unwrap();
    /// assert!(ip.set("10.0.0.256").is_err());
    /// assert_eq!(ip, Value::IpAddress([10, 0, 0, 1]));
    /// ```
    pub fn set(&mut self, input: impl Into<Input>) -> Result<()> {
        *self = Self::build(self.kind(), input.into())?;
        Ok(())
    }

    /// Build a value of `kind` from its text form.
    ///
    /// ```
    /// use snmp_v1::{Value, ValueKind};
    ///
    /// assert_eq!(Value::parse(ValueKind::Gauge32, "42").unwrap(), Value::Gauge32(42));
    /// assert!(Value::parse(ValueKind::Integer, "forty-two").is_err());
    /// ```
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self> {
        Self::build(kind, Input::Text(text.to_owned()))
    }

    fn build(kind: ValueKind, input: Input) -> Result<Self> {
        match kind {
            ValueKind::Integer => Ok(Value::Integer(integer_input(kind, input)?)),
            ValueKind::Counter32 => Ok(Value::counter32(integer_input(kind, input)?)),
            ValueKind::UInteger32 => Ok(Value::uinteger32(integer_input(kind, input)?)),
            ValueKind::Counter64 => Ok(Value::counter64(integer_input(kind, input)?)),
            ValueKind::Gauge32 => Value::gauge32(integer_input(kind, input)?),
            ValueKind::TimeTicks => Value::timeticks(integer_input(kind, input)?),
            ValueKind::OctetString => Ok(Value::OctetString(bytes_input(kind, input)?)),
            ValueKind::BitString => Ok(Value::BitString(bytes_input(kind, input)?)),
            ValueKind::ObjectIdentifier => match input {
                Input::Oid(oid) => Ok(Value::ObjectIdentifier(oid)),
                Input::Text(text) => Oid::parse(&text)
                    .map(Value::ObjectIdentifier)
                    .map_err(|e| Error::bad_value(e.to_string())),
                other => Err(wrong_input(kind, &other)),
            },
            ValueKind::IpAddress => match input {
                Input::Text(text) => parse_ip_address(&text).map(Value::IpAddress),
                Input::Bytes(data) => fixed_octets(&data).map(Value::IpAddress),
                other => Err(wrong_input(kind, &other)),
            },
            ValueKind::NsapAddress => match input {
                Input::Text(text) => parse_nsap_address(&text).map(Value::NsapAddress),
                Input::Bytes(data) => fixed_octets(&data).map(Value::NsapAddress),
                other => Err(wrong_input(kind, &other)),
            },
            ValueKind::Null | ValueKind::Sequence | ValueKind::Pdu | ValueKind::Unknown => {
                Err(Error::bad_value(format!("{} has no settable payload", kind)))
            }
        }
    }

    /// Try to get as a big integer (INTEGER only).
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as i64.
    ///
    /// Returns `Some` for INTEGER values that fit and for every unsigned
    /// 32-bit kind.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => i64::try_from(v).ok(),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) | Value::UInteger32(v) => {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    /// Try to get as u32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) | Value::UInteger32(v) => {
                Some(*v)
            }
            Value::Integer(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }

    /// Try to get as u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Counter64(v) => Some(*v),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) | Value::UInteger32(v) => {
                Some(*v as u64)
            }
            Value::Integer(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Try to get as bytes (OCTET STRING or BIT STRING).
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) | Value::BitString(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as UTF-8 text.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Try to get as OID.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// Try to get as IP address.
    pub fn as_ip(&self) -> Option<Ipv4Addr> {
        match self {
            Value::IpAddress(bytes) => Some(Ipv4Addr::from(*bytes)),
            _ => None,
        }
    }

    /// Try to get the elements of a SEQUENCE.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Integer(v) => buf.push_integer(v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::BitString(data) => buf.push_primitive(tag::universal::BIT_STRING, data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_primitive(tag::application::IP_ADDRESS, addr),
            Value::NsapAddress(addr) => buf.push_primitive(tag::application::NSAP_ADDRESS, addr),
            Value::Counter32(v) => buf.push_unsigned(tag::application::COUNTER32, *v as u64),
            Value::Gauge32(v) => buf.push_unsigned(tag::application::GAUGE32, *v as u64),
            Value::TimeTicks(v) => buf.push_unsigned(tag::application::TIMETICKS, *v as u64),
            Value::UInteger32(v) => buf.push_unsigned(tag::application::UINTEGER32, *v as u64),
            Value::Counter64(v) => buf.push_unsigned(tag::application::COUNTER64, *v),
            Value::Sequence(items) => buf.push_sequence(|buf| {
                for item in items.iter().rev() {
                    item.encode(buf);
                }
            }),
            Value::Pdu(pdu) => pdu.encode(buf),
            Value::Unknown { tag: t, data } => buf.push_primitive(*t, data),
        }
    }

    /// Encode to a standalone byte buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.finish()
    }

    /// Decode the next TLV from `decoder`.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let start = decoder.offset();
        let tlv = decoder.read_tlv()?;
        let mut content = decoder.content_of(&tlv, start)?;
        Self::from_content(tlv.tag, &mut content)
    }

    /// Build a value from a TLV that has already been extracted.
    ///
    /// ```
    /// use bytes::Bytes;
    /// use snmp_v1::{Value, ber::extract_tlv};
    ///
    /// let data = Bytes::from_static(&[0x41, 0x01, 0x07]);
    /// let tlv = extract_tlv(&data, 0).unwrap();
    /// assert_eq!(Value::from_tlv(&tlv).unwrap(), Value::Counter32(7));
    /// ```
    pub fn from_tlv(tlv: &Tlv) -> Result<Self> {
        let mut content = Decoder::for_content(tlv);
        Self::from_content(tlv.tag, &mut content)
    }

    fn from_content(t: u8, content: &mut Decoder) -> Result<Self> {
        match t {
            tag::universal::INTEGER => {
                let data = content.read_bytes(content.remaining())?;
                if data.is_empty() {
                    return Err(content.error(DecodeErrorKind::ZeroLengthInteger));
                }
                Ok(Value::Integer(BigInt::from_signed_bytes_be(&data)))
            }
            tag::universal::OCTET_STRING => Ok(Value::OctetString(content.read_bytes(content.remaining())?)),
            tag::universal::BIT_STRING => Ok(Value::BitString(content.read_bytes(content.remaining())?)),
            tag::universal::NULL => {
                if !content.is_empty() {
                    return Err(content.error(DecodeErrorKind::InvalidNull));
                }
                Ok(Value::Null)
            }
            // Opaque payloads are not interpreted
            tag::application::OPAQUE => {
                content.read_bytes(content.remaining())?;
                Ok(Value::Null)
            }
            tag::universal::OBJECT_IDENTIFIER => {
                let base = content.offset();
                let data = content.read_bytes(content.remaining())?;
                Oid::from_ber(&data)
                    .map(Value::ObjectIdentifier)
                    .map_err(|err| rebase(err, base))
            }
            tag::application::IP_ADDRESS => Ok(Value::IpAddress(read_address(content)?)),
            tag::application::NSAP_ADDRESS => Ok(Value::NsapAddress(read_address(content)?)),
            tag::application::COUNTER32 => Ok(Value::Counter32(read_unsigned32(content)?)),
            tag::application::GAUGE32 => Ok(Value::Gauge32(read_unsigned32(content)?)),
            tag::application::TIMETICKS => Ok(Value::TimeTicks(read_unsigned32(content)?)),
            tag::application::UINTEGER32 => Ok(Value::UInteger32(read_unsigned32(content)?)),
            tag::application::COUNTER64 => Ok(Value::Counter64(read_unsigned(content, 9, u64::MAX)?)),
            tag::universal::SEQUENCE => Ok(Value::Sequence(crate::sequence::decode_elements(content)?)),
            t if tag::is_pdu(t) => Ok(Value::Pdu(Box::new(AnyPdu::decode_content(t, content)?))),
            _ => Ok(Value::Unknown {
                tag: t,
                data: content.read_bytes(content.remaining())?,
            }),
        }
    }
}

fn rebase(err: Box<Error>, base: usize) -> Box<Error> {
    match *err {
        Error::Decode { offset, kind } => Error::decode(base + offset, kind),
        other => Box::new(other),
    }
}

fn read_address<const N: usize>(content: &mut Decoder) -> Result<[u8; N]> {
    let actual = content.remaining();
    if actual != N {
        return Err(content.error(DecodeErrorKind::InvalidAddressLength { expected: N, actual }));
    }
    let data = content.read_bytes(N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&data);
    Ok(out)
}

fn read_unsigned32(content: &mut Decoder) -> Result<u32> {
    read_unsigned(content, 5, u32::MAX as u64).map(|v| v as u32)
}

/// Read the whole content as an unsigned magnitude.
///
/// The leading zero octet that keeps the top bit clear is optional.
fn read_unsigned(content: &mut Decoder, max_octets: usize, max: u64) -> Result<u64> {
    let length = content.remaining();
    if length == 0 {
        return Err(content.error(DecodeErrorKind::ZeroLengthInteger));
    }
    if length > max_octets {
        return Err(content.error(DecodeErrorKind::IntegerOverflow { length }));
    }
    let data = content.read_bytes(length)?;
    let value = data.iter().fold(0u128, |acc, &b| (acc << 8) | b as u128);
    if value > max as u128 {
        return Err(Error::decode(
            content.offset() - length,
            DecodeErrorKind::IntegerOverflow { length },
        ));
    }
    Ok(value as u64)
}

fn wrong_input(kind: ValueKind, input: &Input) -> Box<Error> {
    let given = match input {
        Input::Integer(_) => "an integer",
        Input::Text(_) => "text",
        Input::Bytes(_) => "bytes",
        Input::Oid(_) => "an OID",
    };
    Error::bad_value(format!("{} cannot be set from {}", kind, given))
}

fn integer_input(kind: ValueKind, input: Input) -> Result<BigInt> {
    match input {
        Input::Integer(n) => Ok(n),
        Input::Text(text) => text
            .trim()
            .parse::<BigInt>()
            .map_err(|_| Error::bad_value(format!("{:?} is not a valid {}", text, kind))),
        other => Err(wrong_input(kind, &other)),
    }
}

fn bytes_input(kind: ValueKind, input: Input) -> Result<Bytes> {
    match input {
        Input::Bytes(data) => Ok(data),
        Input::Text(text) => Ok(Bytes::from(text)),
        other => Err(wrong_input(kind, &other)),
    }
}

fn fixed_octets<const N: usize>(data: &[u8]) -> Result<[u8; N]> {
    <[u8; N]>::try_from(data)
        .map_err(|_| Error::bad_value(format!("address must be {} octets, got {}", N, data.len())))
}

/// Parse dotted-decimal `a.b.c.d`, each component 0-255.
fn parse_ip_address(text: &str) -> Result<[u8; 4]> {
    let parts: Vec<&str> = text.trim().split('.').collect();
    if parts.len() != 4 {
        return Err(Error::bad_value(format!("{:?} is not a dotted-quad IP address", text)));
    }
    let mut out = [0u8; 4];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u8>()
            .map_err(|_| Error::bad_value(format!("IP address component {:?} out of range", part)))?;
    }
    Ok(out)
}

/// Parse six hex components separated by `.`, `:` or `-`, each 00-FF.
fn parse_nsap_address(text: &str) -> Result<[u8; 6]> {
    let parts: Vec<&str> = text.trim().split(['.', ':', '-']).collect();
    if parts.len() != 6 {
        return Err(Error::bad_value(format!("{:?} is not a six-component NSAP address", text)));
    }
    let mut out = [0u8; 6];
    for (slot, part) in out.iter_mut().zip(&parts) {
        if part.is_empty() || part.len() > 2 {
            return Err(Error::bad_value(format!("NSAP component {:?} out of range", part)));
        }
        *slot = u8::from_str_radix(part, 16)
            .map_err(|_| Error::bad_value(format!("NSAP component {:?} out of range", part)))?;
    }
    Ok(out)
}

/// Render hundredths of a second as `days:hours:minutes:seconds.hundredths`.
///
/// ```
/// use snmp_v1::value::format_timeticks;
///
/// assert_eq!(format_timeticks(123_456_789), "14:6:56:7.89");
/// assert_eq!(format_timeticks(0), "0:0:0:0.00");
/// ```
pub fn format_timeticks(ticks: u32) -> String {
    let days = ticks / TICKS_PER_DAY;
    let rest = ticks % TICKS_PER_DAY;
    let hours = rest / TICKS_PER_HOUR;
    let rest = rest % TICKS_PER_HOUR;
    let minutes = rest / TICKS_PER_MINUTE;
    let rest = rest % TICKS_PER_MINUTE;
    let seconds = rest / TICKS_PER_SECOND;
    let hundredths = rest % TICKS_PER_SECOND;
    format!("{}:{}:{}:{}.{:02}", days, hours, minutes, seconds, hundredths)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "0x{}", hex::Bytes(data)),
            },
            Value::BitString(data) => write!(f, "0x{}", hex::Bytes(data)),
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => write!(f, "{}", Ipv4Addr::from(*addr)),
            Value::NsapAddress(addr) => {
                let parts: Vec<String> = addr.iter().map(|b| format!("{:02X}", b)).collect();
                write!(f, "{}", parts.join(":"))
            }
            Value::Counter32(v) | Value::Gauge32(v) | Value::UInteger32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => write!(f, "{}", format_timeticks(*v)),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::Sequence(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Value::Pdu(pdu) => write!(f, "{}", pdu.pdu_type()),
            Value::Unknown { tag, data } => {
                write!(f, "Unknown(tag=0x{:02X}, data=0x{})", tag, hex::Bytes(data))
            }
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(BigInt::from(v))
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Value::OctetString(Bytes::copy_from_slice(data))
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::OctetString(data)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<Ipv4Addr> for Value {
    fn from(addr: Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}
