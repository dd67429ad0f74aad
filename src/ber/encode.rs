//! BER encoding.
//!
//! [`EncodeBuf`] writes back to front: content first, then its length, then
//! its tag. Constructed types therefore never need a second pass to patch
//! lengths, and arbitrarily deep nesting costs nothing extra.

use bytes::Bytes;
use num_bigint::BigInt;

use super::length::encode_length;
use super::tag;
use crate::oid::Oid;

/// Reverse-building BER encoder.
///
/// Fields of a constructed type must be pushed in reverse order.
///
/// ```
/// use snmp_v1::ber::EncodeBuf;
///
/// let mut buf = EncodeBuf::new();
/// buf.push_sequence(|buf| {
///     buf.push_null();
///     buf.push_i32(5);
/// });
/// assert_eq!(&buf.finish()[..], &[0x30, 0x05, 0x02, 0x01, 0x05, 0x05, 0x00]);
/// ```
#[derive(Debug, Default)]
pub struct EncodeBuf {
    /// Encoded bytes in reverse order.
    rev: Vec<u8>,
}

impl EncodeBuf {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            rev: Vec::with_capacity(128),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.rev.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.rev.is_empty()
    }

    /// Prepend raw bytes (given in wire order).
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.rev.extend(data.iter().rev());
    }

    /// Prepend a length field.
    pub fn push_length(&mut self, len: usize) {
        self.push_bytes(&encode_length(len));
    }

    /// Prepend a tag octet.
    pub fn push_tag(&mut self, tag: u8) {
        self.rev.push(tag);
    }

    /// Prepend a complete primitive TLV.
    pub fn push_primitive(&mut self, tag: u8, content: &[u8]) {
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Prepend a constructed TLV whose content is written by `f`.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let before = self.rev.len();
        f(self);
        let content_len = self.rev.len() - before;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Prepend a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f)
    }

    /// Prepend a signed INTEGER of arbitrary size (minimal two's complement).
    pub fn push_integer(&mut self, value: &BigInt) {
        self.push_primitive(tag::universal::INTEGER, &value.to_signed_bytes_be());
    }

    /// Prepend an `i32` INTEGER.
    pub fn push_i32(&mut self, value: i32) {
        self.push_integer(&BigInt::from(value));
    }

    /// Prepend an unsigned value under an application tag.
    ///
    /// A leading zero octet is added when the top bit is set so the value
    /// is not read back as negative.
    pub fn push_unsigned(&mut self, tag: u8, value: u64) {
        let be = value.to_be_bytes();
        let skip = be.iter().take_while(|&&b| b == 0).count().min(7);
        let significant = &be[skip..];
        self.push_bytes(significant);
        let mut len = significant.len();
        if significant[0] & 0x80 != 0 {
            self.rev.push(0);
            len += 1;
        }
        self.push_length(len);
        self.push_tag(tag);
    }

    /// Prepend an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_primitive(tag::universal::OCTET_STRING, data);
    }

    /// Prepend a NULL.
    pub fn push_null(&mut self) {
        self.push_length(0);
        self.push_tag(tag::universal::NULL);
    }

    /// Prepend an OBJECT IDENTIFIER.
    pub fn push_oid(&mut self, oid: &Oid) {
        self.push_primitive(tag::universal::OBJECT_IDENTIFIER, &oid.to_ber_smallvec());
    }

    /// Finish encoding, returning the bytes in wire order.
    pub fn finish(self) -> Bytes {
        let mut out = self.rev;
        out.reverse();
        Bytes::from(out)
    }
}
