//! BER decoding.
//!
//! Zero-copy decoding using `Bytes` to avoid allocations.

use std::net::SocketAddr;

use super::length::decode_length;
use super::{Tlv, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use bytes::Bytes;

/// Maximum nesting of constructed values.
///
/// A well-formed SNMP message nests five levels deep before any
/// application value (message, PDU, binding list, binding, value).
/// Decoding recurses once per level, so the bound keeps a hostile datagram
/// of nested SEQUENCE headers from exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 64;

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
    /// Absolute offset of `data[0]` within the original datagram.
    base: usize,
    /// Number of enclosing constructed values.
    depth: usize,
    target: Option<SocketAddr>,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
            depth: 0,
            target: None,
        }
    }

    /// Create a decoder from bytes with a source address for log context.
    pub fn with_target(data: Bytes, target: SocketAddr) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
            depth: 0,
            target: Some(target),
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    pub(crate) fn set_base_offset(&mut self, base: usize) {
        self.base = base;
    }

    /// Absolute offset of the next byte, for error reporting.
    pub fn offset(&self) -> usize {
        self.base + self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn fail(&self, kind: DecodeErrorKind) -> Box<Error> {
        match self.target {
            Some(source) => {
                tracing::debug!(target: "snmp_v1::ber", { snmp.offset = self.offset(), snmp.source = %source, kind = %kind }, "decode error")
            }
            None => tracing::debug!(target: "snmp_v1::ber", { snmp.offset = self.offset(), kind = %kind }, "decode error"),
        }
        Error::decode(self.offset(), kind)
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let Some(&byte) = self.data.get(self.offset) else {
            return Err(self.fail(DecodeErrorKind::TruncatedData));
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// Read a length field.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset.min(self.data.len())..], self.offset())?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        // saturating_add keeps a huge declared length from wrapping past the check
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(self.fail(DecodeErrorKind::TruncatedData));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read one complete TLV.
    pub fn read_tlv(&mut self) -> Result<Tlv> {
        let start = self.offset;
        let tag = self.read_tag()?;
        let length = self.read_length()?;
        let value = self.read_bytes(length)?;
        Ok(Tlv {
            tag,
            length,
            value,
            total_len: self.offset - start,
        })
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let tag = self.read_tag()?;
        if tag != expected {
            self.offset -= 1;
            return Err(self.fail(DecodeErrorKind::UnexpectedTag {
                expected,
                actual: tag,
            }));
        }
        self.read_length()
    }

    /// Read a BER INTEGER that must fit in an `i32`.
    ///
    /// Used for header fields (version, request ID) that are read before
    /// full decoding, e.g. to route a datagram.
    pub fn read_integer(&mut self) -> Result<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        if len == 0 {
            return Err(self.fail(DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 4 {
            return Err(self.fail(DecodeErrorKind::IntegerOverflow { length: len }));
        }
        let bytes = self.read_bytes(len)?;

        // Sign extend
        let mut value: i32 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for &byte in bytes.iter() {
            value = (value << 8) | (byte as i32);
        }
        Ok(value)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Create a sub-decoder for the next `len` bytes.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let base = self.offset();
        let depth = self.child_depth(base)?;
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
            base,
            depth,
            target: self.target,
        })
    }

    /// Decoder over the content of `tlv`, which this decoder read at the
    /// absolute offset `start`.
    pub(crate) fn content_of(&self, tlv: &Tlv, start: usize) -> Result<Decoder> {
        Ok(Decoder {
            data: tlv.value.clone(),
            offset: 0,
            base: start + (tlv.total_len - tlv.length),
            depth: self.child_depth(start)?,
            target: self.target,
        })
    }

    /// Decoder over the content of a standalone TLV.
    pub(crate) fn for_content(tlv: &Tlv) -> Decoder {
        Decoder {
            data: tlv.value.clone(),
            offset: 0,
            base: tlv.total_len - tlv.length,
            depth: 1,
            target: None,
        }
    }

    fn child_depth(&self, at: usize) -> Result<usize> {
        let depth = self.depth + 1;
        if depth > MAX_NESTING_DEPTH {
            let kind = DecodeErrorKind::NestingTooDeep { max: MAX_NESTING_DEPTH };
            tracing::debug!(target: "snmp_v1::ber", { snmp.offset = at, kind = %kind }, "decode error");
            return Err(Error::decode(at, kind));
        }
        Ok(depth)
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(&self) -> Result<()> {
        if !self.is_empty() {
            return Err(self.fail(DecodeErrorKind::TrailingData {
                remaining: self.remaining(),
            }));
        }
        Ok(())
    }

    /// Build an error at the current position.
    pub(crate) fn error(&self, kind: DecodeErrorKind) -> Box<Error> {
        self.fail(kind)
    }

    /// Get remaining data as a slice.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.data[self.offset.min(self.data.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_integer() {
        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0x00]);
        assert_eq!(dec.read_integer().unwrap(), 0);

        let mut dec = Decoder::from_slice(&[0x02, 0x02, 0x00, 0x80]);
        assert_eq!(dec.read_integer().unwrap(), 128);

        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0xFF]);
        assert_eq!(dec.read_integer().unwrap(), -1);

        let mut dec = Decoder::from_slice(&[0x02, 0x01, 0x80]);
        assert_eq!(dec.read_integer().unwrap(), -128);
    }

    #[test]
    fn test_header_integer_rejects_oversize() {
        let mut dec = Decoder::from_slice(&[0x02, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05]);
        let err = dec.read_integer().unwrap_err();
        assert!(matches!(
            *err,
            Error::Decode {
                kind: DecodeErrorKind::IntegerOverflow { length: 5 },
                ..
            }
        ));
    }

    #[test]
    fn test_read_tlv_reports_total_length() {
        let mut dec = Decoder::from_slice(&[0x04, 0x03, b'a', b'b', b'c', 0x05, 0x00]);
        let tlv = dec.read_tlv().unwrap();
        assert_eq!(tlv.tag, 0x04);
        assert_eq!(tlv.length, 3);
        assert_eq!(tlv.total_len, 5);
        assert_eq!(dec.offset(), 5);

        let null = dec.read_tlv().unwrap();
        assert_eq!(null.total_len, 2);
        assert!(dec.is_empty());
    }

    #[test]
    fn test_unknown_tag_is_not_an_error() {
        let mut dec = Decoder::from_slice(&[0x9F, 0x01, 0xAA]);
        let tlv = dec.read_tlv().unwrap();
        assert_eq!(tlv.tag, 0x9F);
    }

    #[test]
    fn test_truncated_value_fails() {
        let mut dec = Decoder::from_slice(&[0x04, 0x05, b'h', b'i']);
        let err = dec.read_tlv().unwrap_err();
        assert!(matches!(
            *err,
            Error::Decode {
                kind: DecodeErrorKind::TruncatedData,
                ..
            }
        ));
    }

    #[test]
    fn test_sub_decoder_offsets_are_absolute() {
        // SEQUENCE { NULL, <truncated> }
        let mut dec = Decoder::from_slice(&[0x30, 0x03, 0x05, 0x00, 0x04]);
        let mut seq = dec.read_sequence().unwrap();
        seq.read_tlv().unwrap();
        let err = seq.read_tlv().unwrap_err();
        match *err {
            Error::Decode { offset, .. } => assert_eq!(offset, 5),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_decode_sequence() {
        let mut dec = Decoder::from_slice(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
        let mut seq = dec.read_sequence().unwrap();
        assert_eq!(seq.read_integer().unwrap(), 1);
        assert_eq!(seq.read_integer().unwrap(), 2);
        seq.finish().unwrap();
    }

    #[test]
    fn test_read_bytes_rejects_oversized_length() {
        let mut dec = Decoder::from_slice(&[0x01, 0x02, 0x03]);
        assert!(dec.read_bytes(100).is_err());
        assert!(dec.read_bytes(usize::MAX).is_err());
    }
}
