//! BER length encoding and decoding.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: Single byte, bit 8=0, value 0-127
//! - Long form: Initial byte (bit 8=1, bits 7-1=count), followed by length bytes
//! - Indefinite form (0x80): Rejected, SNMP never uses it

use smallvec::SmallVec;

use crate::error::{DecodeErrorKind, Error, Result};

/// Most octets a long-form length may use.
pub const MAX_LENGTH_OCTETS: usize = 4;

/// Encode a length in wire order.
///
/// Short form for lengths below 128, otherwise a length-of-length octet
/// followed by the minimal big-endian representation.
///
/// ```
/// use snmp_v1::ber::encode_length;
///
/// assert_eq!(encode_length(5).as_slice(), &[0x05]);
/// assert_eq!(encode_length(200).as_slice(), &[0x81, 0xC8]);
/// assert_eq!(encode_length(256).as_slice(), &[0x82, 0x01, 0x00]);
/// ```
pub fn encode_length(len: usize) -> SmallVec<[u8; 9]> {
    let mut out = SmallVec::new();

    if len < 0x80 {
        out.push(len as u8);
        return out;
    }

    let be = len.to_be_bytes();
    let skip = be.iter().take_while(|&&b| b == 0).count();
    let significant = &be[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// Decode a length from bytes, returning (length, bytes_consumed).
///
/// The `base_offset` parameter is used to report error offsets correctly
/// when this is called from within a decoder. Non-minimal long forms are
/// accepted (X.690 Section 8.1.3.5 Note 2). Any length that fits in
/// [`MAX_LENGTH_OCTETS`] octets is returned; content shorter than the
/// declared length is caught when the content is read.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::IndefiniteLength,
        ));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;

    if num_octets > MAX_LENGTH_OCTETS {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }

    if data.len() < 1 + num_octets {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    }

    let len = data[1..=num_octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    Ok((len, 1 + num_octets))
}
