//! Hexadecimal encoding and decoding.

use std::fmt;

use crate::error::{Error, Result};

/// Encode bytes as lowercase hex string.
///
/// ```
/// use snmp_v1::format::hex::encode;
///
/// assert_eq!(encode(&[0x00, 0xff]), "00ff");
/// ```
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decode a hex string to bytes.
///
/// Whitespace and `:` separators between octets are skipped, so both
/// `"deadbeef"` and `"de:ad:be:ef"` are accepted. An optional `0x`
/// prefix is allowed.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    let body = s.trim();
    let body = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
        .unwrap_or(body);
    let digits: Vec<u8> = body
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(Error::bad_value(format!("odd number of hex digits in {:?}", s)));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let hi = nibble(pair[0]);
            let lo = nibble(pair[1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
                _ => Err(Error::bad_value(format!("invalid hex digit in {:?}", s))),
            }
        })
        .collect()
}

fn nibble(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}

/// Lazy hex formatter, only formats when actually displayed.
///
/// Used in trace fields so disabled levels cost nothing.
pub struct Bytes<'a>(pub &'a [u8]);

impl fmt::Debug for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
