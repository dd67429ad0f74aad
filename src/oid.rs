//! Object identifiers.
//!
//! Arcs live in a `SmallVec<[u32; 16]>`, so the MIB-II names a manager
//! deals with day to day never touch the heap.

use crate::error::{DecodeErrorKind, Error, Result};
use smallvec::SmallVec;
use std::fmt;

/// Most arcs an OID may carry (RFC 2578 Section 3.5).
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
///
/// A dotted path of non-negative integers. Ordering is lexicographic by
/// arc, which is the order GetNext walks follow.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// The OID with no arcs.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse dotted notation such as `1.3.6.1.2.1.1.1.0`.
    ///
    /// A leading dot is accepted, as printed by many MIB tools.
    ///
    /// ```
    /// use snmp_v1::oid::Oid;
    ///
    /// let oid = Oid::parse(".1.3.6.1.2.1.1.1.0").unwrap();
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
    /// assert!(Oid::parse("1.3.x").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if body.is_empty() {
            return Ok(Self::empty());
        }

        let arcs = body
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| Error::InvalidOid(format!("{:?}: bad arc {:?}", s, part).into()).boxed())
            })
            .collect::<Result<SmallVec<[u32; 16]>>>()?;

        if arcs.len() > MAX_OID_LEN {
            return Err(Error::InvalidOid(
                format!("{} arcs exceeds maximum {}", arcs.len(), MAX_OID_LEN).into(),
            )
            .boxed());
        }
        Ok(Self { arcs })
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Whether the dotted text of this OID starts with the dotted text of
    /// `base`.
    ///
    /// This is the table-walk termination test. It compares strings, not
    /// arcs, so `1.3.6.1.2.1.10` counts as being under `1.3.6.1.2.1.1`.
    ///
    /// ```
    /// use snmp_v1::oid;
    ///
    /// let base = oid!(1, 3, 6, 1, 2, 1, 1);
    /// assert!(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0).has_text_prefix(&base));
    /// assert!(oid!(1, 3, 6, 1, 2, 1, 10, 1).has_text_prefix(&base));
    /// assert!(!oid!(1, 3, 6, 1, 2, 1, 2, 1).has_text_prefix(&base));
    /// ```
    pub fn has_text_prefix(&self, base: &Oid) -> bool {
        self.to_string().starts_with(&base.to_string())
    }

    /// This OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Content octets per X.690 Section 8.19.
    ///
    /// The first two arcs share one subidentifier, `arc1 * 40 + arc2`. A
    /// lone arc is packed with an implied second arc of zero, and the empty
    /// OID has no content at all.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut out = SmallVec::new();
        let (packed, rest) = match self.arcs.as_slice() {
            [] => return out,
            [only] => (u64::from(*only) * 40, &[][..]),
            [first, second, rest @ ..] => (u64::from(*first) * 40 + u64::from(*second), rest),
        };
        push_subidentifier(&mut out, packed);
        for &arc in rest {
            push_subidentifier(&mut out, u64::from(arc));
        }
        out
    }

    pub fn to_ber(&self) -> Vec<u8> {
        self.to_ber_smallvec().to_vec()
    }

    /// Decode content octets, rejecting more than [`MAX_OID_LEN`] arcs.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        let mut arcs = SmallVec::<[u32; 16]>::new();
        let mut offset = 0;

        while offset < data.len() {
            let (subid, used) = read_subidentifier(&data[offset..], offset)?;
            if offset == 0 {
                let (first, second) = match subid {
                    0..40 => (0, subid),
                    40..80 => (1, subid - 40),
                    _ => (2, subid - 80),
                };
                let second = u32::try_from(second)
                    .map_err(|_| Error::decode(0, DecodeErrorKind::InvalidOidEncoding))?;
                arcs.extend([first, second]);
            } else {
                let arc = u32::try_from(subid)
                    .map_err(|_| Error::decode(offset, DecodeErrorKind::InvalidOidEncoding))?;
                arcs.push(arc);
            }
            offset += used;

            if arcs.len() > MAX_OID_LEN {
                return Err(Error::decode(
                    offset,
                    DecodeErrorKind::OidTooLong {
                        count: arcs.len(),
                        max: MAX_OID_LEN,
                    },
                ));
            }
        }

        Ok(Self { arcs })
    }
}

/// Append `value` in base-128, most significant group first.
fn push_subidentifier(out: &mut SmallVec<[u8; 64]>, value: u64) {
    let groups = (u64::BITS - value.leading_zeros()).div_ceil(7).max(1);
    out.extend((0..groups).rev().map(|g| {
        let septet = ((value >> (g * 7)) & 0x7F) as u8;
        if g == 0 { septet } else { septet | 0x80 }
    }));
}

/// Read one subidentifier starting at `base`, returning it and the octets
/// it used.
fn read_subidentifier(data: &[u8], base: usize) -> Result<(u64, usize)> {
    // 0x80 as a leading octet pads the value (X.690 8.19.2)
    if data.first() == Some(&0x80) {
        return Err(Error::decode(base, DecodeErrorKind::InvalidOidEncoding));
    }

    let mut value = 0u64;
    for (i, &octet) in data.iter().enumerate() {
        if value.leading_zeros() < 7 {
            return Err(Error::decode(base + i, DecodeErrorKind::InvalidOidEncoding));
        }
        value = (value << 7) | u64::from(octet & 0x7F);
        if octet & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(Error::decode(base + data.len(), DecodeErrorKind::TruncatedData))
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.arcs.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
        }
        arcs.try_for_each(|arc| write!(f, ".{}", arc))
    }
}

/// Build an OID from literal arcs.
///
/// ```
/// use snmp_v1::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
