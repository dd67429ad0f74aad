//! Validated fixed-shape sequences.
//!
//! Every composite on the wire (PDU, trap PDU, message, variable binding)
//! is a SEQUENCE with a fixed number of elements and a fixed type per
//! position. [`Shape`] describes that layout once so each composite only
//! has to name its slots.

use crate::ber::Decoder;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::value::Value;

/// One position in a [`Shape`].
#[derive(Clone, Copy)]
pub struct Slot {
    /// Field name, used in the "bad {name}" error message.
    pub name: &'static str,
    /// Type predicate for the element in this position.
    pub accepts: fn(&Value) -> bool,
}

/// Expected layout of a fixed-shape sequence.
#[derive(Clone, Copy)]
pub struct Shape {
    /// Name of the composite, used in element-count errors.
    pub what: &'static str,
    pub slots: &'static [Slot],
}

pub(crate) fn is_integer(v: &Value) -> bool {
    matches!(v, Value::Integer(_))
}

pub(crate) fn is_octet_string(v: &Value) -> bool {
    matches!(v, Value::OctetString(_))
}

pub(crate) fn is_oid(v: &Value) -> bool {
    matches!(v, Value::ObjectIdentifier(_))
}

pub(crate) fn is_ip_address(v: &Value) -> bool {
    matches!(v, Value::IpAddress(_))
}

pub(crate) fn is_timeticks(v: &Value) -> bool {
    matches!(v, Value::TimeTicks(_))
}

pub(crate) fn is_sequence(v: &Value) -> bool {
    matches!(v, Value::Sequence(_))
}

pub(crate) fn is_pdu(v: &Value) -> bool {
    matches!(v, Value::Pdu(_))
}

/// Decode every TLV in `decoder` in order until it is exhausted.
pub fn decode_elements(decoder: &mut Decoder) -> Result<Vec<Value>> {
    let mut elements = Vec::new();
    while !decoder.is_empty() {
        elements.push(Value::decode(decoder)?);
    }
    Ok(elements)
}

impl Shape {
    /// Decode the content of a sequence and check it against this shape.
    pub fn decode(&self, decoder: &mut Decoder) -> Result<Vec<Value>> {
        let start = decoder.offset();
        let elements = decode_elements(decoder)?;
        self.check(&elements).map_err(|kind| {
            tracing::debug!(target: "snmp_v1::ber", { snmp.offset = start, kind = %kind }, "decode error");
            Error::decode(start, kind)
        })?;
        Ok(elements)
    }

    /// Check element count, then each slot in order.
    ///
    /// ```
    /// use snmp_v1::Value;
    /// use snmp_v1::error::DecodeErrorKind;
    ///
    /// let shape = snmp_v1::pdu::PDU_SHAPE;
    /// let elements = vec![Value::integer(1), Value::Null, Value::integer(0), Value::Sequence(vec![])];
    /// assert_eq!(shape.check(&elements), Err(DecodeErrorKind::BadSlot("error status")));
    /// ```
    pub fn check(&self, elements: &[Value]) -> std::result::Result<(), DecodeErrorKind> {
        if elements.len() != self.slots.len() {
            return Err(DecodeErrorKind::WrongElementCount {
                shape: self.what,
                expected: self.slots.len(),
                actual: elements.len(),
            });
        }
        for (slot, element) in self.slots.iter().zip(elements) {
            if !(slot.accepts)(element) {
                return Err(DecodeErrorKind::BadSlot(slot.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: Shape = Shape {
        what: "pair",
        slots: &[
            Slot { name: "left", accepts: is_integer },
            Slot { name: "right", accepts: is_octet_string },
        ],
    };

    #[test]
    fn test_count_checked_before_slots() {
        let err = PAIR.check(&[Value::Null]).unwrap_err();
        assert_eq!(
            err,
            DecodeErrorKind::WrongElementCount {
                shape: "pair",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_first_bad_slot_is_reported() {
        let err = PAIR.check(&[Value::Null, Value::Null]).unwrap_err();
        assert_eq!(err.to_string(), "bad left");
        let err = PAIR.check(&[Value::integer(1), Value::Null]).unwrap_err();
        assert_eq!(err.to_string(), "bad right");
        PAIR.check(&[Value::integer(1), Value::from("x")]).unwrap();
    }

    #[test]
    fn test_decode_reports_sequence_offset() {
        // INTEGER 1, NULL
        let mut decoder = Decoder::from_slice(&[0x02, 0x01, 0x01, 0x05, 0x00]);
        let err = PAIR.decode(&mut decoder).unwrap_err();
        assert!(matches!(
            *err,
            Error::Decode {
                offset: 0,
                kind: DecodeErrorKind::BadSlot("right")
            }
        ));
    }
}
