//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value. On the wire it is a two-element
//! SEQUENCE, and a VarBindList is a SEQUENCE of those.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::sequence::{Shape, Slot, is_oid};
use crate::value::Value;

fn is_bindable(v: &Value) -> bool {
    !matches!(v, Value::Pdu(_))
}

/// Layout of a single variable binding.
pub const VARBIND_SHAPE: Shape = Shape {
    what: "variable binding",
    slots: &[
        Slot {
            name: "variable name",
            accepts: is_oid,
        },
        Slot {
            name: "variable value",
            accepts: is_bindable,
        },
    ],
};

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for Get and GetNext requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Decode one SEQUENCE { OID, value } from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let mut elements = VARBIND_SHAPE.decode(&mut seq)?.into_iter();
        match (elements.next(), elements.next()) {
            (Some(Value::ObjectIdentifier(oid)), Some(value)) => Ok(VarBind { oid, value }),
            _ => Err(seq.error(DecodeErrorKind::BadSlot("variable name"))),
        }
    }

    /// Convert a generic two-element sequence into a binding.
    fn from_pair(value: Value) -> Option<Self> {
        let Value::Sequence(items) = value else {
            return None;
        };
        if VARBIND_SHAPE.check(&items).is_err() {
            return None;
        }
        let mut items = items.into_iter();
        match (items.next(), items.next()) {
            (Some(Value::ObjectIdentifier(oid)), Some(value)) => Some(VarBind { oid, value }),
            _ => None,
        }
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encode a list of VarBinds as a SEQUENCE of SEQUENCE.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| {
        for vb in varbinds.iter().rev() {
            vb.encode(buf);
        }
    });
}

/// Decode a VarBindList SEQUENCE.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    let start = decoder.offset();
    let mut seq = decoder.read_sequence()?;
    let items = crate::sequence::decode_elements(&mut seq)?;
    varbinds_from_values(items, start)
}

/// Convert the elements of an already-decoded VarBindList.
///
/// Each element must be a two-element SEQUENCE whose first element is an
/// OID; the first one that is not fails with
/// [`DecodeErrorKind::BadVariableBinding`] carrying its 0-based position.
pub(crate) fn varbinds_from_values(items: Vec<Value>, offset: usize) -> Result<Vec<VarBind>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            VarBind::from_pair(item).ok_or_else(|| {
                let kind = DecodeErrorKind::BadVariableBinding { index };
                tracing::debug!(target: "snmp_v1::ber", { snmp.offset = offset, kind = %kind }, "decode error");
                Error::decode(offset, kind)
            })
        })
        .collect()
}

/// Encode a VarBindList with a NULL value for each OID.
pub fn encode_null_varbinds(buf: &mut EncodeBuf, oids: &[Oid]) {
    buf.push_sequence(|buf| {
        for oid in oids.iter().rev() {
            buf.push_sequence(|buf| {
                buf.push_null();
                buf.push_oid(oid);
            });
        }
    });
}
