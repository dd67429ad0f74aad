//! SNMP Protocol Data Units (PDUs).
//!
//! Get, GetNext, Set, Response, Inform and v2 Trap share one four-slot
//! layout ([`Pdu`]). The v1 Trap has its own six-slot layout
//! ([`TrapV1Pdu`]) and GetBulk reinterprets the middle two slots
//! ([`GetBulkPdu`]). All three are validated through
//! [`Shape`](crate::sequence::Shape).

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::sequence::{Shape, Slot, is_integer, is_ip_address, is_oid, is_sequence, is_timeticks};
use crate::value::Value;
use crate::varbind::{VarBind, encode_varbind_list, varbinds_from_values};

/// sysUpTime.0, first binding of every v2 trap.
pub const SYS_UPTIME: [u32; 9] = [1, 3, 6, 1, 2, 1, 1, 3, 0];

/// snmpTrapOID.0, second binding of every v2 trap.
pub const SNMP_TRAP_OID: [u32; 11] = [1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0];

/// Layout shared by Get, GetNext, Set, Response, Inform and v2 Trap.
pub const PDU_SHAPE: Shape = Shape {
    what: "PDU",
    slots: &[
        Slot {
            name: "request ID",
            accepts: is_integer,
        },
        Slot {
            name: "error status",
            accepts: is_integer,
        },
        Slot {
            name: "error index",
            accepts: is_integer,
        },
        Slot {
            name: "variable bindings",
            accepts: is_sequence,
        },
    ],
};

/// Layout of GetBulkRequest.
pub const BULK_SHAPE: Shape = Shape {
    what: "GetBulk PDU",
    slots: &[
        Slot {
            name: "request ID",
            accepts: is_integer,
        },
        Slot {
            name: "non-repeaters",
            accepts: is_integer,
        },
        Slot {
            name: "max-repetitions",
            accepts: is_integer,
        },
        Slot {
            name: "variable bindings",
            accepts: is_sequence,
        },
    ],
};

/// Layout of the SNMPv1 Trap PDU.
pub const TRAP_V1_SHAPE: Shape = Shape {
    what: "trap PDU",
    slots: &[
        Slot {
            name: "enterprise",
            accepts: is_oid,
        },
        Slot {
            name: "agent address",
            accepts: is_ip_address,
        },
        Slot {
            name: "generic trap",
            accepts: is_integer,
        },
        Slot {
            name: "specific trap",
            accepts: is_integer,
        },
        Slot {
            name: "timestamp",
            accepts: is_timeticks,
        },
        Slot {
            name: "variable bindings",
            accepts: is_sequence,
        },
    ],
};

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = 0xA0,
    GetNextRequest = 0xA1,
    Response = 0xA2,
    SetRequest = 0xA3,
    TrapV1 = 0xA4,
    GetBulkRequest = 0xA5,
    InformRequest = 0xA6,
    TrapV2 = 0xA7,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::SET_REQUEST => Some(Self::SetRequest),
            tag::pdu::TRAP_V1 => Some(Self::TrapV1),
            tag::pdu::GET_BULK_REQUEST => Some(Self::GetBulkRequest),
            tag::pdu::INFORM_REQUEST => Some(Self::InformRequest),
            tag::pdu::TRAP_V2 => Some(Self::TrapV2),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
            Self::SetRequest => write!(f, "SetRequest"),
            Self::TrapV1 => write!(f, "TrapV1"),
            Self::GetBulkRequest => write!(f, "GetBulkRequest"),
            Self::InformRequest => write!(f, "InformRequest"),
            Self::TrapV2 => write!(f, "TrapV2"),
        }
    }
}

fn slot_i32(value: &Value, name: &'static str, offset: usize) -> Result<i32> {
    value
        .as_integer()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| Error::decode(offset, DecodeErrorKind::BadSlot(name)))
}

fn slot_varbinds(value: Value, offset: usize) -> Result<Vec<VarBind>> {
    match value {
        Value::Sequence(items) => varbinds_from_values(items, offset),
        _ => Err(Error::decode(offset, DecodeErrorKind::BadSlot("variable bindings"))),
    }
}

/// Split a checked element list into its fixed number of slots.
fn into_slots<const N: usize>(elements: Vec<Value>, shape: &Shape, offset: usize) -> Result<[Value; N]> {
    let actual = elements.len();
    elements.try_into().map_err(|_| {
        Error::decode(
            offset,
            DecodeErrorKind::WrongElementCount {
                shape: shape.what,
                expected: N,
                actual,
            },
        )
    })
}

/// Generic PDU structure for request/response operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// PDU type
    pub pdu_type: PduType,
    /// Request ID for correlating requests and responses
    pub request_id: i32,
    /// Error status (0 for requests, error code for responses)
    pub error_status: i32,
    /// Error index (1-based index of problematic varbind)
    pub error_index: i32,
    /// Variable bindings
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Create a PDU of any four-slot type with no error.
    pub fn new(pdu_type: PduType, request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// Create a new GET request PDU.
    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::new(
            PduType::GetRequest,
            request_id,
            oids.iter().cloned().map(VarBind::null).collect(),
        )
    }

    /// Create a new GETNEXT request PDU.
    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::new(
            PduType::GetNextRequest,
            request_id,
            oids.iter().cloned().map(VarBind::null).collect(),
        )
    }

    /// Create a new SET request PDU.
    pub fn set_request(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self::new(PduType::SetRequest, request_id, varbinds)
    }

    /// Create an SNMPv2 trap PDU.
    ///
    /// sysUpTime.0 and snmpTrapOID.0 are prepended to `varbinds`.
    ///
    /// ```
    /// use snmp_v1::oid;
    /// use snmp_v1::pdu::{Pdu, PduType};
    ///
    /// let trap = Pdu::trap_v2(1, 500, oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 1), vec![]);
    /// assert_eq!(trap.pdu_type, PduType::TrapV2);
    /// assert_eq!(trap.varbinds.len(), 2);
    /// assert_eq!(trap.varbinds[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
    /// ```
    pub fn trap_v2(request_id: i32, uptime: u32, trap_oid: Oid, varbinds: Vec<VarBind>) -> Self {
        let mut all = Vec::with_capacity(varbinds.len() + 2);
        all.push(VarBind::new(Oid::from_slice(&SYS_UPTIME), Value::TimeTicks(uptime)));
        all.push(VarBind::new(
            Oid::from_slice(&SNMP_TRAP_OID),
            Value::ObjectIdentifier(trap_oid),
        ));
        all.extend(varbinds);
        Self::new(PduType::TrapV2, request_id, all)
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_i32(self.error_index);
            buf.push_i32(self.error_status);
            buf.push_i32(self.request_id);
        });
    }

    fn from_elements(pdu_type: PduType, elements: Vec<Value>, offset: usize) -> Result<Self> {
        let [request_id, error_status, error_index, varbinds] = into_slots::<4>(elements, &PDU_SHAPE, offset)?;
        Ok(Pdu {
            pdu_type,
            request_id: slot_i32(&request_id, "request ID", offset)?,
            error_status: slot_i32(&error_status, "error status", offset)?,
            error_index: slot_i32(&error_index, "error index", offset)?,
            varbinds: slot_varbinds(varbinds, offset)?,
        })
    }

    /// Decode a four-slot PDU, including its tag.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let start = decoder.offset();
        match AnyPdu::decode(decoder)? {
            AnyPdu::Standard(pdu) => Ok(pdu),
            other => Err(Error::decode(
                start,
                DecodeErrorKind::UnexpectedTag {
                    expected: tag::pdu::RESPONSE,
                    actual: other.pdu_type().tag(),
                },
            )),
        }
    }

    /// Check if this is an error response.
    pub fn is_error(&self) -> bool {
        self.error_status != 0
    }

    /// Get the error status as an enum.
    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }

    /// Response echoing this PDU's request ID and bindings with no error.
    pub fn to_response(&self) -> Self {
        Self::new(PduType::Response, self.request_id, self.varbinds.clone())
    }

    /// Response echoing this PDU's request ID and bindings with an error.
    pub fn to_error_response(&self, error_status: ErrorStatus, error_index: i32) -> Self {
        Self {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: error_status.as_i32(),
            error_index,
            varbinds: self.varbinds.clone(),
        }
    }
}

/// SNMPv1 generic trap types (RFC 1157 Section 4.1.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GenericTrap {
    /// coldStart(0) - agent is reinitializing, config may change
    ColdStart = 0,
    /// warmStart(1) - agent is reinitializing, config unchanged
    WarmStart = 1,
    /// linkDown(2) - communication link failure
    LinkDown = 2,
    /// linkUp(3) - communication link came up
    LinkUp = 3,
    /// authenticationFailure(4) - improperly authenticated message received
    AuthenticationFailure = 4,
    /// egpNeighborLoss(5) - EGP peer marked down
    EgpNeighborLoss = 5,
    /// enterpriseSpecific(6) - vendor-specific trap, see specific_trap field
    EnterpriseSpecific = 6,
}

impl GenericTrap {
    /// Create from integer value.
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::ColdStart),
            1 => Some(Self::WarmStart),
            2 => Some(Self::LinkDown),
            3 => Some(Self::LinkUp),
            4 => Some(Self::AuthenticationFailure),
            5 => Some(Self::EgpNeighborLoss),
            6 => Some(Self::EnterpriseSpecific),
            _ => None,
        }
    }

    /// Get the integer value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// SNMPv1 Trap PDU (RFC 1157 Section 4.1.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapV1Pdu {
    /// Enterprise OID (sysObjectID of the entity generating the trap)
    pub enterprise: Oid,
    /// Agent address (IP address of the agent generating the trap)
    pub agent_addr: [u8; 4],
    /// Generic trap type
    pub generic_trap: i32,
    /// Specific trap code (meaningful when generic_trap is enterpriseSpecific)
    pub specific_trap: i32,
    /// Time since the network entity was last (re)initialized (in hundredths of seconds)
    pub time_stamp: u32,
    /// Variable bindings containing "interesting" information
    pub varbinds: Vec<VarBind>,
}

impl TrapV1Pdu {
    /// Create a new SNMPv1 Trap PDU.
    pub fn new(
        enterprise: Oid,
        agent_addr: [u8; 4],
        generic_trap: GenericTrap,
        specific_trap: i32,
        time_stamp: u32,
        varbinds: Vec<VarBind>,
    ) -> Self {
        Self {
            enterprise,
            agent_addr,
            generic_trap: generic_trap.as_i32(),
            specific_trap,
            time_stamp,
            varbinds,
        }
    }

    /// Get the generic trap type as an enum.
    pub fn generic_trap_enum(&self) -> Option<GenericTrap> {
        GenericTrap::from_i32(self.generic_trap)
    }

    /// Check if this is an enterprise-specific trap.
    pub fn is_enterprise_specific(&self) -> bool {
        self.generic_trap == GenericTrap::EnterpriseSpecific as i32
    }

    /// The equivalent snmpTrapOID.0 value (RFC 3584 Section 3).
    ///
    /// Generic traps map to `snmpTraps.{generic + 1}`; enterprise-specific
    /// ones to `enterprise.0.specific`.
    ///
    /// ```rust
    /// use snmp_v1::pdu::{TrapV1Pdu, GenericTrap};
    /// use snmp_v1::oid;
    ///
    /// let trap = TrapV1Pdu::new(oid!(1, 3, 6, 1, 4, 1, 9999), [192, 168, 1, 1], GenericTrap::LinkDown, 0, 12345, vec![]);
    /// assert_eq!(trap.v2_trap_oid(), oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 3));
    ///
    /// let trap = TrapV1Pdu::new(oid!(1, 3, 6, 1, 4, 1, 9999), [192, 168, 1, 1], GenericTrap::EnterpriseSpecific, 42, 12345, vec![]);
    /// assert_eq!(trap.v2_trap_oid(), oid!(1, 3, 6, 1, 4, 1, 9999, 0, 42));
    /// ```
    pub fn v2_trap_oid(&self) -> Oid {
        if self.is_enterprise_specific() {
            self.enterprise.child(0).child(self.specific_trap as u32)
        } else {
            crate::oid!(1, 3, 6, 1, 6, 3, 1, 1, 5).child((self.generic_trap + 1) as u32)
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(tag::pdu::TRAP_V1, |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_unsigned(tag::application::TIMETICKS, self.time_stamp as u64);
            buf.push_i32(self.specific_trap);
            buf.push_i32(self.generic_trap);
            buf.push_primitive(tag::application::IP_ADDRESS, &self.agent_addr);
            buf.push_oid(&self.enterprise);
        });
    }

    fn from_elements(elements: Vec<Value>, offset: usize) -> Result<Self> {
        let [enterprise, agent_addr, generic_trap, specific_trap, time_stamp, varbinds] =
            into_slots::<6>(elements, &TRAP_V1_SHAPE, offset)?;
        let bad = |name| Error::decode(offset, DecodeErrorKind::BadSlot(name));
        Ok(TrapV1Pdu {
            enterprise: enterprise.as_oid().cloned().ok_or_else(|| bad("enterprise"))?,
            agent_addr: match agent_addr {
                Value::IpAddress(addr) => addr,
                _ => return Err(bad("agent address")),
            },
            generic_trap: slot_i32(&generic_trap, "generic trap", offset)?,
            specific_trap: slot_i32(&specific_trap, "specific trap", offset)?,
            time_stamp: match time_stamp {
                Value::TimeTicks(t) => t,
                _ => return Err(bad("timestamp")),
            },
            varbinds: slot_varbinds(varbinds, offset)?,
        })
    }
}

/// GETBULK request PDU.
///
/// Decoded so v2 traffic can be read; a v1 client never sends one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBulkPdu {
    /// Request ID
    pub request_id: i32,
    /// Number of non-repeating OIDs
    pub non_repeaters: i32,
    /// Maximum repetitions for repeating OIDs
    pub max_repetitions: i32,
    /// Variable bindings
    pub varbinds: Vec<VarBind>,
}

impl GetBulkPdu {
    /// Create a GETBULK request.
    pub fn new(request_id: i32, non_repeaters: i32, max_repetitions: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            request_id,
            non_repeaters,
            max_repetitions,
            varbinds,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(tag::pdu::GET_BULK_REQUEST, |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_i32(self.max_repetitions);
            buf.push_i32(self.non_repeaters);
            buf.push_i32(self.request_id);
        });
    }

    fn from_elements(elements: Vec<Value>, offset: usize) -> Result<Self> {
        let [request_id, non_repeaters, max_repetitions, varbinds] = into_slots::<4>(elements, &BULK_SHAPE, offset)?;
        Ok(GetBulkPdu {
            request_id: slot_i32(&request_id, "request ID", offset)?,
            non_repeaters: slot_i32(&non_repeaters, "non-repeaters", offset)?,
            max_repetitions: slot_i32(&max_repetitions, "max-repetitions", offset)?,
            varbinds: slot_varbinds(varbinds, offset)?,
        })
    }
}

/// Any PDU that can appear in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyPdu {
    /// Four-slot PDU (Get, GetNext, Set, Response, Inform, v2 Trap).
    Standard(Pdu),
    /// SNMPv1 Trap.
    TrapV1(TrapV1Pdu),
    /// GetBulkRequest.
    GetBulk(GetBulkPdu),
}

impl AnyPdu {
    /// The PDU type.
    pub fn pdu_type(&self) -> PduType {
        match self {
            AnyPdu::Standard(pdu) => pdu.pdu_type,
            AnyPdu::TrapV1(_) => PduType::TrapV1,
            AnyPdu::GetBulk(_) => PduType::GetBulkRequest,
        }
    }

    /// Request ID, if the PDU carries one (v1 traps do not).
    pub fn request_id(&self) -> Option<i32> {
        match self {
            AnyPdu::Standard(pdu) => Some(pdu.request_id),
            AnyPdu::TrapV1(_) => None,
            AnyPdu::GetBulk(pdu) => Some(pdu.request_id),
        }
    }

    /// Variable bindings.
    pub fn varbinds(&self) -> &[VarBind] {
        match self {
            AnyPdu::Standard(pdu) => &pdu.varbinds,
            AnyPdu::TrapV1(pdu) => &pdu.varbinds,
            AnyPdu::GetBulk(pdu) => &pdu.varbinds,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            AnyPdu::Standard(pdu) => pdu.encode(buf),
            AnyPdu::TrapV1(pdu) => pdu.encode(buf),
            AnyPdu::GetBulk(pdu) => pdu.encode(buf),
        }
    }

    /// Decode a PDU TLV.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let start = decoder.offset();
        match Value::decode(decoder)? {
            Value::Pdu(pdu) => Ok(*pdu),
            other => Err(Error::decode(start, DecodeErrorKind::NotAPdu(other.tag()))),
        }
    }

    /// Build a PDU from the content of a TLV tagged `t`.
    pub(crate) fn decode_content(t: u8, content: &mut Decoder) -> Result<Self> {
        let offset = content.offset();
        let pdu_type = PduType::from_tag(t).ok_or_else(|| content.error(DecodeErrorKind::NotAPdu(t)))?;
        match pdu_type {
            PduType::TrapV1 => {
                let elements = TRAP_V1_SHAPE.decode(content)?;
                TrapV1Pdu::from_elements(elements, offset).map(AnyPdu::TrapV1)
            }
            PduType::GetBulkRequest => {
                let elements = BULK_SHAPE.decode(content)?;
                GetBulkPdu::from_elements(elements, offset).map(AnyPdu::GetBulk)
            }
            _ => {
                let elements = PDU_SHAPE.decode(content)?;
                Pdu::from_elements(pdu_type, elements, offset).map(AnyPdu::Standard)
            }
        }
    }
}

impl From<Pdu> for AnyPdu {
    fn from(pdu: Pdu) -> Self {
        AnyPdu::Standard(pdu)
    }
}

impl From<TrapV1Pdu> for AnyPdu {
    fn from(pdu: TrapV1Pdu) -> Self {
        AnyPdu::TrapV1(pdu)
    }
}

impl From<GetBulkPdu> for AnyPdu {
    fn from(pdu: GetBulkPdu) -> Self {
        AnyPdu::GetBulk(pdu)
    }
}
