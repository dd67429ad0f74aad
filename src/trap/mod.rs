//! Trap sending and receiving.
//!
//! Traps are fire-and-forget: [`TrapSender`] writes a v1 Trap-PDU or a
//! v2 Trap-PDU to port 162 and returns. [`TrapReceiver`] listens on that
//! port and hands each decoded notification to the listeners registered
//! for its [`TrapKind`]. v2 InformRequests are acknowledged with a Response
//! that echoes their variable bindings before listeners run.
//!
//! # Example
//!
//! ```rust,no_run
//! use snmp_v1::trap::{Trap, TrapKind, TrapReceiver};
//! use std::sync::Arc;
//!
//! # async fn example() -> snmp_v1::Result<()> {
//! let receiver = TrapReceiver::builder()
//!     .bind("0.0.0.0:1162")
//!     .listener(TrapKind::V1, Arc::new(|trap: &Trap| {
//!         println!("trap from {}: {:?}", trap.source, trap.trap_oid());
//!         Ok(())
//!     }))
//!     .build()
//!     .await?;
//!
//! receiver.run().await
//! # }
//! ```

mod receiver;
mod sender;

pub use receiver::{TrapReceiver, TrapReceiverBuilder};
pub use sender::TrapSender;

use std::net::SocketAddr;

use bytes::Bytes;

use crate::error::Result;
use crate::message::{Message, Version};
use crate::oid::Oid;
use crate::pdu::{AnyPdu, PduType, SNMP_TRAP_OID, SYS_UPTIME, TrapV1Pdu};
use crate::value::Value;
use crate::varbind::VarBind;

/// Default trap port.
pub const DEFAULT_TRAP_PORT: u16 = 162;

/// Notification flavours a listener can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapKind {
    /// SNMPv1 Trap-PDU (tag 0xA4)
    V1,
    /// SNMPv2 Trap-PDU (tag 0xA7)
    V2,
    /// InformRequest (tag 0xA6), acknowledged on receipt
    Inform,
}

impl TrapKind {
    /// Kind of notification a PDU carries, if it is one.
    pub fn of(pdu: &AnyPdu) -> Option<Self> {
        match pdu.pdu_type() {
            PduType::TrapV1 => Some(TrapKind::V1),
            PduType::TrapV2 => Some(TrapKind::V2),
            PduType::InformRequest => Some(TrapKind::Inform),
            _ => None,
        }
    }
}

/// A received notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trap {
    /// Address the datagram came from.
    pub source: SocketAddr,
    /// Message version.
    pub version: Version,
    /// Community string.
    pub community: Bytes,
    /// Notification flavour.
    pub kind: TrapKind,
    /// The PDU as received.
    pub pdu: AnyPdu,
}

impl Trap {
    /// Wrap a decoded message, if it carries a notification.
    pub fn from_message(message: Message, source: SocketAddr) -> Option<Self> {
        let kind = TrapKind::of(&message.pdu)?;
        Some(Trap {
            source,
            version: message.version,
            community: message.community,
            kind,
            pdu: message.pdu,
        })
    }

    /// The v1 trap PDU, for [`TrapKind::V1`].
    pub fn v1(&self) -> Option<&TrapV1Pdu> {
        match &self.pdu {
            AnyPdu::TrapV1(trap) => Some(trap),
            _ => None,
        }
    }

    /// All variable bindings, including sysUpTime.0 and snmpTrapOID.0 for v2.
    pub fn varbinds(&self) -> &[VarBind] {
        self.pdu.varbinds()
    }

    /// The notification OID.
    ///
    /// For v1 traps this is the RFC 3584 translation of enterprise, generic
    /// and specific trap; for v2 the value bound to snmpTrapOID.0.
    pub fn trap_oid(&self) -> Option<Oid> {
        match &self.pdu {
            AnyPdu::TrapV1(trap) => Some(trap.v2_trap_oid()),
            _ => self
                .bound(&SNMP_TRAP_OID)
                .and_then(Value::as_oid)
                .cloned(),
        }
    }

    /// Agent uptime in hundredths of a second.
    pub fn uptime(&self) -> Option<u32> {
        match &self.pdu {
            AnyPdu::TrapV1(trap) => Some(trap.time_stamp),
            _ => match self.bound(&SYS_UPTIME) {
                Some(Value::TimeTicks(ticks)) => Some(*ticks),
                _ => None,
            },
        }
    }

    fn bound(&self, arcs: &[u32]) -> Option<&Value> {
        self.varbinds()
            .iter()
            .find(|vb| vb.oid.arcs() == arcs)
            .map(|vb| &vb.value)
    }
}

/// Receives notifications of the kinds it was registered for.
///
/// Errors are logged by the receiver and do not stop it. Any
/// `Fn(&Trap) -> Result<()>` closure is a listener.
pub trait TrapListener: Send + Sync {
    /// Handle one notification.
    fn on_trap(&self, trap: &Trap) -> Result<()>;
}

impl<F> TrapListener for F
where
    F: Fn(&Trap) -> Result<()> + Send + Sync,
{
    fn on_trap(&self, trap: &Trap) -> Result<()> {
        self(trap)
    }
}
