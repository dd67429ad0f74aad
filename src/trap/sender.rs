//! Fire-and-forget trap sender.

use bytes::Bytes;

use super::DEFAULT_TRAP_PORT;
use crate::error::{Error, Result};
use crate::message::{Message, Version};
use crate::oid::Oid;
use crate::pdu::{Pdu, TrapV1Pdu};
use crate::request_id::RequestIdGenerator;
use crate::transport::{Transport, UdpTransport};
use crate::util::resolve_target;
use crate::varbind::VarBind;

/// Sends traps to one manager. No response is awaited.
pub struct TrapSender<T: Transport = UdpTransport> {
    transport: T,
    community: Bytes,
    request_ids: RequestIdGenerator,
}

impl TrapSender<UdpTransport> {
    /// Resolve `host` and open a socket towards `port` (usually 162).
    pub async fn new(host: &str, port: u16) -> Result<Self> {
        if port == 0 {
            return Err(Error::Config("port must be non-zero".into()).boxed());
        }
        let target = resolve_target(host, port).await?;
        let transport = UdpTransport::connect(target).await?;
        Ok(Self::with_transport(transport))
    }

    /// [`new`](Self::new) on the default trap port.
    pub async fn to_host(host: &str) -> Result<Self> {
        Self::new(host, DEFAULT_TRAP_PORT).await
    }
}

impl<T: Transport> TrapSender<T> {
    /// Send over an existing transport with community "public".
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            community: Bytes::from_static(b"public"),
            request_ids: RequestIdGenerator::default(),
        }
    }

    /// Use `community` for every trap sent.
    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.community = community.into();
        self
    }

    /// Manager address.
    pub fn peer_addr(&self) -> std::net::SocketAddr {
        self.transport.peer_addr()
    }

    /// Send a v1 Trap-PDU in a version 0 message.
    pub async fn send_v1(&self, trap: TrapV1Pdu) -> Result<()> {
        tracing::debug!(
            target: "snmp_v1::trap",
            { snmp.target = %self.peer_addr(), snmp.generic_trap = trap.generic_trap, snmp.specific_trap = trap.specific_trap },
            "sending v1 trap"
        );
        let data = Message::v1(self.community.clone(), trap).encode();
        self.transport.send(&data).await
    }

    /// Send a v2 Trap-PDU in a v2c message.
    ///
    /// sysUpTime.0 and snmpTrapOID.0 are bound first. Returns the request ID
    /// used.
    pub async fn send_v2(&self, uptime: u32, trap_oid: Oid, varbinds: Vec<VarBind>) -> Result<i32> {
        let request_id = self.request_ids.next();
        tracing::debug!(
            target: "snmp_v1::trap",
            { snmp.target = %self.peer_addr(), snmp.request_id = request_id, snmp.trap_oid = %trap_oid },
            "sending v2 trap"
        );
        let pdu = Pdu::trap_v2(request_id, uptime, trap_oid, varbinds);
        let data = Message::new(Version::V2c, self.community.clone(), pdu).encode();
        self.transport.send(&data).await?;
        Ok(request_id)
    }
}
