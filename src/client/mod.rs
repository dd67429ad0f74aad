//! SNMP v1 communicator.
//!
//! A [`Communicator`] talks to one agent. Every exchange (request ID
//! allocation, send, and the receive loop that waits for the matching
//! response) runs under one async mutex, so a communicator shared between
//! tasks still has at most one request in flight.

mod walk;

use crate::error::{Error, ErrorStatus, Result};
use crate::message::{Message, Version};
use crate::oid::Oid;
use crate::pdu::{AnyPdu, Pdu, PduType};
use crate::request_id::RequestIdGenerator;
use crate::transport::{Transport, UdpTransport};
use crate::util::{DEFAULT_BUFFER_SIZE, resolve_target};
use crate::value::Value;
use crate::varbind::VarBind;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::instrument;

/// Default agent port.
pub const DEFAULT_PORT: u16 = 161;

/// Communicator configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Version written into outgoing messages (default: V1)
    pub version: Version,
    /// Community string (default: "public")
    pub community: Bytes,
    /// How long to wait for each response (default: 5 seconds)
    pub timeout: Duration,
    /// First request ID issued (default: 1)
    pub request_id_start: i32,
    /// Receive buffer in bytes, clamped to 484..=65535 (default: 512)
    pub recv_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: Version::V1,
            community: Bytes::from_static(b"public"),
            timeout: Duration::from_secs(5),
            request_id_start: 1,
            recv_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ClientConfig {
    /// Config with the given community and defaults otherwise.
    pub fn with_community(community: impl Into<Bytes>) -> Self {
        Self {
            community: community.into(),
            ..Self::default()
        }
    }

    /// Check settings that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()).boxed());
        }
        Ok(())
    }
}

/// Which request a get-style error refers to; selects the error wording.
#[derive(Clone, Copy, PartialEq, Eq)]
enum GetKind {
    Get,
    GetNext,
}

/// SNMP v1 manager for one agent.
///
/// Generic over transport type, with [`UdpTransport`] as default. Cloning
/// shares the socket, the request ID counter and the exchange lock.
#[derive(Clone)]
pub struct Communicator<T: Transport = UdpTransport> {
    inner: Arc<CommunicatorInner<T>>,
}

struct CommunicatorInner<T: Transport> {
    transport: T,
    config: ClientConfig,
    request_ids: RequestIdGenerator,
    /// Held for a whole exchange: ID allocation, send and receive.
    exchange: Mutex<()>,
    discarded: AtomicU64,
}

impl Communicator<UdpTransport> {
    /// Resolve `host`, open a UDP socket and return a communicator for it.
    ///
    /// Port 0 and a zero timeout are rejected before any socket is opened.
    ///
    /// ```rust,no_run
    /// use snmp_v1::{ClientConfig, Communicator, oid};
    ///
    /// # async fn example() -> snmp_v1::Result<()> {
    /// let comm = Communicator::connect("192.0.2.1", 161, ClientConfig::default()).await?;
    /// let system = comm.retrieve_table(&oid!(1, 3, 6, 1, 2, 1, 1)).await?;
    /// for vb in system {
    ///     println!("{}", vb);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(host: &str, port: u16, config: ClientConfig) -> Result<Self> {
        if port == 0 {
            return Err(Error::Config("port must be non-zero".into()).boxed());
        }
        config.validate()?;

        let target = resolve_target(host, port).await?;
        let transport = UdpTransport::connect_with_buffer(target, config.recv_buffer_size).await?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> Communicator<T> {
    /// Create a communicator over an existing transport.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        let request_ids = RequestIdGenerator::new(config.request_id_start);
        Self {
            inner: Arc::new(CommunicatorInner {
                transport,
                config,
                request_ids,
                exchange: Mutex::new(()),
                discarded: AtomicU64::new(0),
            }),
        }
    }

    /// Get the peer (target) address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.inner.transport.peer_addr()
    }

    /// The configuration this communicator was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Number of datagrams dropped because they were not the awaited response.
    ///
    /// Stale or duplicated responses (wrong request ID) and non-response PDUs
    /// are counted here instead of failing the request.
    pub fn discarded_responses(&self) -> u64 {
        self.inner.discarded.load(Ordering::Relaxed)
    }

    /// Run one request/response exchange.
    ///
    /// `build` receives the freshly allocated request ID. The receive loop
    /// keeps waiting, within the configured timeout, until a Response with
    /// that ID arrives. The error status is not interpreted here.
    #[instrument(
        level = "debug",
        skip(self, build),
        fields(snmp.target = %self.peer_addr(), snmp.request_id = tracing::field::Empty)
    )]
    async fn exchange(&self, build: impl FnOnce(i32) -> Pdu) -> Result<Pdu> {
        let _guard = self.inner.exchange.lock().await;

        let request_id = self.inner.request_ids.next();
        tracing::Span::current().record("snmp.request_id", request_id);
        let pdu = build(request_id);
        tracing::debug!(
            target: "snmp_v1::client",
            { snmp.pdu_type = %pdu.pdu_type, snmp.varbind_count = pdu.varbinds.len() },
            "sending {} request",
            pdu.pdu_type
        );

        let data = Message::new(self.inner.config.version, self.inner.config.community.clone(), pdu).encode();
        tracing::trace!(target: "snmp_v1::client", { snmp.bytes = data.len() }, "sending request");
        self.inner.transport.send(&data).await?;

        let timeout = self.inner.config.timeout;
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout {
                    target: self.peer_addr(),
                    elapsed: timeout,
                    request_id,
                }
                .boxed());
            }

            let (data, source) = self.inner.transport.recv(request_id, remaining).await?;
            tracing::trace!(target: "snmp_v1::client", { snmp.bytes = data.len(), snmp.source = %source }, "received response");
            let message = Message::decode_from(data, source)?;

            match message.pdu {
                AnyPdu::Standard(pdu)
                    if pdu.pdu_type == PduType::Response && pdu.request_id == request_id =>
                {
                    tracing::debug!(
                        target: "snmp_v1::client",
                        {
                            snmp.varbind_count = pdu.varbinds.len(),
                            snmp.error_status = pdu.error_status,
                            snmp.error_index = pdu.error_index
                        },
                        "received Response"
                    );
                    return Ok(pdu);
                }
                other => {
                    self.inner.discarded.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(
                        target: "snmp_v1::client",
                        {
                            snmp.source = %source,
                            snmp.expected_request_id = request_id,
                            snmp.request_id = ?other.request_id(),
                            snmp.pdu_type = %other.pdu_type()
                        },
                        "discarding unexpected datagram"
                    );
                }
            }
        }
    }

    fn get_error(&self, kind: GetKind, requested: &[Oid], response: &Pdu) -> Box<Error> {
        let status = response.error_status_enum();
        let index = response.error_index.max(0) as u32;
        let oid = oid_at(requested, index);
        let message = match kind {
            GetKind::Get => format!("unable to retrieve OID {}: {}", oid, status),
            GetKind::GetNext => format!("unable to retrieve OID following {}: {}", oid, status),
        };
        Error::Get {
            target: self.peer_addr(),
            status,
            index,
            message: message.into(),
        }
        .boxed()
    }

    fn set_error(&self, requested: &[Oid], response: &Pdu) -> Box<Error> {
        let status = response.error_status_enum();
        let index = response.error_index.max(0) as u32;
        let oid = oid_at(requested, index);
        let message = match status {
            ErrorStatus::TooBig => format!("value supplied for OID {} too big", oid),
            ErrorStatus::NoSuchName => format!("OID {} not available for setting", oid),
            ErrorStatus::BadValue => format!("bad value supplied for OID {}", oid),
            ErrorStatus::ReadOnly => format!("OID {} is read-only", oid),
            ErrorStatus::GenErr => format!("general error setting OID {}", oid),
            other => format!("error setting OID {}: {}", oid, other),
        };
        Error::Set {
            target: self.peer_addr(),
            status,
            index,
            message: message.into(),
        }
        .boxed()
    }

    /// Fail with GenErr unless the response carries one binding per request OID.
    fn check_count(&self, expected: usize, response: &Pdu) -> Result<()> {
        if response.varbinds.len() == expected {
            return Ok(());
        }
        Err(Error::Get {
            target: self.peer_addr(),
            status: ErrorStatus::GenErr,
            index: 0,
            message: format!(
                "expected {} variable bindings but received {}",
                expected,
                response.varbinds.len()
            )
            .into(),
        }
        .boxed())
    }

    /// Send a GetNextRequest and return the raw response.
    ///
    /// Used by the walks, which treat an error status as the end of the view.
    pub(crate) async fn next_round(&self, oids: &[Oid]) -> Result<Pdu> {
        self.exchange(|id| Pdu::get_next_request(id, oids)).await
    }

    /// GetRequest for one or more OIDs.
    ///
    /// The returned bindings are in request order. Each returned OID must equal
    /// the requested one; a mismatch fails with GenErr at that 1-based index
    /// even when the agent reported noError.
    #[instrument(skip(self, oids), err, fields(snmp.target = %self.peer_addr(), snmp.oid_count = oids.len()))]
    pub async fn get_entry(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        let response = self.exchange(|id| Pdu::get_request(id, oids)).await?;
        if response.is_error() {
            return Err(self.get_error(GetKind::Get, oids, &response));
        }
        self.check_count(oids.len(), &response)?;

        for (i, (requested, vb)) in oids.iter().zip(&response.varbinds).enumerate() {
            if vb.oid != *requested {
                return Err(Error::Get {
                    target: self.peer_addr(),
                    status: ErrorStatus::GenErr,
                    index: i as u32 + 1,
                    message: format!("OID expected {} but received {}", requested, vb.oid).into(),
                }
                .boxed());
            }
        }
        Ok(response.varbinds)
    }

    /// GetNextRequest for one or more OIDs.
    #[instrument(skip(self, oids), err, fields(snmp.target = %self.peer_addr(), snmp.oid_count = oids.len()))]
    pub async fn get_next_entry(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        let response = self.next_round(oids).await?;
        if response.is_error() {
            return Err(self.get_error(GetKind::GetNext, oids, &response));
        }
        self.check_count(oids.len(), &response)?;
        Ok(response.varbinds)
    }

    /// GetRequest for a single OID.
    pub async fn get(&self, oid: &Oid) -> Result<VarBind> {
        let mut varbinds = self.get_entry(std::slice::from_ref(oid)).await?;
        Ok(varbinds.remove(0))
    }

    /// GetNextRequest for a single OID.
    pub async fn get_next(&self, oid: &Oid) -> Result<VarBind> {
        let mut varbinds = self.get_next_entry(std::slice::from_ref(oid)).await?;
        Ok(varbinds.remove(0))
    }

    /// SetRequest assigning `values[i]` to `oids[i]`.
    ///
    /// Mismatched lengths fail with GenErr at index 0 before anything is sent.
    #[instrument(skip(self, oids, values), err, fields(snmp.target = %self.peer_addr(), snmp.oid_count = oids.len()))]
    pub async fn set_entry(&self, oids: &[Oid], values: &[Value]) -> Result<Vec<VarBind>> {
        if oids.len() != values.len() {
            return Err(Error::Set {
                target: self.peer_addr(),
                status: ErrorStatus::GenErr,
                index: 0,
                message: format!("{} OIDs supplied with {} values", oids.len(), values.len()).into(),
            }
            .boxed());
        }

        let varbinds: Vec<VarBind> = oids
            .iter()
            .zip(values)
            .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
            .collect();
        let response = self.exchange(|id| Pdu::set_request(id, varbinds)).await?;
        if response.is_error() {
            return Err(self.set_error(oids, &response));
        }
        Ok(response.varbinds)
    }

    /// SetRequest for a single OID.
    pub async fn set(&self, oid: &Oid, value: Value) -> Result<Vec<VarBind>> {
        self.set_entry(std::slice::from_ref(oid), std::slice::from_ref(&value))
            .await
    }
}

/// The requested OID an error index points at, or the first one when the
/// index is 0 or out of range.
fn oid_at(requested: &[Oid], index: u32) -> String {
    (index as usize)
        .checked_sub(1)
        .and_then(|i| requested.get(i))
        .or_else(|| requested.first())
        .map(Oid::to_string)
        .unwrap_or_default()
}
