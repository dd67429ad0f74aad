//! SNMP v1 agent.
//!
//! The agent owns one UDP socket and answers GetRequest, GetNextRequest and
//! SetRequest PDUs by asking every registered [`RequestHandler`] which of
//! the requested OIDs it recognizes. Any other PDU type is ignored.
//!
//! # Dispatch rules
//!
//! - Handlers run in registration order and the first handler to claim an
//!   OID wins.
//! - If any requested OID is left unclaimed, the response is an error
//!   response with status noSuchName and that OID's 1-based index, echoing
//!   the request's variable bindings unchanged.
//! - A handler that returns `Err`, panics, or exceeds the handler timeout
//!   turns the response into genErr with index 0, again echoing the request.
//!
//! # Example
//!
//! ```rust,no_run
//! use snmp_v1::agent::{Agent, MapHandler};
//! use snmp_v1::{Value, oid};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<snmp_v1::Error>> {
//!     let system = MapHandler::new([
//!         (oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("edge router")),
//!         (oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("r1")),
//!     ]);
//!
//!     let agent = Agent::builder()
//!         .bind("0.0.0.0:1161")
//!         .handler(Arc::new(system))
//!         .build()
//!         .await?;
//!
//!     agent.run().await
//! }
//! ```

mod map;

pub use map::MapHandler;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::{Error, ErrorStatus, Result};
use crate::message::{Message, Version};
use crate::oid::Oid;
use crate::pdu::{AnyPdu, Pdu, PduType};
use crate::util::{DEFAULT_BUFFER_SIZE, bind_udp_socket, clamp_buffer_size};
use crate::varbind::VarBind;

/// Default time a handler may take for one request.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(5);

/// Information about the request being answered.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Source address of the request.
    pub source: SocketAddr,
    /// Version of the request message.
    pub version: Version,
    /// Community string of the request.
    pub community: Bytes,
    /// Request ID of the PDU.
    pub request_id: i32,
    /// GetRequest, GetNextRequest or SetRequest.
    pub pdu_type: PduType,
}

/// Answers the part of a request it recognizes.
///
/// Each method receives the whole variable binding list of the request and
/// returns only the bindings it claims. Claims for OIDs that were not
/// requested are ignored. The default implementations claim nothing.
pub trait RequestHandler: Send + Sync {
    /// Return a binding for each requested OID this handler knows.
    fn get<'a>(
        &'a self,
        ctx: &'a RequestContext,
        varbinds: &'a [VarBind],
    ) -> BoxFuture<'a, Result<Vec<VarBind>>> {
        let _ = (ctx, varbinds);
        futures::future::ready(Ok(Vec::new())).boxed()
    }

    /// Return `(requested OID, successor binding)` pairs.
    ///
    /// The successor is the first object after the requested OID in this
    /// handler's view.
    fn get_next<'a>(
        &'a self,
        ctx: &'a RequestContext,
        varbinds: &'a [VarBind],
    ) -> BoxFuture<'a, Result<Vec<(Oid, VarBind)>>> {
        let _ = (ctx, varbinds);
        futures::future::ready(Ok(Vec::new())).boxed()
    }

    /// Apply the assignments this handler owns and return the new bindings.
    fn set<'a>(
        &'a self,
        ctx: &'a RequestContext,
        varbinds: &'a [VarBind],
    ) -> BoxFuture<'a, Result<Vec<VarBind>>> {
        let _ = (ctx, varbinds);
        futures::future::ready(Ok(Vec::new())).boxed()
    }
}

/// Builder for [`Agent`].
pub struct AgentBuilder {
    bind_addr: String,
    handlers: Vec<Arc<dyn RequestHandler>>,
    handler_timeout: Duration,
    recv_buffer_size: usize,
    cancel: Option<CancellationToken>,
}

impl AgentBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Bind address: `0.0.0.0:161`
    /// - Handler timeout: 5 seconds
    /// - Receive buffer: 512 bytes
    /// - No handlers (every OID is unclaimed)
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:161".to_string(),
            handlers: Vec::new(),
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
            recv_buffer_size: DEFAULT_BUFFER_SIZE,
            cancel: None,
        }
    }

    /// Set the UDP bind address.
    ///
    /// Binding to port 161 typically requires elevated privileges.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Register a handler. Handlers are consulted in registration order.
    pub fn handler(mut self, handler: Arc<dyn RequestHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Bound each handler call. A handler that takes longer yields genErr.
    pub fn handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    /// Receive buffer size, clamped to 484..=65535.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Set a cancellation token for graceful shutdown.
    ///
    /// If not set, the agent creates its own token accessible via [`Agent::cancel`].
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Bind the socket and build the agent.
    pub async fn build(self) -> Result<Agent> {
        let bind_addr: SocketAddr = self.bind_addr.parse().map_err(|_| {
            Error::Config(format!("invalid bind address: {}", self.bind_addr).into()).boxed()
        })?;
        if self.handler_timeout.is_zero() {
            return Err(Error::Config("handler timeout must be greater than zero".into()).boxed());
        }

        let network = |source| Error::Network {
            target: bind_addr,
            source,
        }
        .boxed();
        let socket = bind_udp_socket(bind_addr).await.map_err(network)?;
        let local_addr = socket.local_addr().map_err(network)?;

        Ok(Agent {
            inner: Arc::new(AgentInner {
                socket,
                local_addr,
                handlers: self.handlers,
                handler_timeout: self.handler_timeout,
                recv_buffer_size: clamp_buffer_size(self.recv_buffer_size),
                cancel: self.cancel.unwrap_or_default(),
            }),
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct AgentInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
    handlers: Vec<Arc<dyn RequestHandler>>,
    handler_timeout: Duration,
    recv_buffer_size: usize,
    cancel: CancellationToken,
}

/// Why a request could not be answered with values.
enum Refusal {
    /// Requested OID with this 1-based index was not claimed.
    Unclaimed(usize),
    /// A handler failed.
    Failed,
}

/// SNMP v1 agent.
///
/// Cloning shares the socket, handlers and cancellation token.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

impl Agent {
    /// Create a builder for configuring the agent.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Get the local address the agent is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Get the cancellation token for this agent.
    ///
    /// Call `token.cancel()` to stop [`run`](Self::run) after the packet in
    /// progress.
    pub fn cancel(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Receive and answer requests until cancelled.
    ///
    /// Packets are handled one at a time. Decode failures, handler failures
    /// and send failures are logged and the loop continues.
    #[instrument(skip(self), err, fields(snmp.local_addr = %self.local_addr()))]
    pub async fn run(&self) -> Result<()> {
        let mut buf = vec![0u8; self.inner.recv_buffer_size];
        tracing::info!(target: "snmp_v1::agent", "agent listening");

        loop {
            let (len, source) = tokio::select! {
                result = self.inner.socket.recv_from(&mut buf) => match result {
                    Ok(received) => received,
                    Err(e) => {
                        tracing::warn!(target: "snmp_v1::agent", { error = %e }, "receive failed");
                        continue;
                    }
                },
                _ = self.inner.cancel.cancelled() => {
                    tracing::info!(target: "snmp_v1::agent", "agent shutdown requested");
                    return Ok(());
                }
            };

            let data = Bytes::copy_from_slice(&buf[..len]);
            tracing::trace!(target: "snmp_v1::agent", { snmp.source = %source, snmp.bytes = len }, "received datagram");

            let request = match Message::decode_from(data, source) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(target: "snmp_v1::agent", { snmp.source = %source, error = %e }, "dropping undecodable datagram");
                    continue;
                }
            };

            if let Some(response) = self.respond(&request, source).await {
                let bytes = response.encode();
                if let Err(e) = self.inner.socket.send_to(&bytes, source).await {
                    tracing::warn!(target: "snmp_v1::agent", { snmp.source = %source, error = %e }, "failed to send response");
                }
            }
        }
    }

    /// Build the response to one decoded request.
    ///
    /// Returns `None` for PDU types the agent does not answer.
    pub async fn respond(&self, request: &Message, source: SocketAddr) -> Option<Message> {
        let AnyPdu::Standard(pdu) = &request.pdu else {
            tracing::debug!(target: "snmp_v1::agent", { snmp.source = %source, snmp.pdu_type = %request.pdu.pdu_type() }, "ignoring PDU");
            return None;
        };
        if !matches!(
            pdu.pdu_type,
            PduType::GetRequest | PduType::GetNextRequest | PduType::SetRequest
        ) {
            tracing::debug!(target: "snmp_v1::agent", { snmp.source = %source, snmp.pdu_type = %pdu.pdu_type }, "ignoring PDU");
            return None;
        }

        let ctx = RequestContext {
            source,
            version: request.version,
            community: request.community.clone(),
            request_id: pdu.request_id,
            pdu_type: pdu.pdu_type,
        };

        let response = match self.dispatch(&ctx, &pdu.varbinds).await {
            Ok(varbinds) => Pdu {
                varbinds,
                ..pdu.to_response()
            },
            Err(Refusal::Unclaimed(index)) => {
                tracing::debug!(
                    target: "snmp_v1::agent",
                    { snmp.source = %source, snmp.request_id = pdu.request_id, snmp.error_index = index },
                    "requested OID not claimed by any handler"
                );
                pdu.to_error_response(ErrorStatus::NoSuchName, index as i32)
            }
            Err(Refusal::Failed) => pdu.to_error_response(ErrorStatus::GenErr, 0),
        };

        Some(Message::new(request.version, request.community.clone(), response))
    }

    /// Collect claims from every handler and order them like the request.
    async fn dispatch(
        &self,
        ctx: &RequestContext,
        requested: &[VarBind],
    ) -> std::result::Result<Vec<VarBind>, Refusal> {
        let mut claims: HashMap<Oid, VarBind> = HashMap::with_capacity(requested.len());

        for handler in &self.inner.handlers {
            let offered: Vec<(Oid, VarBind)> = match ctx.pdu_type {
                PduType::GetNextRequest => self.guarded(ctx, || handler.get_next(ctx, requested)).await?,
                PduType::SetRequest => self
                    .guarded(ctx, || handler.set(ctx, requested))
                    .await?
                    .into_iter()
                    .map(|vb| (vb.oid.clone(), vb))
                    .collect(),
                _ => self
                    .guarded(ctx, || handler.get(ctx, requested))
                    .await?
                    .into_iter()
                    .map(|vb| (vb.oid.clone(), vb))
                    .collect(),
            };

            for (queried, vb) in offered {
                if requested.iter().any(|r| r.oid == queried) {
                    claims.entry(queried).or_insert(vb);
                }
            }
        }

        requested
            .iter()
            .enumerate()
            .map(|(i, vb)| claims.get(&vb.oid).cloned().ok_or(Refusal::Unclaimed(i + 1)))
            .collect()
    }

    /// Run one handler call with the timeout and panic isolation applied.
    ///
    /// The handler method itself is invoked inside the guarded future, so a
    /// handler that panics before returning its future is contained too.
    async fn guarded<'a, T>(
        &self,
        ctx: &RequestContext,
        call: impl FnOnce() -> BoxFuture<'a, Result<T>>,
    ) -> std::result::Result<T, Refusal> {
        let outcome = tokio::time::timeout(
            self.inner.handler_timeout,
            AssertUnwindSafe(async move { call().await }).catch_unwind(),
        )
        .await;

        match outcome {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(e))) => {
                tracing::warn!(
                    target: "snmp_v1::agent",
                    { snmp.source = %ctx.source, snmp.request_id = ctx.request_id, error = %e },
                    "handler returned an error"
                );
                Err(Refusal::Failed)
            }
            Ok(Err(_)) => {
                tracing::warn!(
                    target: "snmp_v1::agent",
                    { snmp.source = %ctx.source, snmp.request_id = ctx.request_id },
                    "handler panicked"
                );
                Err(Refusal::Failed)
            }
            Err(_) => {
                tracing::warn!(
                    target: "snmp_v1::agent",
                    {
                        snmp.source = %ctx.source,
                        snmp.request_id = ctx.request_id,
                        timeout_ms = self.inner.handler_timeout.as_millis() as u64
                    },
                    "handler timed out"
                );
                Err(Refusal::Failed)
            }
        }
    }
}
