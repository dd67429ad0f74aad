//! Trap receiver.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::{Trap, TrapKind, TrapListener};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::pdu::AnyPdu;
use crate::util::{DEFAULT_BUFFER_SIZE, bind_udp_socket, clamp_buffer_size};

/// Builder for [`TrapReceiver`].
pub struct TrapReceiverBuilder {
    bind_addr: String,
    recv_buffer_size: usize,
    listeners: HashMap<TrapKind, Vec<Arc<dyn TrapListener>>>,
    cancel: Option<CancellationToken>,
}

impl TrapReceiverBuilder {
    /// Create a new builder.
    ///
    /// Defaults:
    /// - Bind address: `0.0.0.0:162`
    /// - Receive buffer: 512 bytes
    /// - No listeners
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:162".to_string(),
            recv_buffer_size: DEFAULT_BUFFER_SIZE,
            listeners: HashMap::new(),
            cancel: None,
        }
    }

    /// Set the UDP bind address.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Receive buffer size, clamped to 484..=65535.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Register a listener for one kind of notification.
    ///
    /// Listeners of a kind are called in registration order.
    pub fn listener(mut self, kind: TrapKind, listener: Arc<dyn TrapListener>) -> Self {
        self.listeners.entry(kind).or_default().push(listener);
        self
    }

    /// Set a cancellation token for graceful shutdown.
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Bind the socket and build the receiver.
    pub async fn build(self) -> Result<TrapReceiver> {
        let bind_addr: SocketAddr = self.bind_addr.parse().map_err(|_| {
            Error::Config(format!("invalid bind address: {}", self.bind_addr).into()).boxed()
        })?;

        let network = |source| Error::Network {
            target: bind_addr,
            source,
        }
        .boxed();
        let socket = bind_udp_socket(bind_addr).await.map_err(network)?;
        let local_addr = socket.local_addr().map_err(network)?;

        Ok(TrapReceiver {
            inner: Arc::new(ReceiverInner {
                socket,
                local_addr,
                listeners: self.listeners,
                recv_buffer_size: clamp_buffer_size(self.recv_buffer_size),
                cancel: self.cancel.unwrap_or_default(),
            }),
        })
    }
}

impl Default for TrapReceiverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct ReceiverInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
    listeners: HashMap<TrapKind, Vec<Arc<dyn TrapListener>>>,
    recv_buffer_size: usize,
    cancel: CancellationToken,
}

/// Listens for v1 traps, v2 traps and informs.
///
/// Use [`run`](Self::run) to push notifications to registered listeners, or
/// [`recv`](Self::recv) to pull them one at a time. Informs are acknowledged
/// either way.
#[derive(Clone)]
pub struct TrapReceiver {
    inner: Arc<ReceiverInner>,
}

impl TrapReceiver {
    /// Create a builder.
    pub fn builder() -> TrapReceiverBuilder {
        TrapReceiverBuilder::new()
    }

    /// Local address the receiver is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Cancellation token stopping [`run`](Self::run).
    pub fn cancel(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Receive and dispatch notifications until cancelled.
    ///
    /// Receive errors, undecodable datagrams and listener failures are logged
    /// and the loop continues.
    #[instrument(skip(self), err, fields(snmp.local_addr = %self.local_addr()))]
    pub async fn run(&self) -> Result<()> {
        let mut buf = vec![0u8; self.inner.recv_buffer_size];
        tracing::info!(target: "snmp_v1::trap", "trap receiver listening");

        loop {
            let received = tokio::select! {
                result = self.inner.socket.recv_from(&mut buf) => result,
                _ = self.inner.cancel.cancelled() => {
                    tracing::info!(target: "snmp_v1::trap", "trap receiver shutdown requested");
                    return Ok(());
                }
            };
            match received {
                Ok((len, source)) => {
                    if let Some(trap) = self.accept(&buf[..len], source).await {
                        self.dispatch(&trap);
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "snmp_v1::trap", { error = %e }, "receive failed");
                }
            }
        }
    }

    /// Wait for the next notification without dispatching it.
    ///
    /// Datagrams that are not notifications are skipped.
    pub async fn recv(&self) -> Result<Trap> {
        let mut buf = vec![0u8; self.inner.recv_buffer_size];
        loop {
            let (len, source) = self
                .inner
                .socket
                .recv_from(&mut buf)
                .await
                .map_err(|source| {
                    Error::Network {
                        target: self.local_addr(),
                        source,
                    }
                    .boxed()
                })?;
            if let Some(trap) = self.accept(&buf[..len], source).await {
                return Ok(trap);
            }
        }
    }

    /// Decode one datagram and acknowledge it if it is an inform.
    async fn accept(&self, data: &[u8], source: SocketAddr) -> Option<Trap> {
        tracing::trace!(target: "snmp_v1::trap", { snmp.source = %source, snmp.bytes = data.len() }, "received datagram");

        let message = match Message::decode_from(Bytes::copy_from_slice(data), source) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(target: "snmp_v1::trap", { snmp.source = %source, error = %e }, "dropping undecodable datagram");
                return None;
            }
        };

        let pdu_type = message.pdu.pdu_type();
        let Some(trap) = Trap::from_message(message, source) else {
            tracing::debug!(target: "snmp_v1::trap", { snmp.source = %source, snmp.pdu_type = ?pdu_type }, "ignoring non-notification PDU");
            return None;
        };

        if trap.kind == TrapKind::Inform {
            self.acknowledge(&trap).await;
        }
        Some(trap)
    }

    async fn acknowledge(&self, inform: &Trap) {
        let AnyPdu::Standard(pdu) = &inform.pdu else {
            return;
        };
        let ack = Message::new(inform.version, inform.community.clone(), pdu.to_response());
        if let Err(e) = self.inner.socket.send_to(&ack.encode(), inform.source).await {
            tracing::warn!(
                target: "snmp_v1::trap",
                { snmp.source = %inform.source, snmp.request_id = pdu.request_id, error = %e },
                "failed to acknowledge inform"
            );
        }
    }

    fn dispatch(&self, trap: &Trap) {
        let Some(listeners) = self.inner.listeners.get(&trap.kind) else {
            tracing::debug!(target: "snmp_v1::trap", { snmp.source = %trap.source, snmp.kind = ?trap.kind }, "no listener registered");
            return;
        };
        for listener in listeners {
            match std::panic::catch_unwind(AssertUnwindSafe(|| listener.on_trap(trap))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(target: "snmp_v1::trap", { snmp.source = %trap.source, error = %e }, "trap listener failed");
                }
                Err(_) => {
                    tracing::warn!(target: "snmp_v1::trap", { snmp.source = %trap.source }, "trap listener panicked");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Version;
    use crate::oid;
    use crate::pdu::{GenericTrap, Pdu, PduType, TrapV1Pdu};
    use std::sync::Mutex;
    use std::time::Duration;

    async fn receiver(builder: TrapReceiverBuilder) -> TrapReceiver {
        builder.bind("127.0.0.1:0").build().await.unwrap()
    }

    async fn client() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_recv_v1_trap() {
        let receiver = receiver(TrapReceiver::builder()).await;
        let sock = client().await;
        let pdu = TrapV1Pdu::new(oid!(1, 3, 6, 1, 4, 1, 9), [127, 0, 0, 1], GenericTrap::ColdStart, 0, 42, vec![]);
        sock.send_to(&Message::v1("public", pdu).encode(), receiver.local_addr())
            .await
            .unwrap();

        let trap = tokio::time::timeout(Duration::from_secs(2), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(trap.kind, TrapKind::V1);
        assert_eq!(trap.uptime(), Some(42));
        assert_eq!(trap.source, sock.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_inform_is_acknowledged() {
        let receiver = receiver(TrapReceiver::builder()).await;
        let sock = client().await;
        let mut inform = Pdu::trap_v2(31, 5, oid!(1, 3, 6, 1, 4, 1, 9, 0, 1), vec![]);
        inform.pdu_type = PduType::InformRequest;
        sock.send_to(&Message::new(Version::V2c, "public", inform.clone()).encode(), receiver.local_addr())
            .await
            .unwrap();

        let trap = tokio::time::timeout(Duration::from_secs(2), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(trap.kind, TrapKind::Inform);

        let mut buf = [0u8; 1500];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), sock.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let ack = Message::decode(Bytes::copy_from_slice(&buf[..len])).unwrap();
        let ack = ack.into_standard_pdu().unwrap();
        assert_eq!(ack.pdu_type, PduType::Response);
        assert_eq!(ack.request_id, 31);
        assert_eq!(ack.varbinds, inform.varbinds);
    }

    #[tokio::test]
    async fn test_run_dispatches_by_kind() {
        let seen: Arc<Mutex<Vec<TrapKind>>> = Arc::default();
        let v2_seen = seen.clone();
        let receiver = receiver(
            TrapReceiver::builder()
                .listener(
                    TrapKind::V2,
                    Arc::new(move |trap: &Trap| {
                        v2_seen.lock().unwrap().push(trap.kind);
                        Ok(())
                    }),
                )
                .listener(TrapKind::V1, Arc::new(|_: &Trap| -> Result<()> { panic!("v1 listener") })),
        )
        .await;
        let task = {
            let receiver = receiver.clone();
            tokio::spawn(async move { receiver.run().await })
        };

        let sock = client().await;
        let v1 = TrapV1Pdu::new(oid!(1, 3, 6, 1, 4, 1, 9), [127, 0, 0, 1], GenericTrap::WarmStart, 0, 1, vec![]);
        sock.send_to(&Message::v1("public", v1).encode(), receiver.local_addr())
            .await
            .unwrap();
        sock.send_to(b"garbage", receiver.local_addr()).await.unwrap();
        let v2 = Pdu::trap_v2(1, 1, oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 1), vec![]);
        sock.send_to(&Message::new(Version::V2c, "public", v2).encode(), receiver.local_addr())
            .await
            .unwrap();

        for _ in 0..100 {
            if !seen.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        receiver.cancel().cancel();
        task.await.unwrap().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![TrapKind::V2]);
    }
}
