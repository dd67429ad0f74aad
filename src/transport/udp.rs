//! UDP transport implementation.

use super::Transport;
use crate::error::{Error, Result};
use crate::util::{DEFAULT_BUFFER_SIZE, bind_ephemeral_udp_socket, clamp_buffer_size};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// UDP transport for a single target.
///
/// Each `UdpTransport` owns a connected UDP socket, so datagrams from any
/// other source are filtered out by the kernel.
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    socket: UdpSocket,
    target: SocketAddr,
    local_addr: SocketAddr,
    recv_buffer_size: usize,
}

impl UdpTransport {
    /// Connect to a target address with the default 512 byte receive buffer.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        Self::connect_with_buffer(target, DEFAULT_BUFFER_SIZE).await
    }

    /// Connect to a target address.
    ///
    /// Creates an ephemeral UDP socket bound to the appropriate address family.
    /// `recv_buffer_size` is clamped to 484..=65535; datagrams longer than the
    /// buffer are truncated by the socket and then fail to decode.
    pub async fn connect_with_buffer(target: SocketAddr, recv_buffer_size: usize) -> Result<Self> {
        tracing::debug!(target: "snmp_v1::transport", { snmp.target = %target }, "connecting UDP transport");

        let network = |source| Error::Network { target, source }.boxed();

        let socket = bind_ephemeral_udp_socket(target).await.map_err(network)?;
        socket.connect(target).await.map_err(network)?;
        let local_addr = socket.local_addr().map_err(network)?;

        tracing::debug!(
            target: "snmp_v1::transport",
            { snmp.target = %target, snmp.local_addr = %local_addr },
            "UDP transport connected"
        );

        Ok(Self {
            inner: Arc::new(UdpTransportInner {
                socket,
                target,
                local_addr,
                recv_buffer_size: clamp_buffer_size(recv_buffer_size),
            }),
        })
    }

    /// Receive buffer size in use after clamping.
    pub fn recv_buffer_size(&self) -> usize {
        self.inner.recv_buffer_size
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        tracing::trace!(
            target: "snmp_v1::transport",
            { snmp.target = %self.inner.target, snmp.bytes = data.len() },
            "UDP send"
        );
        self.inner.socket.send(data).await.map_err(|source| {
            Error::Network {
                target: self.inner.target,
                source,
            }
            .boxed()
        })?;
        Ok(())
    }

    async fn recv(&self, request_id: i32, recv_timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        tracing::trace!(
            target: "snmp_v1::transport",
            {
                snmp.target = %self.inner.target,
                snmp.request_id = request_id,
                snmp.timeout_ms = recv_timeout.as_millis() as u64
            },
            "UDP recv waiting"
        );

        let mut buf = vec![0u8; self.inner.recv_buffer_size];

        match timeout(recv_timeout, self.inner.socket.recv(&mut buf)).await {
            Ok(Ok(len)) => {
                buf.truncate(len);
                tracing::trace!(
                    target: "snmp_v1::transport",
                    { snmp.target = %self.inner.target, snmp.bytes = len },
                    "UDP recv complete"
                );
                Ok((Bytes::from(buf), self.inner.target))
            }
            Ok(Err(source)) => {
                tracing::trace!(
                    target: "snmp_v1::transport",
                    { snmp.target = %self.inner.target, error = %source },
                    "UDP recv error"
                );
                Err(Error::Network {
                    target: self.inner.target,
                    source,
                }
                .boxed())
            }
            Err(_) => {
                tracing::trace!(
                    target: "snmp_v1::transport",
                    { snmp.target = %self.inner.target, snmp.request_id = request_id },
                    "UDP recv timeout"
                );
                Err(Error::Timeout {
                    target: self.inner.target,
                    elapsed: recv_timeout,
                    request_id,
                }
                .boxed())
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.inner.target
    }

    fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }
}
