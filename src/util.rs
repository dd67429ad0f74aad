//! Socket and buffer helpers shared by the client, agent and trap receiver.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use crate::error::{Error, Result};

/// Smallest receive buffer allowed (RFC 1157 Section 4: 484 octets).
pub const MIN_BUFFER_SIZE: usize = 484;

/// Receive buffer used when none is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 512;

/// Largest UDP payload.
pub const MAX_BUFFER_SIZE: usize = 65535;

/// Clamp a requested receive buffer size into the supported range.
///
/// ```
/// use snmp_v1::util::clamp_buffer_size;
///
/// assert_eq!(clamp_buffer_size(100), 484);
/// assert_eq!(clamp_buffer_size(1500), 1500);
/// assert_eq!(clamp_buffer_size(1 << 20), 65535);
/// ```
pub fn clamp_buffer_size(requested: usize) -> usize {
    requested.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE)
}

/// Create and bind a UDP socket.
///
/// For IPv6 sockets, sets `IPV6_V6ONLY` so the socket does not accept
/// IPv4-mapped addresses.
pub(crate) async fn bind_udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }

    // Allow address reuse for quick restarts
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;

    UdpSocket::from_std(socket.into())
}

/// Bind an ephemeral UDP socket in the same address family as `target`.
pub(crate) async fn bind_ephemeral_udp_socket(target: SocketAddr) -> io::Result<UdpSocket> {
    let bind_addr = if target.is_ipv6() {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    };

    bind_udp_socket(bind_addr).await
}

/// Resolve `host:port` to the first address returned.
pub(crate) async fn resolve_target(host: &str, port: u16) -> Result<SocketAddr> {
    let unresolved = || {
        Error::Resolve {
            target: format!("{}:{}", host, port).into(),
        }
        .boxed()
    };
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| unresolved())?;
    addrs.next().ok_or_else(unresolved)
}
