//! Transport layer abstraction.
//!
//! Provides the `Transport` trait used by the [`Communicator`](crate::Communicator),
//! a connected UDP implementation and, behind the `testing` feature, a
//! programmable mock.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Client-side transport abstraction.
///
/// A transport carries whole datagrams to and from one peer. It does no
/// request correlation of its own: the communicator decodes each datagram
/// and discards the ones whose request ID does not match.
///
/// # Clone Requirement
///
/// Implementations share their socket through an `Arc`, so cloning is a
/// reference count increment.
pub trait Transport: Send + Sync + Clone {
    /// Send one datagram to the peer.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive one datagram, waiting at most `timeout`.
    ///
    /// `request_id` is the ID the caller is waiting for; it is only used
    /// in the timeout error and in logs.
    ///
    /// Returns (datagram, source address).
    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// The peer address for this transport.
    fn peer_addr(&self) -> SocketAddr;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;
}
