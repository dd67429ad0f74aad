//! Mock transport for testing.
//!
//! Provides a programmable transport that can simulate agents, lost
//! datagrams and stale responses without a network.

use super::Transport;
use crate::error::{Error, ErrorStatus, Result};
use crate::message::Message;
use crate::oid::Oid;
use crate::pdu::{AnyPdu, Pdu, PduType};
use crate::value::Value;
use crate::varbind::VarBind;
use bytes::Bytes;
use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A mock response to return for a request.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return this data as the response (request_id will be patched to match)
    Data(Bytes),
    /// Return this data as-is without patching request_id
    RawData(Bytes),
    /// Simulate a timeout
    Timeout,
    /// Simulate an IO error
    IoError(String),
}

/// A recorded request sent through the mock transport.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// The raw request data
    pub data: Bytes,
    /// The decoded message, if the data was a valid SNMP message
    pub message: Option<Message>,
}

impl RecordedRequest {
    /// Request ID of the recorded message.
    pub fn request_id(&self) -> Option<i32> {
        self.message.as_ref().and_then(|m| m.pdu.request_id())
    }
}

/// Scripted agent: maps a decoded request to its response.
///
/// Returning `None` simulates a lost datagram.
pub type Responder = Arc<dyn Fn(&Message) -> Option<Message> + Send + Sync>;

struct MockTransportInner {
    target: SocketAddr,
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
    default_response: Option<MockResponse>,
    responder: Option<Responder>,
}

/// Mock transport for testing SNMP client functionality.
///
/// Responses are taken, in order, from the queue, then from the scripted
/// responder, then from the default response. With none of them available
/// `recv` times out immediately.
///
/// # Example
///
/// ```rust
/// use snmp_v1::transport::{MockTransport, ResponseBuilder};
/// use snmp_v1::{Value, oid};
///
/// let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
///
/// mock.queue_response(
///     ResponseBuilder::new(1)
///         .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("router"))
///         .build(b"public"),
/// );
///
/// // Or simulate a lost datagram
/// mock.queue_timeout();
/// assert_eq!(mock.queued_response_count(), 2);
/// ```
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new(target: SocketAddr) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                target,
                responses: VecDeque::new(),
                requests: Vec::new(),
                default_response: None,
                responder: None,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a data response.
    ///
    /// The request_id in the response will be automatically patched to match
    /// the last request sent. Use [`queue_raw_response`](Self::queue_raw_response)
    /// to bypass patching for testing stale responses.
    pub fn queue_response(&self, data: impl Into<Bytes>) {
        self.state().responses.push_back(MockResponse::Data(data.into()));
    }

    /// Queue a raw data response without request_id patching.
    pub fn queue_raw_response(&self, data: impl Into<Bytes>) {
        self.state()
            .responses
            .push_back(MockResponse::RawData(data.into()));
    }

    /// Queue a timeout.
    pub fn queue_timeout(&self) {
        self.state().responses.push_back(MockResponse::Timeout);
    }

    /// Queue an IO error.
    pub fn queue_io_error(&self, msg: impl Into<String>) {
        self.state()
            .responses
            .push_back(MockResponse::IoError(msg.into()));
    }

    /// Set a default response when the queue is empty.
    pub fn set_default_response(&self, response: MockResponse) {
        self.state().default_response = Some(response);
    }

    /// Answer requests with a closure once the queue is empty.
    ///
    /// The closure sees the last request sent. The request ID of its answer
    /// is patched like a queued [`MockResponse::Data`].
    pub fn set_responder<F>(&self, responder: F)
    where
        F: Fn(&Message) -> Option<Message> + Send + Sync + 'static,
    {
        self.state().responder = Some(Arc::new(responder));
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Number of datagrams sent so far.
    pub fn sent_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Clear recorded requests.
    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    /// Get the number of queued responses remaining.
    pub fn queued_response_count(&self) -> usize {
        self.state().responses.len()
    }

    /// Rewrite the request ID of a four-slot PDU response.
    ///
    /// Data that does not decode, and v1 traps, are returned unchanged.
    fn patch_response_request_id(data: Bytes, new_id: i32) -> Bytes {
        let Ok(mut msg) = Message::decode(data.clone()) else {
            return data;
        };
        match &mut msg.pdu {
            AnyPdu::Standard(pdu) => pdu.request_id = new_id,
            AnyPdu::GetBulk(pdu) => pdu.request_id = new_id,
            AnyPdu::TrapV1(_) => return data,
        }
        msg.encode()
    }

    fn next_response(&self) -> Option<MockResponse> {
        let mut state = self.state();
        if let Some(response) = state.responses.pop_front() {
            return Some(response);
        }
        if let Some(responder) = state.responder.clone() {
            let last = state.requests.last().and_then(|r| r.message.clone());
            drop(state);
            return Some(match last.as_ref().and_then(|m| responder(m)) {
                Some(reply) => MockResponse::Data(reply.encode()),
                None => MockResponse::Timeout,
            });
        }
        state.default_response.clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        let data = Bytes::copy_from_slice(data);
        let message = Message::decode(data.clone()).ok();
        self.state().requests.push(RecordedRequest { data, message });
        async { Ok(()) }
    }

    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send {
        let response = self.next_response();
        let (target, last_request_id) = {
            let state = self.state();
            (
                state.target,
                state.requests.last().and_then(RecordedRequest::request_id),
            )
        };

        async move {
            match response {
                Some(MockResponse::Data(data)) => {
                    let patched = match last_request_id {
                        Some(id) => Self::patch_response_request_id(data, id),
                        None => data,
                    };
                    Ok((patched, target))
                }
                Some(MockResponse::RawData(data)) => Ok((data, target)),
                Some(MockResponse::IoError(msg)) => Err(Error::Network {
                    target,
                    source: std::io::Error::other(msg),
                }
                .boxed()),
                Some(MockResponse::Timeout) | None => Err(Error::Timeout {
                    target,
                    elapsed: timeout,
                    request_id,
                }
                .boxed()),
            }
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.state().target
    }

    fn local_addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }
}

/// Builder for creating SNMP response messages for testing.
///
/// This helps construct valid response bytes without manually crafting
/// BER encoding.
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<VarBind>,
    error_status: ErrorStatus,
    error_index: i32,
}

impl ResponseBuilder {
    /// Create a new response builder with the given request ID.
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            error_status: ErrorStatus::NoError,
            error_index: 0,
        }
    }

    /// Add a varbind to the response.
    pub fn varbind(mut self, oid: Oid, value: impl Into<Value>) -> Self {
        self.varbinds.push(VarBind::new(oid, value.into()));
        self
    }

    /// Set the error status.
    pub fn error_status(mut self, status: ErrorStatus) -> Self {
        self.error_status = status;
        self
    }

    /// Set the error index.
    pub fn error_index(mut self, index: i32) -> Self {
        self.error_index = index;
        self
    }

    /// Build the response PDU.
    pub fn pdu(self) -> Pdu {
        Pdu {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: self.error_status.as_i32(),
            error_index: self.error_index,
            varbinds: self.varbinds,
        }
    }

    /// Build a v1 response message.
    pub fn message(self, community: &[u8]) -> Message {
        Message::v1(Bytes::copy_from_slice(community), self.pdu())
    }

    /// Build an encoded v1 response message.
    pub fn build(self, community: &[u8]) -> Bytes {
        self.message(community).encode()
    }
}
