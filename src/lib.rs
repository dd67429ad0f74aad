//! # snmp-v1
//!
//! Async SNMPv1 protocol stack for Rust.
//!
//! ## Features
//!
//! - BER codec for every SNMPv1 type, plus the v2 types an agent may send back
//! - Sequential communicator with Get, GetNext, Set and table walks
//! - Agent that dispatches requests to pluggable handlers
//! - Trap sender and receiver, including v2 traps and informs
//! - Async-first API built on Tokio
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snmp_v1::{ClientConfig, Communicator, oid};
//!
//! #[tokio::main]
//! async fn main() -> snmp_v1::Result<()> {
//!     let client = Communicator::connect("192.168.1.1", 161, ClientConfig::default()).await?;
//!
//!     let sys_descr = client.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await?;
//!     println!("sysDescr: {}", sys_descr.value);
//!
//!     for vb in client.retrieve_table(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2)).await? {
//!         println!("{} = {}", vb.oid, vb.value);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod ber;
pub mod client;
pub mod error;
pub mod format;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod request_id;
pub mod resolve;
pub mod sequence;
pub mod transport;
pub mod trap;
pub mod util;
pub mod value;
pub mod varbind;

#[cfg(feature = "cli")]
pub mod cli;

// Re-exports for convenience
pub use agent::{Agent, AgentBuilder, MapHandler, RequestContext, RequestHandler};
pub use client::{ClientConfig, Communicator};
pub use error::{DecodeErrorKind, Error, ErrorStatus, Result};
pub use message::{Message, Version};
pub use oid::Oid;
pub use pdu::{AnyPdu, GenericTrap, GetBulkPdu, Pdu, PduType, TrapV1Pdu};
pub use request_id::RequestIdGenerator;
pub use transport::{Transport, UdpTransport};
pub use trap::{Trap, TrapKind, TrapListener, TrapReceiver, TrapReceiverBuilder, TrapSender};
pub use value::{Input, Value, ValueKind};
pub use varbind::VarBind;

/// Test doubles exposed via the `testing` feature.
#[cfg(feature = "testing")]
pub mod testing {
    pub use crate::transport::{MockResponse, MockTransport, RecordedRequest, ResponseBuilder};
}
