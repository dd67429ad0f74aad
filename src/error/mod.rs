//! Error types for snmp-v1.
//!
//! This module provides:
//!
//! - [`Error`] - The main error type, one variant per failure family
//! - [`ErrorStatus`] - SNMP protocol errors returned by agents (RFC 1157 / RFC 3416)
//! - [`DecodeErrorKind`] - The structural expectation a malformed packet violated
//!
//! # Error Handling
//!
//! Errors are boxed for efficiency: `Result<T> = Result<T, Box<Error>>`.
//!
//! ```rust
//! use snmp_v1::{Error, Result};
//!
//! fn handle_error(result: Result<()>) {
//!     match result {
//!         Ok(()) => println!("Success"),
//!         Err(e) => match &*e {
//!             Error::Timeout { target, .. } => {
//!                 println!("{} did not answer", target);
//!             }
//!             Error::Get { index, message, .. } => {
//!                 println!("varbind {} failed: {}", index, message);
//!             }
//!             _ => println!("Error: {}", e),
//!         }
//!     }
//! }
//! ```

use std::net::SocketAddr;
use std::time::Duration;

/// Result type alias using the library's boxed Error type.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Structural problem found while decoding BER data.
///
/// The `Display` text is the message surfaced to callers, so slot names
/// match the field names used on the wire ("bad error status", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Expected a different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data ended before a complete TLV was read.
    TruncatedData,
    /// Long-form length with zero length octets.
    InvalidLength,
    /// Indefinite length (0x80) is not used by SNMP.
    IndefiniteLength,
    /// Length field uses more than four octets.
    LengthTooLong { octets: usize },
    /// INTEGER with no content octets.
    ZeroLengthInteger,
    /// Unsigned value does not fit its application type.
    IntegerOverflow { length: usize },
    /// Malformed OID subidentifier.
    InvalidOidEncoding,
    /// OID with more arcs than allowed.
    OidTooLong { count: usize, max: usize },
    /// Constructed values nested deeper than the decoder allows.
    NestingTooDeep { max: usize },
    /// NULL with content.
    InvalidNull,
    /// Fixed-width address with the wrong number of octets.
    InvalidAddressLength { expected: usize, actual: usize },
    /// A fixed-shape sequence had the wrong number of elements.
    WrongElementCount {
        shape: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A slot of a fixed-shape sequence held the wrong type.
    BadSlot(&'static str),
    /// An element of a variable binding list was not an (OID, value) pair.
    BadVariableBinding { index: usize },
    /// Message version is not one this crate speaks.
    UnknownVersion(i32),
    /// Tag is not a PDU tag where a PDU was required.
    NotAPdu(u8),
    /// Bytes left over after the outermost TLV.
    TrailingData { remaining: usize },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::InvalidLength => write!(f, "invalid length encoding"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::IntegerOverflow { length } => {
                write!(f, "unsigned value of {} octets out of range", length)
            }
            Self::InvalidOidEncoding => write!(f, "invalid OID encoding"),
            Self::OidTooLong { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
            Self::NestingTooDeep { max } => {
                write!(f, "constructed values nested deeper than {}", max)
            }
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidAddressLength { expected, actual } => {
                write!(f, "address must be {} bytes, got {}", expected, actual)
            }
            Self::WrongElementCount {
                shape,
                expected,
                actual,
            } => write!(
                f,
                "expected {} elements in {}, found {}",
                expected, shape, actual
            ),
            Self::BadSlot(slot) => write!(f, "bad {}", slot),
            Self::BadVariableBinding { index } => {
                write!(f, "bad variable binding at index {}", index)
            }
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::NotAPdu(t) => write!(f, "tag 0x{:02X} is not a PDU", t),
            Self::TrailingData { remaining } => {
                write!(f, "{} trailing bytes after message", remaining)
            }
        }
    }
}

/// The main error type for all snmp-v1 operations.
///
/// Errors are boxed (via [`Result`]) to keep the size small on the stack.
///
/// # Common Patterns
///
/// ```
/// use snmp_v1::{Error, ErrorStatus};
///
/// fn is_transport(error: &Error) -> bool {
///     matches!(error, Error::Timeout { .. } | Error::Network { .. } | Error::Resolve { .. })
/// }
///
/// fn is_refusal(error: &Error) -> bool {
///     matches!(error,
///         Error::Get { status: ErrorStatus::NoSuchName, .. } |
///         Error::Set { status: ErrorStatus::ReadOnly, .. }
///     )
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Network failure (connection refused, unreachable, etc.)
    #[error("network error communicating with {target}: {source}")]
    Network {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// No response arrived before the configured timeout.
    #[error("timeout after {elapsed:?} waiting for {target} (request_id={request_id})")]
    Timeout {
        target: SocketAddr,
        elapsed: Duration,
        request_id: i32,
    },

    /// Host name could not be resolved to an address.
    #[error("unable to resolve address {target}")]
    Resolve { target: Box<str> },

    /// Wire bytes do not match the expected TLV/sequence/PDU shape.
    #[error("bad value at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// A value could not be built from the supplied input.
    #[error("bad value: {0}")]
    BadValue(Box<str>),

    /// GetRequest/GetNextRequest refused by the agent, or its answer failed validation.
    #[error("get error from {target}: {message} ({status} at index {index})")]
    Get {
        target: SocketAddr,
        status: ErrorStatus,
        index: u32,
        message: Box<str>,
    },

    /// SetRequest refused by the agent, or rejected before sending.
    #[error("set error for {target}: {message} ({status} at index {index})")]
    Set {
        target: SocketAddr,
        status: ErrorStatus,
        index: u32,
        message: Box<str>,
    },

    /// Row-wise table walk found columns that stopped advancing together.
    #[error("incomplete row from {target} at column {index}: {message}")]
    IncompleteRow {
        target: SocketAddr,
        index: u32,
        message: Box<str>,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(Box<str>),

    /// Invalid OID format.
    #[error("invalid OID: {0}")]
    InvalidOid(Box<str>),
}

impl Error {
    /// Box this error (convenience for constructing boxed errors).
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Create a boxed decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Box<Self> {
        Box::new(Self::Decode { offset, kind })
    }

    /// Create a boxed bad-value error.
    pub fn bad_value(message: impl Into<Box<str>>) -> Box<Self> {
        Box::new(Self::BadValue(message.into()))
    }

    /// The 1-based variable binding index for protocol errors, if any.
    pub fn index(&self) -> Option<u32> {
        match self {
            Self::Get { index, .. } | Self::Set { index, .. } | Self::IncompleteRow { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// The error status for protocol errors, if any.
    pub fn status(&self) -> Option<ErrorStatus> {
        match self {
            Self::Get { status, .. } | Self::Set { status, .. } => Some(*status),
            Self::IncompleteRow { .. } => Some(ErrorStatus::GenErr),
            _ => None,
        }
    }
}

/// SNMP protocol error status codes (RFC 1157, extended by RFC 3416).
///
/// SNMPv1 agents only ever send codes 0-5. The v2 codes are modelled so that
/// a v1 manager talking to a bilingual agent can still report them.
///
/// # Example
///
/// ```
/// use snmp_v1::ErrorStatus;
///
/// let status = ErrorStatus::from_i32(2);
/// assert_eq!(status, ErrorStatus::NoSuchName);
/// assert_eq!(status.as_i32(), 2);
/// assert_eq!(status.to_string(), "noSuchName");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    /// Operation completed successfully (status = 0).
    NoError,
    /// Response message would be too large for transport (status = 1).
    TooBig,
    /// Requested OID not available (status = 2).
    NoSuchName,
    /// Invalid value provided in SET request (status = 3).
    BadValue,
    /// Attempted to SET a read-only object (status = 4).
    ReadOnly,
    /// Unspecified error occurred (status = 5).
    GenErr,
    /// Object exists but access is denied (status = 6).
    NoAccess,
    /// SET value has wrong ASN.1 type (status = 7).
    WrongType,
    /// SET value has incorrect length (status = 8).
    WrongLength,
    /// SET value uses wrong encoding (status = 9).
    WrongEncoding,
    /// SET value is out of range or otherwise invalid (status = 10).
    WrongValue,
    /// Object does not support row creation (status = 11).
    NoCreation,
    /// Value is inconsistent with other managed objects (status = 12).
    InconsistentValue,
    /// Resource required for SET is unavailable (status = 13).
    ResourceUnavailable,
    /// SET commit phase failed (status = 14).
    CommitFailed,
    /// SET undo phase failed (status = 15).
    UndoFailed,
    /// Access denied (status = 16).
    AuthorizationError,
    /// Object does not support modification (status = 17).
    NotWritable,
    /// Named object cannot be created (status = 18).
    InconsistentName,
    /// Unknown or future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => {
                tracing::warn!(target: "snmp_v1::error", { snmp.error_status = other }, "unknown SNMP error status");
                Self::Unknown(other)
            }
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}
