//! Command-line argument structures for the snmp-v1 CLI tools.
//!
//! This module provides reusable clap argument structures for the `snmp-*` CLI tools.

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{ClientConfig, Communicator, DEFAULT_PORT};
use crate::error::{Error, Result};
use crate::format::hex;
use crate::oid::Oid;
use crate::resolve::{OidResolver, ResolvedOid, TreeResolver};
use crate::value::{Value, ValueKind};
use crate::varbind::VarBind;

/// Common arguments shared across all CLI tools.
#[derive(Debug, Parser)]
pub struct CommonArgs {
    /// Agent host name or address.
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Agent UDP port.
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = "public")]
    pub community: String,

    /// Request timeout in seconds.
    #[arg(short = 't', long = "timeout", default_value = "5")]
    pub timeout: f64,

    /// File of `name oid` lines used to print OID names.
    #[arg(short = 'm', long = "names", value_name = "FILE")]
    pub names: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommonArgs {
    /// Get the timeout as a Duration.
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::ZERO)
    }

    /// Client configuration from the flags.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: self.timeout_duration(),
            ..ClientConfig::with_community(self.community.clone())
        }
    }

    /// Resolve the host and open a communicator.
    pub async fn connect(&self) -> Result<Communicator> {
        Communicator::connect(&self.host, self.port, self.client_config()).await
    }

    /// Load the name file, if one was given.
    pub fn resolver(&self) -> Result<Option<TreeResolver>> {
        let Some(path) = &self.names else {
            return Ok(None);
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e).into()).boxed()
        })?;
        TreeResolver::parse(&text).map(Some)
    }

    /// Initialize tracing from the verbosity count.
    ///
    /// `RUST_LOG`, when set, takes precedence.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = match self.verbose {
            0 => "snmp_v1=warn",
            1 => "snmp_v1=debug",
            _ => "snmp_v1=trace",
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Parse an OID argument.
pub fn parse_oid(s: &str) -> std::result::Result<Oid, String> {
    Oid::parse(s).map_err(|e| format!("invalid OID '{}': {}", s, e))
}

/// Parse `OID TYPE VALUE` triplets into parallel OID and value lists.
///
/// Type letters follow net-snmp: `i u c C g t a s x o n b N`. `x` takes hex.
pub fn parse_set_triplets(args: &[String]) -> std::result::Result<(Vec<Oid>, Vec<Value>), String> {
    if args.is_empty() || args.len() % 3 != 0 {
        return Err("arguments must be OID TYPE VALUE triplets".into());
    }

    let mut oids = Vec::with_capacity(args.len() / 3);
    let mut values = Vec::with_capacity(args.len() / 3);
    for chunk in args.chunks(3) {
        let oid = parse_oid(&chunk[0])?;
        let value = parse_typed_value(&chunk[1], &chunk[2])?;
        oids.push(oid);
        values.push(value);
    }
    Ok((oids, values))
}

fn parse_typed_value(letter: &str, text: &str) -> std::result::Result<Value, String> {
    let mut chars = letter.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(format!("invalid type specifier '{}'", letter));
    };
    let kind = ValueKind::from_type_letter(c)
        .ok_or_else(|| format!("invalid type specifier '{}'; use i, u, c, C, g, t, a, s, x, o, n, b or N", letter))?;

    let parsed = match (c, kind) {
        ('x', _) => hex::decode(text).map(|bytes| Value::OctetString(bytes.into())),
        (_, ValueKind::Null) => Ok(Value::Null),
        _ => Value::parse(kind, text),
    };
    parsed.map_err(|e| format!("invalid {} value '{}': {}", kind, text, e))
}

/// Format one binding as `OID = TYPE: value`.
pub fn format_varbind(vb: &VarBind, resolver: Option<&dyn OidResolver>) -> String {
    format!("{} = {}: {}", ResolvedOid::new(&vb.oid, resolver), vb.value.kind(), vb.value)
}

/// Print an error to stderr in the tools' common shape.
pub fn write_error(err: &Error) {
    match err.index() {
        Some(index) if index > 0 => eprintln!("Error: {} (index {})", err, index),
        _ => eprintln!("Error: {}", err),
    }
}
