//! snmp-set: Set SNMP OID values.
//!
//! Part of the snmp-v1 CLI utilities.

use clap::Parser;
use snmp_v1::cli::args::{CommonArgs, format_varbind, parse_set_triplets, write_error};
use snmp_v1::resolve::OidResolver;
use std::process::ExitCode;

/// Set one or more SNMP OID values in a single SetRequest.
///
/// Type specifiers:
///   i = INTEGER
///   u = UInteger32
///   c = Counter32
///   C = Counter64
///   g = Gauge32
///   t = TimeTicks
///   a = IpAddress
///   s = STRING
///   x = Hex-STRING
///   o = OBJECT IDENTIFIER
///   n = NULL
///   b = BITS (raw octets)
///   N = NsapAddress
#[derive(Debug, Parser)]
#[command(name = "snmp-set", version, about, verbatim_doc_comment)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// OID TYPE VALUE triplets (e.g., 1.3.6.1.2.1.1.4.0 s "admin@example.com").
    #[arg(required = true, value_name = "OID TYPE VALUE", num_args = 3..)]
    varbinds: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.common.init_tracing();

    let (oids, values) = match parse_set_triplets(&args.varbinds) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let names = match args.common.resolver() {
        Ok(names) => names,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };
    let names = names.as_ref().map(|n| n as &dyn OidResolver);

    let result = match args.common.connect().await {
        Ok(client) => client.set_entry(&oids, &values).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(varbinds) => {
            for vb in &varbinds {
                println!("{}", format_varbind(vb, names));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}
