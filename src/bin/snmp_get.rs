//! snmp-get: Retrieve SNMP OID values.
//!
//! Part of the snmp-v1 CLI utilities.

use clap::Parser;
use snmp_v1::cli::args::{CommonArgs, format_varbind, parse_oid, write_error};
use snmp_v1::resolve::OidResolver;
use std::process::ExitCode;

/// Retrieve one or more OIDs in a single GetRequest.
#[derive(Debug, Parser)]
#[command(name = "snmp-get", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Ask for the object following each OID instead (GetNextRequest).
    #[arg(short = 'n', long = "next")]
    next: bool,

    /// OIDs to retrieve (dotted notation).
    #[arg(required = true, value_name = "OID")]
    oids: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.common.init_tracing();

    let oids = match args.oids.iter().map(|s| parse_oid(s)).collect::<Result<Vec<_>, _>>() {
        Ok(oids) => oids,
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
        Ok(client) if args.next => client.get_next_entry(&oids).await,
        Ok(client) => client.get_entry(&oids).await,
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
