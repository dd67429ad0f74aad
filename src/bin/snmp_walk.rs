//! snmp-walk: Walk an SNMP table with GetNext.
//!
//! Part of the snmp-v1 CLI utilities.

use clap::Parser;
use snmp_v1::cli::args::{CommonArgs, format_varbind, parse_oid, write_error};
use snmp_v1::resolve::OidResolver;
use std::ops::ControlFlow;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Walk the objects under an OID, one GetNextRequest at a time.
#[derive(Debug, Parser)]
#[command(name = "snmp-walk", version, about)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Keep walking past the end of the subtree until the agent's view ends.
    #[arg(long = "all")]
    all: bool,

    /// OID to start from (dotted notation).
    #[arg(value_name = "OID")]
    oid: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    args.common.init_tracing();

    let oid = match parse_oid(&args.oid) {
        Ok(oid) => oid,
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

    let client = match args.common.connect().await {
        Ok(client) => client,
        Err(e) => {
            write_error(&e);
            return ExitCode::FAILURE;
        }
    };

    // Ctrl-C stops the walk after the round in flight.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let result = if args.all {
        client
            .retrieve_all_from_until(&oid, &cancel)
            .await
            .map(|varbinds| {
                for vb in &varbinds {
                    println!("{}", format_varbind(vb, names));
                }
            })
    } else {
        client
            .walk_with(&oid, &cancel, |vb| {
                println!("{}", format_varbind(&vb, names));
                ControlFlow::Continue(())
            })
            .await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            write_error(&e);
            ExitCode::FAILURE
        }
    }
}
