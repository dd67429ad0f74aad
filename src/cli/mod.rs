//! Shared pieces of the `snmp-walk`, `snmp-get` and `snmp-set` tools.

pub mod args;
