//! Formatting helpers for printing SNMP data.
//!
//! ```
//! use snmp_v1::format::hex;
//!
//! assert_eq!(hex::encode(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
//! assert_eq!(hex::decode("DEAD").unwrap(), vec![0xde, 0xad]);
//! ```

pub mod hex;
