//! Shared test infrastructure for snmp-v1.
//!
//! Provides TestAgent (in-process SNMP agent), fixtures, and utilities.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod agent;
pub mod fixtures;

// Re-export MIB data fixtures
pub use fixtures::{combined, interface_table, system_mib};

// Re-export OID helpers
pub use fixtures::{
    interfaces_subtree, nonexistent_oid, sys_contact, sys_descr, sys_location, sys_name,
    sys_object_id, sys_services, sys_uptime, system_subtree,
};

pub use agent::TestAgent;

use snmp_v1::{ClientConfig, Communicator, Version};
use snmp_v1::transport::MockTransport;
use std::time::Duration;

/// Communicator over a mock transport with a short timeout.
pub fn mock_client(mock: &MockTransport) -> Communicator<MockTransport> {
    let config = ClientConfig {
        version: Version::V1,
        timeout: Duration::from_millis(200),
        ..ClientConfig::default()
    };
    Communicator::new(mock.clone(), config)
}
