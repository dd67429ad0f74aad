//! Standard test fixtures with realistic MIB data.

use snmp_v1::{Oid, Value, oid};
use std::collections::BTreeMap;

// =============================================================================
// MIB data fixtures
// =============================================================================

/// Standard system MIB entries (1.3.6.1.2.1.1).
///
/// Returns OIDs for:
/// - sysDescr.0 (1.3.6.1.2.1.1.1.0)
/// - sysObjectID.0 (1.3.6.1.2.1.1.2.0)
/// - sysUpTime.0 (1.3.6.1.2.1.1.3.0)
/// - sysContact.0 (1.3.6.1.2.1.1.4.0)
/// - sysName.0 (1.3.6.1.2.1.1.5.0)
/// - sysLocation.0 (1.3.6.1.2.1.1.6.0)
/// - sysServices.0 (1.3.6.1.2.1.1.7.0)
pub fn system_mib() -> BTreeMap<Oid, Value> {
    let mut data = BTreeMap::new();

    data.insert(sys_descr(), Value::from("Test SNMP Agent"));
    data.insert(
        sys_object_id(),
        Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4, 1, 99999)),
    );
    data.insert(sys_uptime(), Value::TimeTicks(123456));
    data.insert(sys_contact(), Value::from("admin@test.local"));
    data.insert(sys_name(), Value::from("test-agent"));
    data.insert(sys_location(), Value::from("Test Lab"));
    data.insert(sys_services(), Value::integer(72));

    data
}

/// Interface table entries for walk tests.
///
/// Creates `count` rows with ifIndex, ifDescr, ifType, ifMtu, ifSpeed and
/// ifPhysAddress columns, plus ifNumber.0.
pub fn interface_table(count: u32) -> BTreeMap<Oid, Value> {
    let mut data = BTreeMap::new();

    // ifNumber.0
    data.insert(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::integer(count));

    for idx in 1..=count {
        data.insert(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, idx), Value::integer(idx));
        data.insert(
            oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, idx),
            Value::from(format!("eth{}", idx - 1)),
        );
        // ethernetCsmacd(6)
        data.insert(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 3, idx), Value::integer(6));
        data.insert(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 4, idx), Value::integer(1500));
        data.insert(
            oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 5, idx),
            Value::Gauge32(1_000_000_000),
        );
        data.insert(
            oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 6, idx),
            Value::OctetString(vec![0x00, 0x11, 0x22, 0x33, 0x44, idx as u8].into()),
        );
    }

    data
}

/// Combine multiple fixture sets.
pub fn combined(fixtures: impl IntoIterator<Item = BTreeMap<Oid, Value>>) -> BTreeMap<Oid, Value> {
    let mut result = BTreeMap::new();
    for fixture in fixtures {
        result.extend(fixture);
    }
    result
}

// =============================================================================
// OID helper functions
// =============================================================================

/// sysDescr.0
pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}

/// sysObjectID.0
pub fn sys_object_id() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)
}

/// sysUpTime.0
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}

/// sysContact.0
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}

/// sysName.0
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}

/// sysLocation.0
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

/// sysServices.0
pub fn sys_services() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 7, 0)
}

// =============================================================================
// Subtree roots (for walks)
// =============================================================================

/// System subtree root: 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

/// Interfaces subtree root: 1.3.6.1.2.1.2
pub fn interfaces_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2)
}

/// OID no fixture defines.
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}
