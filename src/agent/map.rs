//! A handler serving a fixed MIB view from an ordered map.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{PoisonError, RwLock};

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{RequestContext, RequestHandler};
use crate::error::Result;
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

/// [`RequestHandler`] over a `BTreeMap<Oid, Value>`.
///
/// - Get claims every requested OID present in the map.
/// - GetNext claims every requested OID that has a successor in the map.
/// - Set claims, and overwrites, requested OIDs that already exist when the
///   new value has the same kind as the stored one. Unknown OIDs and kind
///   changes are left unclaimed, which the agent reports as noSuchName.
///
/// ```
/// use snmp_v1::agent::MapHandler;
/// use snmp_v1::{Value, oid};
///
/// let handler = MapHandler::new([(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("r1"))]);
/// handler.insert(oid!(1, 3, 6, 1, 2, 1, 1, 6, 0), Value::from("lab"));
/// assert_eq!(handler.len(), 2);
/// ```
#[derive(Default)]
pub struct MapHandler {
    entries: RwLock<BTreeMap<Oid, Value>>,
    read_only: bool,
}

impl MapHandler {
    /// Create a handler serving `entries`.
    pub fn new(entries: impl IntoIterator<Item = (Oid, Value)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
            read_only: false,
        }
    }

    /// Refuse every Set.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Insert or replace an entry.
    pub fn insert(&self, oid: Oid, value: Value) -> Option<Value> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(oid, value)
    }

    /// Current value of an entry.
    pub fn value(&self, oid: &Oid) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(oid)
            .cloned()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, varbinds: &[VarBind]) -> Vec<VarBind> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        varbinds
            .iter()
            .filter_map(|vb| {
                entries
                    .get(&vb.oid)
                    .map(|value| VarBind::new(vb.oid.clone(), value.clone()))
            })
            .collect()
    }

    fn successors(&self, varbinds: &[VarBind]) -> Vec<(Oid, VarBind)> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        varbinds
            .iter()
            .filter_map(|vb| {
                entries
                    .range((Bound::Excluded(&vb.oid), Bound::Unbounded))
                    .next()
                    .map(|(next, value)| (vb.oid.clone(), VarBind::new(next.clone(), value.clone())))
            })
            .collect()
    }

    fn assign(&self, varbinds: &[VarBind]) -> Vec<VarBind> {
        if self.read_only {
            return Vec::new();
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        varbinds
            .iter()
            .filter_map(|vb| {
                let slot = entries.get_mut(&vb.oid)?;
                if slot.kind() != vb.value.kind() {
                    return None;
                }
                *slot = vb.value.clone();
                Some(vb.clone())
            })
            .collect()
    }
}

impl RequestHandler for MapHandler {
    fn get<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        varbinds: &'a [VarBind],
    ) -> BoxFuture<'a, Result<Vec<VarBind>>> {
        futures::future::ready(Ok(self.lookup(varbinds))).boxed()
    }

    fn get_next<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        varbinds: &'a [VarBind],
    ) -> BoxFuture<'a, Result<Vec<(Oid, VarBind)>>> {
        futures::future::ready(Ok(self.successors(varbinds))).boxed()
    }

    fn set<'a>(
        &'a self,
        _ctx: &'a RequestContext,
        varbinds: &'a [VarBind],
    ) -> BoxFuture<'a, Result<Vec<VarBind>>> {
        futures::future::ready(Ok(self.assign(varbinds))).boxed()
    }
}
