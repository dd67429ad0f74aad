//! GetNext walks: single-column table, row-wise multi-column table, and
//! the unbounded walk of everything after a starting OID.
//!
//! All walks treat an error status in a response as the end of the agent's
//! view (v1 agents answer noSuchName past the last object) and check for
//! cancellation only between rounds. A returned OID equal to the one just
//! asked about also ends a walk; one that sorts before it fails the walk
//! with genErr, since the agent would otherwise be walked in a cycle.

use std::cmp::Ordering;

use super::Communicator;
use crate::error::{Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::varbind::VarBind;
use std::ops::ControlFlow;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

impl<T: Transport> Communicator<T> {
    /// Walk the table under `base`.
    ///
    /// Issues GetNextRequests starting at `base` and stops at the first
    /// returned OID whose dotted text does not start with the dotted text of
    /// `base`. Note the text comparison: under base `1.3.6.1.2.1.1`, the OID
    /// `1.3.6.1.2.1.10.1` still belongs to the table.
    pub async fn retrieve_table(&self, base: &Oid) -> Result<Vec<VarBind>> {
        self.retrieve_table_until(base, &CancellationToken::new())
            .await
    }

    /// [`retrieve_table`](Self::retrieve_table), stopping early with the
    /// bindings gathered so far once `cancel` fires.
    pub async fn retrieve_table_until(
        &self,
        base: &Oid,
        cancel: &CancellationToken,
    ) -> Result<Vec<VarBind>> {
        let mut results = Vec::new();
        self.walk_with(base, cancel, |vb| {
            results.push(vb);
            ControlFlow::Continue(())
        })
        .await?;
        Ok(results)
    }

    /// Table walk delivering each binding to `sink` as it arrives.
    ///
    /// The sink returns [`ControlFlow::Break`] to stop the walk.
    #[instrument(skip(self, cancel, sink), err, fields(snmp.target = %self.peer_addr(), snmp.oid = %base))]
    pub async fn walk_with<F>(&self, base: &Oid, cancel: &CancellationToken, mut sink: F) -> Result<()>
    where
        F: FnMut(VarBind) -> ControlFlow<()>,
    {
        let mut current = base.clone();
        loop {
            if cancel.is_cancelled() {
                tracing::debug!(target: "snmp_v1::client", { snmp.oid = %current }, "walk cancelled");
                return Ok(());
            }

            let response = self.next_round(std::slice::from_ref(&current)).await?;
            if response.is_error() {
                tracing::debug!(
                    target: "snmp_v1::client",
                    { snmp.oid = %current, snmp.error_status = response.error_status },
                    "walk ended by error status"
                );
                return Ok(());
            }
            self.check_count(1, &response)?;

            let Some(vb) = response.varbinds.into_iter().next() else {
                return Ok(());
            };
            if !vb.oid.has_text_prefix(base) || !self.advances(1, &current, &vb.oid)? {
                return Ok(());
            }
            current = vb.oid.clone();
            if sink(vb).is_break() {
                return Ok(());
            }
        }
    }

    /// Walk several columns of one table in lockstep, one row per round.
    ///
    /// Each round sends one GetNextRequest covering every column. The walk
    /// ends cleanly when the first column leaves its base. Any other column
    /// leaving its base while the first continues is an
    /// [`Error::IncompleteRow`] carrying that column's 1-based index.
    pub async fn retrieve_table_columns(&self, bases: &[Oid]) -> Result<Vec<Vec<VarBind>>> {
        self.retrieve_table_columns_until(bases, &CancellationToken::new())
            .await
    }

    /// [`retrieve_table_columns`](Self::retrieve_table_columns) with
    /// cancellation between rounds.
    #[instrument(skip(self, bases, cancel), err, fields(snmp.target = %self.peer_addr(), snmp.oid_count = bases.len()))]
    pub async fn retrieve_table_columns_until(
        &self,
        bases: &[Oid],
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<VarBind>>> {
        let mut rows = Vec::new();
        if bases.is_empty() {
            return Ok(rows);
        }

        let mut current = bases.to_vec();
        while !cancel.is_cancelled() {
            let response = self.next_round(&current).await?;
            if response.is_error() {
                tracing::debug!(
                    target: "snmp_v1::client",
                    { snmp.error_status = response.error_status, snmp.error_index = response.error_index },
                    "row walk ended by error status"
                );
                break;
            }

            let row = response.varbinds;
            if row.len() != bases.len() {
                return Err(self.incomplete_row(
                    0,
                    format!("expected {} columns but received {}", bases.len(), row.len()),
                ));
            }
            if !row[0].oid.has_text_prefix(&bases[0]) {
                break;
            }
            for (i, (vb, base)) in row.iter().zip(bases).enumerate().skip(1) {
                if !vb.oid.has_text_prefix(base) {
                    return Err(self.incomplete_row(
                        i as u32 + 1,
                        format!("column {} ({}) left its table at {}", i + 1, base, vb.oid),
                    ));
                }
            }

            let mut advanced = true;
            for (i, (vb, previous)) in row.iter().zip(&current).enumerate() {
                advanced &= self.advances(i as u32 + 1, previous, &vb.oid)?;
            }
            if !advanced {
                break;
            }

            current = row.iter().map(|vb| vb.oid.clone()).collect();
            rows.push(row);
        }
        Ok(rows)
    }

    /// Whether `returned` moves past `previous`.
    ///
    /// `Ok(false)` for a repeat, which ends the walk. An OID sorting before
    /// `previous` is a genErr at `index`.
    fn advances(&self, index: u32, previous: &Oid, returned: &Oid) -> Result<bool> {
        match returned.cmp(previous) {
            Ordering::Greater => Ok(true),
            Ordering::Equal => Ok(false),
            Ordering::Less => {
                tracing::debug!(
                    target: "snmp_v1::client",
                    { snmp.oid = %previous, snmp.returned = %returned },
                    "agent returned a non-increasing OID"
                );
                Err(Error::Get {
                    target: self.peer_addr(),
                    status: ErrorStatus::GenErr,
                    index,
                    message: format!("OID {} returned after {} is not increasing", returned, previous).into(),
                }
                .boxed())
            }
        }
    }

    fn incomplete_row(&self, index: u32, message: String) -> Box<Error> {
        Error::IncompleteRow {
            target: self.peer_addr(),
            index,
            message: message.into(),
        }
        .boxed()
    }

    /// Walk every object after `start`, with no prefix bound.
    ///
    /// Stops when the agent returns the OID it was asked to advance from, or
    /// on the first error status. Fails if the agent steps backwards.
    pub async fn retrieve_all_from(&self, start: &Oid) -> Result<Vec<VarBind>> {
        self.retrieve_all_from_until(start, &CancellationToken::new())
            .await
    }

    /// [`retrieve_all_from`](Self::retrieve_all_from) with cancellation
    /// between rounds.
    #[instrument(skip(self, cancel), err, fields(snmp.target = %self.peer_addr(), snmp.oid = %start))]
    pub async fn retrieve_all_from_until(
        &self,
        start: &Oid,
        cancel: &CancellationToken,
    ) -> Result<Vec<VarBind>> {
        let mut results = Vec::new();
        let mut current = start.clone();
        while !cancel.is_cancelled() {
            let response = self.next_round(std::slice::from_ref(&current)).await?;
            if response.is_error() {
                break;
            }
            self.check_count(1, &response)?;
            let Some(vb) = response.varbinds.into_iter().next() else {
                break;
            };
            if !self.advances(1, &current, &vb.oid)? {
                break;
            }
            current = vb.oid.clone();
            results.push(vb);
        }
        Ok(results)
    }
}
