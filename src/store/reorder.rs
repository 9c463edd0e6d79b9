//! Reorder/persistence bridge
//!
//! Whenever blocks are reordered, the new order of already-persisted blocks
//! is synced to the persistence collaborator on a best-effort basis. Instead
//! of a bare unguarded call, batches go through a bounded retry queue that
//! is flushed opportunistically: a failed flush keeps the batch for a later
//! retry (up to a cap), and each batch carries absolute orders so a newer
//! batch for the same page simply replaces the stale one. The in-memory
//! document stays authoritative; the next explicit save reconciles any
//! drift.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Block;

/// Retry attempts before a batch is dropped.
const MAX_ATTEMPTS: u8 = 3;

/// Queue capacity; the oldest batch is dropped past this.
const MAX_QUEUED_BATCHES: usize = 8;

#[derive(Error, Debug)]
#[error("order sync failed: {0}")]
pub struct SyncError(pub String);

/// `{id, order}` pair for one persisted block.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: String,
    pub order: usize,
}

/// External collaborator receiving order updates.
pub trait OrderSync {
    fn sync_order(&mut self, page_id: &str, updates: &[OrderUpdate]) -> Result<(), SyncError>;
}

/// Collaborator used until the host wires a real one: drops updates with a
/// debug log line.
#[derive(Debug, Default)]
pub struct NullOrderSync;

impl OrderSync for NullOrderSync {
    fn sync_order(&mut self, page_id: &str, updates: &[OrderUpdate]) -> Result<(), SyncError> {
        log::debug!(
            "no order-sync collaborator configured, dropping {} updates for page {}",
            updates.len(),
            page_id
        );
        Ok(())
    }
}

#[derive(Debug)]
struct PendingBatch {
    page_id: String,
    updates: Vec<OrderUpdate>,
    attempts: u8,
}

/// Bounded retry queue in front of the order-sync collaborator.
#[derive(Debug, Default)]
pub struct ReorderBridge {
    queue: VecDeque<PendingBatch>,
}

impl ReorderBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the current order of every persisted block. Blocks with
    /// transient (never-saved) ids are skipped; a batch already queued for
    /// the same page is replaced, since each batch carries absolute orders.
    pub fn enqueue(&mut self, page_id: &str, blocks: &[Block]) {
        let updates: Vec<OrderUpdate> = blocks
            .iter()
            .filter(|b| b.is_persisted())
            .map(|b| OrderUpdate {
                id: b.id.clone(),
                order: b.order,
            })
            .collect();
        if updates.is_empty() {
            return;
        }
        self.queue.retain(|batch| batch.page_id != page_id);
        if self.queue.len() >= MAX_QUEUED_BATCHES {
            if let Some(dropped) = self.queue.pop_front() {
                log::warn!(
                    "reorder queue full, dropping oldest batch for page {}",
                    dropped.page_id
                );
            }
        }
        self.queue.push_back(PendingBatch {
            page_id: page_id.to_string(),
            updates,
            attempts: 0,
        });
    }

    /// Try to deliver queued batches in order. Stops at the first failure so
    /// delivery order is preserved; a batch that keeps failing is dropped
    /// after [`MAX_ATTEMPTS`] with a log line, never surfaced.
    pub fn flush(&mut self, sync: &mut dyn OrderSync) {
        while let Some(mut batch) = self.queue.pop_front() {
            match sync.sync_order(&batch.page_id, &batch.updates) {
                Ok(()) => continue,
                Err(err) => {
                    batch.attempts += 1;
                    if batch.attempts >= MAX_ATTEMPTS {
                        log::warn!(
                            "dropping order-sync batch for page {} after {} attempts: {}",
                            batch.page_id,
                            batch.attempts,
                            err
                        );
                    } else {
                        log::debug!(
                            "order sync failed (attempt {}), will retry: {}",
                            batch.attempts,
                            err
                        );
                        self.queue.push_front(batch);
                    }
                    return;
                }
            }
        }
    }

    pub fn pending_batches(&self) -> usize {
        self.queue.len()
    }
}
