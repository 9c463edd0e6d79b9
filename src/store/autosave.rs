//! Auto-save subsystem
//!
//! Prevents data loss without a manual save and offers recovery after an
//! unexpected exit. Snapshots of the whole document are written to the
//! key-value capability under a key namespaced by document id. Writes are
//! debounced to one per three seconds with last-write-wins deferral, and a
//! thirty-second periodic flush bounds the data-loss window while edits keep
//! re-triggering the debounce. Failures never reach the UI; every degraded
//! path is logged and editing continues locally.
//!
//! Time is injected through [`Clock`] so every timing rule is testable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Block;
use crate::storage::{KeyValueStore, StorageError};

/// Key prefix for auto-save snapshots.
pub const AUTO_SAVE_KEY_PREFIX: &str = "pagebuilder_autosave";

/// Minimum spacing between auto-save writes.
pub const DEBOUNCE_SECONDS: i64 = 3;

/// Upper bound on the data-loss window while dirty.
pub const PERIODIC_SECONDS: i64 = 30;

/// Reject snapshots whose serialized size exceeds this, rather than risk a
/// partial write.
pub const MAX_SNAPSHOT_BYTES: usize = 4 * 1024 * 1024;

/// Snapshots older than this are deleted at mount instead of offered for
/// recovery.
pub const RECOVERY_WINDOW_SECONDS: i64 = 3600;

/// How many snapshots (across all documents) survive routine cleanup.
pub const CLEANUP_KEEP: usize = 10;

/// How many snapshots survive the aggressive eviction on a quota error.
pub const QUOTA_EVICT_KEEP: usize = 5;

/// Injected time source.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and deterministic embeddings.
#[derive(Debug)]
pub struct ManualClock {
    now: std::cell::Cell<i64>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: std::cell::Cell::new(start.timestamp_millis()),
        }
    }

    pub fn advance_millis(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.advance_millis(seconds * 1000);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now.get()).unwrap_or_else(Utc::now)
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// The persisted snapshot record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveData {
    pub document_id: Option<String>,
    pub title: String,
    pub blocks: Vec<Block>,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Storage key for a document's snapshot: the prefix plus the document id,
/// or a "new document" placeholder.
pub fn auto_save_key(document_id: Option<&str>) -> String {
    match document_id {
        Some(id) => format!("{AUTO_SAVE_KEY_PREFIX}_{id}"),
        None => format!("{AUTO_SAVE_KEY_PREFIX}_new"),
    }
}

/// Debounce/periodic scheduler plus the write path.
#[derive(Debug)]
pub struct AutoSave {
    enabled: bool,
    last_save: Option<DateTime<Utc>>,
    /// A save was requested and has not been written yet.
    pending: bool,
}

impl Default for AutoSave {
    fn default() -> Self {
        Self {
            enabled: true,
            last_save: None,
            pending: false,
        }
    }
}

impl AutoSave {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_save(&self) -> Option<DateTime<Utc>> {
        self.last_save
    }

    /// Request a save. Called on every committed mutation and title edit;
    /// the actual write happens on a later [`AutoSave::tick`].
    pub fn schedule(&mut self) {
        self.pending = true;
    }

    /// Drive the scheduler. The host calls this from its timer loop; a write
    /// happens when one is pending and the debounce interval has elapsed, or
    /// when the document has stayed dirty past the periodic interval.
    /// Returns whether a snapshot was written.
    pub fn tick(
        &mut self,
        storage: &mut dyn KeyValueStore,
        data: &AutoSaveData,
        dirty: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.enabled || !dirty || data.blocks.is_empty() {
            return false;
        }
        let since_last = self
            .last_save
            .map(|t| now.signed_duration_since(t));
        let debounce_open = match since_last {
            None => true,
            Some(elapsed) => elapsed >= Duration::seconds(DEBOUNCE_SECONDS),
        };
        let periodic_due = matches!(
            since_last,
            Some(elapsed) if elapsed >= Duration::seconds(PERIODIC_SECONDS)
        );
        if (self.pending && debounce_open) || periodic_due {
            return self.write(storage, data, now);
        }
        false
    }

    /// Last-chance flush when the host is about to navigate away. Ignores
    /// the debounce. Returns whether the host should still warn the user.
    pub fn flush_for_exit(
        &mut self,
        storage: &mut dyn KeyValueStore,
        data: &AutoSaveData,
        dirty: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if dirty && self.enabled && !data.blocks.is_empty() {
            self.write(storage, data, now);
        }
        dirty
    }

    fn write(
        &mut self,
        storage: &mut dyn KeyValueStore,
        data: &AutoSaveData,
        now: DateTime<Utc>,
    ) -> bool {
        if !storage.is_writable() {
            log::warn!("auto-save skipped: storage not writable");
            return false;
        }
        let raw = match serde_json::to_string(data) {
            Ok(raw) => raw,
            Err(err) => {
                log::error!("auto-save failed to serialize snapshot: {}", err);
                return false;
            }
        };
        if raw.len() > MAX_SNAPSHOT_BYTES {
            log::warn!(
                "auto-save skipped: snapshot {} bytes exceeds {} byte ceiling",
                raw.len(),
                MAX_SNAPSHOT_BYTES
            );
            return false;
        }
        let key = auto_save_key(data.document_id.as_deref());
        match storage.set(&key, &raw) {
            Ok(()) => {
                self.finish_write(storage, now);
                true
            }
            Err(StorageError::QuotaExceeded { .. }) => {
                log::warn!("auto-save hit storage quota, evicting old snapshots");
                cleanup_old_snapshots(storage, QUOTA_EVICT_KEEP);
                match storage.set(&key, &raw) {
                    Ok(()) => {
                        log::info!("auto-save retry after eviction succeeded");
                        self.finish_write(storage, now);
                        true
                    }
                    Err(err) => {
                        log::error!("auto-save retry failed, dropping write: {}", err);
                        false
                    }
                }
            }
            Err(err) => {
                log::error!("auto-save failed: {}", err);
                false
            }
        }
    }

    fn finish_write(&mut self, storage: &mut dyn KeyValueStore, now: DateTime<Utc>) {
        self.last_save = Some(now);
        self.pending = false;
        cleanup_old_snapshots(storage, CLEANUP_KEEP);
    }

    /// Look up a recoverable snapshot for the target document at editor
    /// mount. Snapshots older than the recovery window are deleted silently.
    pub fn load_recovery(
        storage: &mut dyn KeyValueStore,
        document_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<AutoSaveData> {
        let key = auto_save_key(document_id);
        let raw = storage.get(&key)?;
        let data: AutoSaveData = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("deleting malformed auto-save snapshot: {}", err);
                storage.remove(&key);
                return None;
            }
        };
        let age_ms = now.timestamp_millis() - data.timestamp;
        if age_ms > RECOVERY_WINDOW_SECONDS * 1000 {
            log::info!("deleting stale auto-save snapshot ({}s old)", age_ms / 1000);
            storage.remove(&key);
            return None;
        }
        Some(data)
    }

    /// Delete the snapshot for a document. Called after an explicit save
    /// supersedes it, or when the user discards a recovery offer.
    pub fn clear(storage: &mut dyn KeyValueStore, document_id: Option<&str>) {
        storage.remove(&auto_save_key(document_id));
    }
}

/// Keep only the `keep` most recent auto-save snapshots across all
/// documents.
fn cleanup_old_snapshots(storage: &mut dyn KeyValueStore, keep: usize) {
    let mut snapshots: Vec<(String, i64)> = storage
        .list_keys()
        .into_iter()
        .filter(|key| key.starts_with(AUTO_SAVE_KEY_PREFIX))
        .map(|key| {
            let timestamp = storage
                .get(&key)
                .and_then(|raw| serde_json::from_str::<AutoSaveData>(&raw).ok())
                .map(|data| data.timestamp)
                .unwrap_or(0);
            (key, timestamp)
        })
        .collect();
    if snapshots.len() <= keep {
        return;
    }
    // Newest first; everything past `keep` goes.
    snapshots.sort_by(|a, b| b.1.cmp(&a.1));
    for (key, _) in snapshots.into_iter().skip(keep) {
        log::info!("auto-save cleanup removing '{}'", key);
        storage.remove(&key);
    }
}
