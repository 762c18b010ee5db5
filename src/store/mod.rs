//! Append-only, user-scoped persistence of saved reports
//!
//! All reports live under a single collection key as a JSON array; each save
//! is a full read-modify-write of that collection. Two concurrent saves can
//! race and one write can be lost. Acceptable for the single-user,
//! single-process usage model and explicitly out of scope to fix here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::Error;
use crate::ids;
use crate::model::SavedReport;

/// Collection key holding every saved report
pub const REPORTS_KEY: &str = "carscube_reports";

/// Key-value persistence boundary. String values only; callers own the JSON
/// encoding of whatever they store.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// In-memory key-value store, used in tests and as a scratch backend
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed key-value store; one file per key under a base directory
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KvStore for FileKv {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                log::error!("kv read failed for {key}: {e}");
                Err(Error::persist(format!("read failed for {key}: {e}")))
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            log::error!("kv directory unavailable: {e}");
            Error::persist(format!("storage directory unavailable: {e}"))
        })?;
        tokio::fs::write(self.path_for(key), value)
            .await
            .map_err(|e| {
                log::error!("kv write failed for {key}: {e}");
                Error::persist(format!("write failed for {key}: {e}"))
            })
    }
}

/// Append-only store of saved reports over a [`KvStore`]
pub struct ReportStore {
    kv: Arc<dyn KvStore>,
}

impl ReportStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    async fn read_collection(&self) -> Result<Vec<SavedReport>, Error> {
        match self.kv.get(REPORTS_KEY).await? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                log::error!("stored report collection failed to parse: {e}");
                e.into()
            }),
        }
    }

    /// Persist a report, assigning the canonical store id and the persistence
    /// timestamp (overriding whatever the assessment carried).
    ///
    /// Returns the report as persisted. On failure nothing is appended; the
    /// caller surfaces this as a scan failure without partial state.
    pub async fn save(&self, mut report: SavedReport) -> Result<SavedReport, Error> {
        let mut collection = self.read_collection().await?;

        report.assessment.id = ids::random_base36(9);
        report.assessment.timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        collection.push(report.clone());

        let encoded = serde_json::to_string(&collection)?;
        self.kv.set(REPORTS_KEY, &encoded).await?;

        log::debug!(
            "saved report {} for user {}",
            report.assessment.id,
            report.user_id
        );
        Ok(report)
    }

    /// All reports for a user, newest first. Timestamps that fail to parse
    /// sort as epoch 0. An empty storage state yields an empty list.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<SavedReport>, Error> {
        let mut reports: Vec<SavedReport> = self
            .read_collection()
            .await?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();

        reports.sort_by_key(|r| std::cmp::Reverse(timestamp_millis(&r.assessment.timestamp)));
        Ok(reports)
    }

    /// Linear lookup by the canonical store id; `Ok(None)` when absent
    pub async fn get_by_id(&self, report_id: &str) -> Result<Option<SavedReport>, Error> {
        Ok(self
            .read_collection()
            .await?
            .into_iter()
            .find(|r| r.assessment.id == report_id))
    }
}

fn timestamp_millis(timestamp: &str) -> i64 {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_timestamps_sort_as_epoch() {
        assert_eq!(timestamp_millis("not a date"), 0);
        assert_eq!(timestamp_millis(""), 0);
        assert!(timestamp_millis("2025-05-01T10:00:00Z") > 0);
    }

    #[test]
    fn memory_kv_round_trips() {
        tokio_test::block_on(async {
            let kv = MemoryKv::new();
            assert!(kv.get("missing").await.unwrap().is_none());
            kv.set("k", "v").await.unwrap();
            assert_eq!(kv.get("k").await.unwrap().unwrap(), "v");
        });
    }
}
