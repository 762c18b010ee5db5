//! Reactive cache and query layer over the report store
//!
//! Gives callers synchronous-feeling, deduplicated access to the store's
//! async operations: a per-user list query with a long freshness window, a
//! detail query seeded from already-cached lists, a save mutation with
//! optimistic prepend plus background revalidation, and the dashboard summary
//! derived from the list. At most one fetch is in flight per query key;
//! concurrent callers wait on the same fetch and read the shared result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::model::{FraudRisk, SavedReport};
use crate::store::ReportStore;

/// How many reports the dashboard surfaces as recent activity
const DASHBOARD_RECENT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QueryKey {
    List(String),
    Detail(String),
}

struct CachedList {
    reports: Vec<SavedReport>,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    lists: HashMap<String, CachedList>,
    details: HashMap<String, SavedReport>,
}

/// Summary tiles derived from a user's report list
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_scans: usize,
    pub total_estimated_cost: f64,
    pub high_fraud_count: usize,
    /// Newest-first, at most three entries
    pub recent: Vec<SavedReport>,
}

/// In-memory cache over a [`ReportStore`]
pub struct ReportCache {
    store: Arc<ReportStore>,
    stale_time: Duration,
    state: Mutex<CacheState>,
    /// One async mutex per query key; whoever holds it is the only fetcher
    fetch_locks: Mutex<HashMap<QueryKey, Arc<tokio::sync::Mutex<()>>>>,
    weak_self: Weak<ReportCache>,
}

impl ReportCache {
    pub fn new(store: Arc<ReportStore>, stale_time: Duration) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            store,
            stale_time,
            state: Mutex::new(CacheState::default()),
            fetch_locks: Mutex::new(HashMap::new()),
            weak_self: weak.clone(),
        })
    }

    fn fetch_lock(&self, key: QueryKey) -> Arc<tokio::sync::Mutex<()>> {
        self.fetch_locks
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .clone()
    }

    fn cached_list(&self, user_id: &str) -> Option<Vec<SavedReport>> {
        let state = self.state.lock().unwrap();
        state
            .lists
            .get(user_id)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| entry.reports.clone())
    }

    /// Reads retry exactly once; failures are logged at this boundary before
    /// they surface as a recoverable error state.
    async fn read_with_retry<T, F, Fut>(&self, what: &str, op: F) -> Result<T, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        match op().await {
            Ok(value) => Ok(value),
            Err(first) => {
                log::warn!("{what} failed, retrying once: {first}");
                op().await.map_err(|second| {
                    log::error!("{what} failed after retry: {second}");
                    second
                })
            }
        }
    }

    /// The user's reports, newest first. A missing user id short-circuits to
    /// an empty result without touching storage.
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<SavedReport>, Error> {
        let Some(user_id) = user_id.filter(|u| !u.is_empty()) else {
            return Ok(Vec::new());
        };

        if let Some(reports) = self.cached_list(user_id) {
            return Ok(reports);
        }

        let lock = self.fetch_lock(QueryKey::List(user_id.to_string()));
        let _fetching = lock.lock().await;

        // A concurrent caller may have filled the cache while we waited
        if let Some(reports) = self.cached_list(user_id) {
            return Ok(reports);
        }

        let reports = self
            .read_with_retry("list query", || self.store.list_by_user(user_id))
            .await?;

        self.state.lock().unwrap().lists.insert(
            user_id.to_string(),
            CachedList {
                reports: reports.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(reports)
    }

    /// A single report by its canonical store id.
    ///
    /// Served out of any already-cached list when possible (no storage read),
    /// otherwise fetched with one retry. Absence surfaces as
    /// [`Error::NotFound`].
    pub async fn detail(&self, report_id: &str) -> Result<SavedReport, Error> {
        if let Some(report) = self.seed_detail_from_cache(report_id) {
            return Ok(report);
        }

        let lock = self.fetch_lock(QueryKey::Detail(report_id.to_string()));
        let _fetching = lock.lock().await;

        if let Some(report) = self.seed_detail_from_cache(report_id) {
            return Ok(report);
        }

        let found = self
            .read_with_retry("detail query", || self.store.get_by_id(report_id))
            .await?;

        match found {
            Some(report) => {
                self.state
                    .lock()
                    .unwrap()
                    .details
                    .insert(report_id.to_string(), report.clone());
                Ok(report)
            }
            None => {
                log::warn!("detail query for unknown report {report_id}");
                Err(Error::NotFound(report_id.to_string()))
            }
        }
    }

    fn seed_detail_from_cache(&self, report_id: &str) -> Option<SavedReport> {
        let mut state = self.state.lock().unwrap();
        if let Some(report) = state.details.get(report_id) {
            return Some(report.clone());
        }
        let seeded = state
            .lists
            .values()
            .flat_map(|entry| entry.reports.iter())
            .find(|r| r.assessment.id == report_id)
            .cloned()?;
        state
            .details
            .insert(report_id.to_string(), seeded.clone());
        Some(seeded)
    }

    /// Persist a report through the store and keep the read models
    /// consistent: the detail cache is seeded with the saved report, the
    /// cached list (when present) gets it prepended, and a background
    /// revalidation of that list reconciles any divergence.
    ///
    /// No retry here; a failure must surface to the workflow immediately.
    pub async fn save(&self, report: SavedReport) -> Result<SavedReport, Error> {
        let saved = self.store.save(report).await?;

        {
            let mut state = self.state.lock().unwrap();
            state
                .details
                .insert(saved.assessment.id.clone(), saved.clone());
            if let Some(entry) = state.lists.get_mut(&saved.user_id) {
                entry.reports.insert(0, saved.clone());
            }
        }

        self.spawn_list_revalidation(saved.user_id.clone());
        Ok(saved)
    }

    fn spawn_list_revalidation(&self, user_id: String) {
        let Some(cache) = self.weak_self.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            match cache.store.list_by_user(&user_id).await {
                Ok(reports) => {
                    cache.state.lock().unwrap().lists.insert(
                        user_id,
                        CachedList {
                            reports,
                            fetched_at: Instant::now(),
                        },
                    );
                }
                Err(e) => {
                    // The optimistic update already reflects the save
                    log::warn!("background list revalidation failed for {user_id}: {e}");
                }
            }
        });
    }

    /// Dashboard tiles derived from the list query
    pub async fn dashboard(&self, user_id: Option<&str>) -> Result<DashboardSummary, Error> {
        let reports = self.list(user_id).await?;
        Ok(DashboardSummary {
            total_scans: reports.len(),
            total_estimated_cost: reports
                .iter()
                .map(|r| r.assessment.total_estimated_cost)
                .sum(),
            high_fraud_count: reports
                .iter()
                .filter(|r| r.assessment.fraud_risk == FraudRisk::High)
                .count(),
            recent: reports.into_iter().take(DASHBOARD_RECENT).collect(),
        })
    }
}
