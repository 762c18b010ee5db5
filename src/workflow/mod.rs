//! Scan workflow controller
//!
//! One state machine per scan attempt: `Idle -> Preprocessing -> Analyzing ->
//! Saving -> Done(report_id)`, with `Failed(reason)` reachable from every
//! non-terminal state. Steps run strictly sequentially; one credit is spent
//! on a successful analysis regardless of whether the subsequent save
//! succeeds, and a persist failure does not refund it.

pub mod progress;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::auth::AuthClient;
use crate::cache::ReportCache;
use crate::error::Error;
use crate::imaging;
use crate::model::SavedReport;
use crate::vision::VisionClient;

/// Observable state of a scan attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Preprocessing,
    Analyzing,
    Saving,
    Done(String),
    Failed(String),
}

/// Orchestrates a single scan attempt end to end
pub struct ScanController {
    auth: Arc<AuthClient>,
    vision: Arc<VisionClient>,
    cache: Arc<ReportCache>,

    /// Preprocessing bounds, taken from the client options
    max_image_dimension: u32,
    jpeg_quality: f32,

    state_tx: watch::Sender<ScanState>,
    state_rx: watch::Receiver<ScanState>,
    status_tx: watch::Sender<&'static str>,
    status_rx: watch::Receiver<&'static str>,

    in_flight: AtomicBool,
}

impl ScanController {
    pub fn new(
        auth: Arc<AuthClient>,
        vision: Arc<VisionClient>,
        cache: Arc<ReportCache>,
        max_image_dimension: u32,
        jpeg_quality: f32,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ScanState::Idle);
        let (status_tx, status_rx) = watch::channel(progress::IDLE_STATUS);
        Self {
            auth,
            vision,
            cache,
            max_image_dimension,
            jpeg_quality,
            state_tx,
            state_rx,
            status_tx,
            status_rx,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The current state of the attempt
    pub fn state(&self) -> ScanState {
        self.state_rx.borrow().clone()
    }

    /// Watch state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<ScanState> {
        self.state_rx.clone()
    }

    /// Watch the cosmetic status text
    pub fn subscribe_status(&self) -> watch::Receiver<&'static str> {
        self.status_rx.clone()
    }

    fn set_state(&self, state: ScanState) {
        self.state_tx.send_replace(state);
    }

    /// Run one scan attempt: validate credits, preprocess, analyze, debit one
    /// credit, persist through the cache mutation, and land in `Done` with
    /// the canonical report id.
    pub async fn scan(&self, image: Vec<u8>) -> Result<String, Error> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(Error::general("a scan is already in flight"));
        }

        let result = self.run(image).await;
        self.in_flight.store(false, Ordering::SeqCst);

        if let Err(e) = &result {
            log::error!("scan failed: {e}");
            self.set_state(ScanState::Failed(e.to_string()));
        }
        result
    }

    async fn run(&self, image: Vec<u8>) -> Result<String, Error> {
        let user = self
            .auth
            .current_user()
            .ok_or_else(|| Error::general("no active session"))?;
        if user.credits == 0 {
            return Err(Error::InsufficientCredits);
        }

        // Rejected before preprocessing
        imaging::validate_upload(&image)?;

        self.set_state(ScanState::Preprocessing);
        self.status_tx.send_replace(progress::COMPRESSING_STATUS);

        let max_dimension = self.max_image_dimension;
        let quality = self.jpeg_quality;
        let encoded =
            tokio::task::spawn_blocking(move || imaging::compress(&image, max_dimension, quality))
                .await
                .map_err(|e| Error::general(format!("preprocessing task failed: {e}")))??;

        self.set_state(ScanState::Analyzing);
        let ticker = self.spawn_status_ticker();
        let analysis = self.vision.analyze(&encoded).await;
        ticker.abort();
        let assessment = analysis?;

        // Credit is spent on a successful analysis, before persistence
        self.auth.debit_credit().await?;

        self.set_state(ScanState::Saving);
        let saved = self
            .cache
            .save(SavedReport {
                assessment,
                image_url: encoded,
                user_id: user.id,
            })
            .await?;

        let report_id = saved.assessment.id.clone();
        self.set_state(ScanState::Done(report_id.clone()));
        Ok(report_id)
    }

    fn spawn_status_ticker(&self) -> JoinHandle<()> {
        let status_tx = self.status_tx.clone();
        tokio::spawn(async move {
            let start = tokio::time::Instant::now();
            for (offset, _) in progress::ANALYSIS_SCHEDULE {
                tokio::time::sleep_until(start + *offset).await;
                status_tx.send_replace(progress::status_at(*offset));
            }
        })
    }

    /// Return a finished attempt to `Idle`. No side effects, no partial
    /// entity; a no-op while a scan is in flight.
    pub fn reset(&self) {
        if self.in_flight.load(Ordering::SeqCst) {
            return;
        }
        self.set_state(ScanState::Idle);
        self.status_tx.send_replace(progress::IDLE_STATUS);
    }
}
