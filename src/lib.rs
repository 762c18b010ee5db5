//! CarsCube Core
//!
//! Client core for the CarsCube vehicle damage assessment platform: image
//! preprocessing, the vision-model assessment requester, the append-only
//! report store with its reactive cache, the scan workflow state machine, and
//! the PDF document projection.

pub mod auth;
pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod imaging;
pub mod model;
pub mod pdf;
pub mod store;
pub mod vision;
pub mod workflow;

mod ids;

use std::sync::Arc;

use reqwest::Client;

use crate::auth::AuthClient;
use crate::cache::ReportCache;
use crate::config::ClientOptions;
use crate::store::{KvStore, ReportStore};
use crate::vision::VisionClient;
use crate::workflow::ScanController;

/// Default base URL of the vision model API
pub const DEFAULT_VISION_URL: &str = "https://generativelanguage.googleapis.com";

/// The main entry point for the CarsCube core
pub struct Carscube {
    /// The base URL for the vision model API
    pub url: String,
    /// Client options
    pub options: ClientOptions,

    auth: Arc<AuthClient>,
    vision: Arc<VisionClient>,
    store: Arc<ReportStore>,
    cache: Arc<ReportCache>,
}

impl Carscube {
    /// Create a new client against the default vision endpoint
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key for the vision model
    /// * `kv` - key-value persistence backend for profiles and reports
    pub fn new(api_key: &str, kv: Arc<dyn KvStore>) -> Self {
        Self::new_with_options(DEFAULT_VISION_URL, api_key, kv, ClientOptions::default())
    }

    /// Create a new client with a custom endpoint and options
    pub fn new_with_options(
        url: &str,
        api_key: &str,
        kv: Arc<dyn KvStore>,
        options: ClientOptions,
    ) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|e| {
            log::warn!("http client options rejected, using defaults: {e}");
            Client::new()
        });

        let auth = Arc::new(AuthClient::new(kv.clone()));
        let vision = Arc::new(VisionClient::new(url, api_key, http_client, &options));
        let store = Arc::new(ReportStore::new(kv));
        let cache = ReportCache::new(store.clone(), options.list_stale_time);

        Self {
            url: url.to_string(),
            options,
            auth,
            vision,
            store,
            cache,
        }
    }

    /// Profile and session management
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// The assessment requester
    pub fn vision(&self) -> &VisionClient {
        &self.vision
    }

    /// Direct access to the report store. Most callers should go through
    /// [`Carscube::cache`] instead.
    pub fn reports(&self) -> &ReportStore {
        &self.store
    }

    /// The report cache and query layer
    pub fn cache(&self) -> &Arc<ReportCache> {
        &self.cache
    }

    /// Build a controller for one scan attempt
    pub fn scanner(&self) -> ScanController {
        ScanController::new(
            self.auth.clone(),
            self.vision.clone(),
            self.cache.clone(),
            self.options.max_image_dimension,
            self.options.jpeg_quality,
        )
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::workflow::ScanState;
    pub use crate::Carscube;
}
