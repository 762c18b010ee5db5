//! Configuration options for the CarsCube client

use std::time::Duration;

/// Configuration options for the CarsCube client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The vision model used for damage assessment
    pub model: String,

    /// Sampling temperature for the vision model (low for reproducible output)
    pub temperature: f32,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Longest side of the preprocessed image, in pixels
    pub max_image_dimension: u32,

    /// JPEG re-encode quality in the 0.0..=1.0 range
    pub jpeg_quality: f32,

    /// How long a cached report list is considered fresh
    pub list_stale_time: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.1,
            request_timeout: Some(Duration::from_secs(30)),
            max_image_dimension: 1000,
            jpeg_quality: 0.7,
            list_stale_time: Duration::from_secs(60 * 60 * 24),
        }
    }
}

impl ClientOptions {
    /// Set the vision model
    pub fn with_model(mut self, value: &str) -> Self {
        self.model = value.to_string();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, value: f32) -> Self {
        self.temperature = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the longest side of the preprocessed image
    pub fn with_max_image_dimension(mut self, value: u32) -> Self {
        self.max_image_dimension = value;
        self
    }

    /// Set the JPEG re-encode quality
    pub fn with_jpeg_quality(mut self, value: f32) -> Self {
        self.jpeg_quality = value;
        self
    }

    /// Set how long a cached report list stays fresh
    pub fn with_list_stale_time(mut self, value: Duration) -> Self {
        self.list_stale_time = value;
        self
    }
}
