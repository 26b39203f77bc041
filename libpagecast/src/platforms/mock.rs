//! Mock publisher for testing
//!
//! A configurable publisher that simulates successes, failures, and delays.
//! Used by integration tests to exercise the publish run end to end without
//! platform credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::Publisher;
use crate::record::PostRecord;

/// Configuration for mock publisher behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name reported by the publisher
    pub name: String,

    /// Front-matter field the durable id is recorded under
    pub id_field: String,

    /// Whether publishing should succeed
    pub publish_succeeds: bool,

    /// Error to return on publish failure
    pub publish_error: Option<PlatformError>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Character limit enforced by validation
    pub character_limit: Option<usize>,

    /// Whether successful records move to the archive
    pub archive: bool,

    /// Number of times publish has been called
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Bodies that have been published (for verification)
    pub published_bodies: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            id_field: "mock_post_id".to_string(),
            publish_succeeds: true,
            publish_error: None,
            delay: Duration::from_millis(0),
            character_limit: None,
            archive: false,
            publish_call_count: Arc::new(Mutex::new(0)),
            published_bodies: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock publisher for testing
pub struct MockPublisher {
    config: MockConfig,
}

impl MockPublisher {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock publisher that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock publisher that fails every publish
    pub fn failure(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            publish_succeeds: false,
            publish_error: Some(error),
            ..Default::default()
        })
    }

    /// Create a mock publisher with a delay
    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    /// Create a mock publisher with a character limit
    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            character_limit: Some(limit),
            ..Default::default()
        })
    }

    /// Create a mock publisher whose successes archive the record file
    pub fn archiving(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            archive: true,
            ..Default::default()
        })
    }

    /// Get the number of times publish was called
    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    /// Get all bodies that were published
    pub fn published_bodies(&self) -> Vec<String> {
        self.config.published_bodies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn id_field(&self) -> &str {
        &self.config.id_field
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }

    fn validate(&self, record: &PostRecord) -> Result<()> {
        if record.body.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        if let Some(limit) = self.config.character_limit {
            let count = record.body.chars().count();
            if count > limit {
                return Err(PlatformError::Validation(format!(
                    "Content exceeds {} character limit (got {} characters)",
                    limit, count
                ))
                .into());
            }
        }

        Ok(())
    }

    async fn publish(&self, record: &PostRecord) -> Result<String> {
        let call = {
            let mut count = self.config.publish_call_count.lock().unwrap();
            *count += 1;
            *count
        };

        self.validate(record)?;

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if self.config.publish_succeeds {
            self.config
                .published_bodies
                .lock()
                .unwrap()
                .push(record.body.clone());
            Ok(format!("{}:mock-{}", self.config.name, call))
        } else {
            let error = self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| PlatformError::Posting("Mock publish failed".to_string()));
            Err(error.into())
        }
    }

    fn archive_after_publish(&self) -> bool {
        self.config.archive
    }
}
