//! Origin feed sync
//!
//! Fetching feeds from the origin is disabled in the current deployment by
//! policy; the operation is kept as a stub so the surface stays stable.
//! Processing statistics remain available.

use std::sync::Arc;

use newsflow_core::{FeedRepository, ProcessingStats, Result};

use crate::PipelineError;

pub struct FeedSyncService {
    feeds: Arc<dyn FeedRepository>,
}

impl FeedSyncService {
    pub fn new(feeds: Arc<dyn FeedRepository>) -> Self {
        Self { feeds }
    }

    /// Disabled by policy; always fails
    pub async fn sync_feeds(&self) -> Result<()> {
        tracing::warn!("feed sync requested but the feature is disabled");
        Err(PipelineError::FeedSyncDisabled.into())
    }

    pub async fn processing_stats(&self) -> Result<ProcessingStats> {
        self.feeds.get_processing_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct MockFeeds;

    #[async_trait]
    impl FeedRepository for MockFeeds {
        async fn get_processing_stats(&self) -> Result<ProcessingStats> {
            Ok(ProcessingStats {
                total: 10,
                processed: 7,
                remaining: 3,
            })
        }
    }

    #[tokio::test]
    async fn test_sync_is_disabled() {
        let service = FeedSyncService::new(Arc::new(MockFeeds));
        let err = service.sync_feeds().await.unwrap_err();
        assert!(matches!(err, newsflow_core::Error::FeatureDisabled(_)));
    }

    #[tokio::test]
    async fn test_stats_pass_through() {
        let service = FeedSyncService::new(Arc::new(MockFeeds));
        let stats = service.processing_stats().await.unwrap();
        assert_eq!(stats.remaining, 3);
    }
}
