use crate::core::{FeedReport, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

pub struct FeedEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> FeedEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<FeedReport> {
        let started = Instant::now();
        tracing::info!("Starting feed build...");
        self.monitor.log_stats("Start");

        // Extract
        let listings = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} listings", listings.len());
        self.monitor.log_stats("Extract");

        // Transform
        let output = self.pipeline.transform(listings).await?;
        tracing::info!(
            "🔀 Ranked {} listings ({} boosted) into {} pages",
            output.feed.len(),
            output.feed.boosted_count,
            output.pages.len()
        );
        self.monitor.log_stats("Transform");

        let total_listings = output.feed.len();
        let boosted_listings = output.feed.boosted_count;
        let pages = output.pages.len();

        // Load
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("💾 Feed saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(FeedReport {
            output_path,
            total_listings,
            boosted_listings,
            pages,
            duration: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FeedOutput, Listing, ListingKind, RankedFeed};
    use crate::utils::error::FeedError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPipeline {
        loads: AtomicUsize,
        fail_extract: bool,
    }

    #[async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<Listing>> {
            if self.fail_extract {
                return Err(FeedError::HttpStatusError {
                    status: 502,
                    url: "http://stub/products".to_string(),
                });
            }
            Ok(vec![
                Listing::new("1", ListingKind::Product).boosted(1),
                Listing::new("2", ListingKind::Product),
            ])
        }

        async fn transform(&self, listings: Vec<Listing>) -> Result<FeedOutput> {
            Ok(FeedOutput {
                feed: RankedFeed {
                    boosted_count: 1,
                    listings,
                },
                pages: Vec::new(),
                page_size: 50,
                generated_at: Utc::now(),
            })
        }

        async fn load(&self, _output: FeedOutput) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok("stub/feed.json".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_reports_counts() {
        let engine = FeedEngine::new(StubPipeline {
            loads: AtomicUsize::new(0),
            fail_extract: false,
        });

        let report = engine.run().await.unwrap();

        assert_eq!(report.output_path, "stub/feed.json");
        assert_eq!(report.total_listings, 2);
        assert_eq!(report.boosted_listings, 1);
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extract_failure_skips_load() {
        let engine = FeedEngine::new(StubPipeline {
            loads: AtomicUsize::new(0),
            fail_extract: true,
        });

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, FeedError::HttpStatusError { status: 502, .. }));
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
