use crate::domain::model::{FeedOutput, Listing, ListingKind};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
}

pub const DEFAULT_PAGE_SIZE: usize = 50;

pub trait ConfigProvider: Send + Sync {
    fn source_endpoint(&self) -> Option<&str>;
    fn input_file(&self) -> Option<&str>;
    fn listing_kind(&self) -> ListingKind;
    fn category(&self) -> Option<&str>;
    /// 只保留某一種 listing；預設不過濾
    fn kind_filter(&self) -> Option<ListingKind> {
        None
    }
    fn page_size(&self) -> usize;
    fn shuffle_seed(&self) -> Option<u64>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
    fn split_pages(&self) -> bool;
    fn compress(&self) -> bool;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Listing>>;
    async fn transform(&self, listings: Vec<Listing>) -> Result<FeedOutput>;
    async fn load(&self, output: FeedOutput) -> Result<String>;
}
