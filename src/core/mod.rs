pub mod engine;
pub mod filter;
pub mod pagination;
pub mod pipeline;
pub mod ranking;
pub mod shuffle;

pub use crate::domain::model::{
    FeedOutput, FeedPage, FeedReport, Listing, ListingKind, RankedFeed,
};
pub use crate::domain::ports::{
    ConfigProvider, OutputFormat, Pipeline, Storage, DEFAULT_PAGE_SIZE,
};
pub use crate::utils::error::Result;
