pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{local::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{
    engine::FeedEngine,
    pipeline::FeedPipeline,
    ranking::{boosted_order, rank, rank_with_seed, Rankable},
    shuffle::shuffle,
};
pub use crate::domain::model::{FeedPage, FeedReport, Listing, ListingKind, RankedFeed};
pub use crate::utils::error::{FeedError, Result};
