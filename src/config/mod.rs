pub mod local;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::{ConfigProvider, ListingKind, OutputFormat};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "atlas-feed")]
#[command(about = "Build a ranked marketplace feed: boosted listings first, the rest shuffled")]
pub struct CliConfig {
    /// Listing API endpoint returning a JSON array or a {products|events: [...]} envelope
    #[arg(long, conflicts_with = "input_file")]
    pub endpoint: Option<String>,

    /// Read listings from a local JSON file instead of the API
    #[arg(long)]
    pub input_file: Option<String>,

    /// Kind assigned to listings that do not carry one
    #[arg(long, value_enum, default_value = "product")]
    pub kind: ListingKind,

    /// Keep only listings of this kind
    #[arg(long, value_enum)]
    pub only_kind: Option<ListingKind>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, default_value = "50")]
    pub page_size: usize,

    /// Fix the shuffle of organic listings for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_enum, value_delimiter = ',', default_value = "json")]
    pub formats: Vec<OutputFormat>,

    /// Also write one JSON file per page under pages/
    #[arg(long)]
    pub split_pages: bool,

    /// Bundle all output files into a single ZIP archive
    #[arg(long)]
    pub compress: bool,

    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    #[arg(long, default_value = "2")]
    pub retry_attempts: u32,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn input_file(&self) -> Option<&str> {
        self.input_file.as_deref()
    }

    fn listing_kind(&self) -> ListingKind {
        self.kind
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn kind_filter(&self) -> Option<ListingKind> {
        self.only_kind
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn shuffle_seed(&self) -> Option<u64> {
        self.seed
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn split_pages(&self) -> bool {
        self.split_pages
    }

    fn compress(&self) -> bool {
        self.compress
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_single_source(self.endpoint.as_deref(), self.input_file.as_deref())?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("page_size", self.page_size, 1)?;
        validation::validate_positive_number("formats", self.formats.len(), 1)?;
        validation::validate_range("timeout_secs", self.timeout_secs, 1, 600)?;
        validation::validate_range("retry_attempts", self.retry_attempts, 0, 10)?;
        if let Some(category) = &self.category {
            validation::validate_non_empty_string("category", category)?;
        }
        Ok(())
    }
}
